use serde::Serialize;
use serde_json::{Map, Value};

use crate::encoding::{CategoricalField, RawCategory};
use crate::error::ServiceError;

/// Raw `/predict` body. Every field is optional and loosely typed, so the
/// object is kept as-is and read field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionRequest {
    fields: Map<String, Value>,
}

impl PredictionRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, ServiceError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ServiceError::BadRequest(format!("Invalid JSON body: {}", e)))?;
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ServiceError::BadRequest(format!(
                "Expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn category(&self, field: CategoricalField) -> RawCategory<'_> {
        match self.fields.get(field.name()) {
            None => RawCategory::Absent,
            Some(Value::String(s)) => RawCategory::Text(s),
            Some(_) => RawCategory::NotText,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionResponse {
    pub prediction: String,
    pub raw: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ModelInfo {
    pub model_file: String,
    pub columns_file: String,
    pub results_file: String,
    pub model_columns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
