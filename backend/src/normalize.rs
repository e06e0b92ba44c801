//! Numeric coercion and standardization.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoercionError {
    #[error("{field}: expected a number, got null")]
    Null { field: &'static str },
    #[error("{field}: could not convert string to float: '{value}'")]
    InvalidString { field: &'static str, value: String },
    #[error("{field}: expected a number, got {kind}")]
    WrongType { field: &'static str, kind: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    NoOfEmployees,
    YrOfEstab,
    PrevailingWage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    Ln,
    Sqrt,
}

impl NumericField {
    pub const ALL: [NumericField; 3] = [
        NumericField::NoOfEmployees,
        NumericField::YrOfEstab,
        NumericField::PrevailingWage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::NoOfEmployees => "no_of_employees",
            NumericField::YrOfEstab => "yr_of_estab",
            NumericField::PrevailingWage => "prevailing_wage",
        }
    }

    /// Column name of the standardized feature.
    pub fn feature_name(self) -> &'static str {
        match self {
            NumericField::NoOfEmployees => "no_of_employees_log_stand",
            NumericField::YrOfEstab => "yr_of_estab_log_stand",
            NumericField::PrevailingWage => "prevailing_wage_sqrt_stand",
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            NumericField::NoOfEmployees => 1.0,
            NumericField::YrOfEstab => 2000.0,
            NumericField::PrevailingWage => 50_000.0,
        }
    }

    fn floor(self) -> f64 {
        match self {
            NumericField::NoOfEmployees => 1.0,
            NumericField::YrOfEstab => 1900.0,
            NumericField::PrevailingWage => 1.0,
        }
    }

    fn transform(self) -> Transform {
        match self {
            NumericField::NoOfEmployees | NumericField::YrOfEstab => Transform::Ln,
            NumericField::PrevailingWage => Transform::Sqrt,
        }
    }

    /// (mean, scale) of the transformed value, fitted offline.
    fn scaler(self) -> (f64, f64) {
        match self {
            NumericField::NoOfEmployees => (5.5, 1.2),
            NumericField::YrOfEstab => (7.5, 0.2),
            NumericField::PrevailingWage => (500.0, 100.0),
        }
    }
}

/// Coerce a request value to a float. `None` means the field was absent.
pub fn coerce(field: NumericField, raw: Option<&Value>) -> Result<f64, CoercionError> {
    let field_name = field.name();
    match raw {
        None => Ok(field.default_value()),
        Some(Value::Null) => Err(CoercionError::Null { field: field_name }),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(Value::Number(n)) => n.as_f64().ok_or(CoercionError::WrongType {
            field: field_name,
            kind: "number",
        }),
        Some(Value::String(s)) => {
            s.trim()
                .parse::<f64>()
                .map_err(|_| CoercionError::InvalidString {
                    field: field_name,
                    value: s.clone(),
                })
        }
        Some(Value::Array(_)) => Err(CoercionError::WrongType {
            field: field_name,
            kind: "array",
        }),
        Some(Value::Object(_)) => Err(CoercionError::WrongType {
            field: field_name,
            kind: "object",
        }),
    }
}

/// Clamp, transform and standardize an already-coerced value.
pub fn normalize(field: NumericField, value: f64) -> f64 {
    let floor = field.floor();
    // NaN does not compare below the floor and passes through
    let clamped = if floor > value { floor } else { value };

    let transformed = match field.transform() {
        Transform::Ln => clamped.ln(),
        Transform::Sqrt => clamped.sqrt(),
    };

    let (mean, scale) = field.scaler();
    (transformed - mean) / scale
}

/// Coerce then normalize a raw request value.
pub fn standardize(field: NumericField, raw: Option<&Value>) -> Result<f64, CoercionError> {
    coerce(field, raw).map(|value| normalize(field, value))
}
