//! Feature record assembly and reindexing against the model column manifest.

use crate::encoding::{self, CategoricalField};
use crate::models::PredictionRequest;
use crate::normalize::{self, CoercionError, NumericField};

/// Named features computed from one request, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(String, f64)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a feature.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }

    /// Align the record to `columns`: manifest order, absent columns as 0,
    /// names outside the manifest dropped.
    pub fn reindex(&self, columns: &[String]) -> Vec<f32> {
        columns
            .iter()
            .map(|column| self.get(column).unwrap_or(0.0) as f32)
            .collect()
    }
}

/// Encode every categorical field of the request under its own name.
pub fn encode_categoricals(request: &PredictionRequest) -> FeatureRecord {
    let mut record = FeatureRecord::new();
    for field in CategoricalField::ALL {
        let code = encoding::encode(field, request.category(field));
        record.insert(field.name(), code as f64);
    }
    record
}

/// Standardize every numeric field under its suffixed feature name.
pub fn standardize_numerics(request: &PredictionRequest) -> Result<FeatureRecord, CoercionError> {
    let mut record = FeatureRecord::new();
    for field in NumericField::ALL {
        let value = normalize::standardize(field, request.get(field.name()))?;
        record.insert(field.feature_name(), value);
    }
    Ok(record)
}

/// Merge both records and reindex the result against the manifest.
pub fn assemble(
    categoricals: &FeatureRecord,
    numerics: &FeatureRecord,
    columns: &[String],
) -> Vec<f32> {
    let mut merged = categoricals.clone();
    for (name, value) in numerics.iter() {
        merged.insert(name, value);
    }
    merged.reindex(columns)
}

/// Full request → model input transformation.
pub fn build_model_input(
    request: &PredictionRequest,
    columns: &[String],
) -> Result<Vec<f32>, CoercionError> {
    let categoricals = encode_categoricals(request);
    let numerics = standardize_numerics(request)?;
    log::debug!(
        "assembled {} categorical and {} numeric features for {} model columns",
        categoricals.len(),
        numerics.len(),
        columns.len()
    );
    Ok(assemble(&categoricals, &numerics, columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reindex_drops_extras_and_zero_fills() {
        let mut cat = FeatureRecord::new();
        cat.insert("continent", 1.0);
        cat.insert("extra_column", 42.0);
        let mut num = FeatureRecord::new();
        num.insert("prevailing_wage_sqrt_stand", 0.5);

        let manifest = columns(&["prevailing_wage_sqrt_stand", "missing", "continent"]);
        assert_eq!(assemble(&cat, &num, &manifest), vec![0.5, 0.0, 1.0]);
    }

    #[test]
    fn empty_manifest_gives_empty_vector() {
        let mut cat = FeatureRecord::new();
        cat.insert("continent", 1.0);
        assert!(assemble(&cat, &FeatureRecord::new(), &[]).is_empty());
    }

    #[test]
    fn insert_overwrites_existing_name() {
        let mut record = FeatureRecord::new();
        record.insert("a", 1.0);
        record.insert("a", 2.0);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("a"), Some(2.0));
    }

    #[test]
    fn empty_request_uses_defaults() {
        let request = PredictionRequest::default();
        let cat = encode_categoricals(&request);
        assert_eq!(cat.get("region_of_employment"), Some(3.0));
        assert_eq!(cat.get("full_time_position"), Some(1.0));

        let num = standardize_numerics(&request).unwrap();
        let employees = num.get("no_of_employees_log_stand").unwrap();
        assert!((employees + 4.583333333333333).abs() < 1e-9);
    }

    #[test]
    fn coercion_error_surfaces() {
        let request =
            PredictionRequest::from_slice(br#"{"no_of_employees": "many"}"#).unwrap();
        assert!(build_model_input(&request, &columns(&["continent"])).is_err());
    }
}
