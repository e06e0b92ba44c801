//! Formatting of model outputs and of the persisted evaluation record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Human-readable label for a class value.
pub fn label_for(class_value: i64) -> String {
    match class_value {
        0 => "Denied".to_string(),
        1 => "Certified".to_string(),
        other => other.to_string(),
    }
}

/// Tagged tree for arbitrary result payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ResultValue>),
    Map(BTreeMap<String, ResultValue>),
}

impl ResultValue {
    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, ResultValue>> {
        match self {
            ResultValue::Map(map) => Some(map),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ResultValue::Null => "null",
            ResultValue::Bool(_) => "bool",
            ResultValue::Int(_) => "int",
            ResultValue::Float(_) => "float",
            ResultValue::Str(_) => "string",
            ResultValue::List(_) => "list",
            ResultValue::Map(_) => "map",
        }
    }
}

/// Replace every NaN float leaf with `Null`.
pub fn sanitize(value: ResultValue) -> ResultValue {
    match value {
        ResultValue::Float(f) if f.is_nan() => ResultValue::Null,
        ResultValue::List(items) => ResultValue::List(items.into_iter().map(sanitize).collect()),
        ResultValue::Map(entries) => ResultValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, sanitize(value)))
                .collect(),
        ),
        leaf => leaf,
    }
}

impl From<serde_json::Value> for ResultValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ResultValue::Null,
            Value::Bool(b) => ResultValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ResultValue::Int(i),
                None => n.as_f64().map(ResultValue::Float).unwrap_or(ResultValue::Null),
            },
            Value::String(s) => ResultValue::Str(s),
            Value::Array(items) => ResultValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => ResultValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for ResultValue {
    fn from(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => ResultValue::Str(s),
            Value::Integer(i) => ResultValue::Int(i),
            Value::Float(f) => ResultValue::Float(f),
            Value::Boolean(b) => ResultValue::Bool(b),
            Value::Datetime(dt) => ResultValue::Str(dt.to_string()),
            Value::Array(items) => ResultValue::List(items.into_iter().map(Into::into).collect()),
            Value::Table(entries) => ResultValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("results record must be a mapping, got {0}")]
    NotAMapping(&'static str),
    #[error("results record has no 'accuracy' field")]
    MissingAccuracy,
    #[error("accuracy must be a number, got {0}")]
    InvalidAccuracy(String),
}

fn coerce_float(value: &ResultValue) -> Result<f64, ResultsError> {
    match value {
        ResultValue::Float(f) => Ok(*f),
        ResultValue::Int(i) => Ok(*i as f64),
        ResultValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        ResultValue::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ResultsError::InvalidAccuracy(format!("'{}'", s))),
        other => Err(ResultsError::InvalidAccuracy(other.kind().to_string())),
    }
}

/// Sanitize a raw record and coerce its `accuracy` entry to a float.
pub fn prepare_results(raw: ResultValue) -> Result<ResultValue, ResultsError> {
    let mut record = sanitize(raw);
    let kind = record.kind();
    let map = record.as_map_mut().ok_or(ResultsError::NotAMapping(kind))?;
    let accuracy = map.get("accuracy").ok_or(ResultsError::MissingAccuracy)?;
    let accuracy = coerce_float(accuracy)?;
    map.insert("accuracy".to_string(), ResultValue::Float(accuracy));
    Ok(record)
}

/// Read the persisted results record. `.json` files are parsed as JSON,
/// anything else as TOML.
pub fn load_results(path: &Path) -> Result<ResultValue, ResultsError> {
    let text = std::fs::read_to_string(path).map_err(|source| ResultsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let raw = if is_json {
        serde_json::from_str::<serde_json::Value>(&text)
            .map(ResultValue::from)
            .map_err(|e| ResultsError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
    } else {
        text.parse::<toml::Table>()
            .map(|table| ResultValue::from(toml::Value::Table(table)))
            .map_err(|e| ResultsError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
    };

    prepare_results(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn map(entries: Vec<(&str, ResultValue)>) -> ResultValue {
        ResultValue::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "visa-results-{}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default(),
            name
        ))
    }

    #[test]
    fn labels() {
        assert_eq!(label_for(0), "Denied");
        assert_eq!(label_for(1), "Certified");
        assert_eq!(label_for(7), "7");
    }

    #[test]
    fn sanitize_rewrites_nested_nan() {
        let input = map(vec![
            ("a", ResultValue::Float(f64::NAN)),
            (
                "b",
                ResultValue::List(vec![
                    ResultValue::Int(1),
                    ResultValue::Float(f64::NAN),
                    ResultValue::Str("x".into()),
                ]),
            ),
        ]);
        let expected = map(vec![
            ("a", ResultValue::Null),
            (
                "b",
                ResultValue::List(vec![
                    ResultValue::Int(1),
                    ResultValue::Null,
                    ResultValue::Str("x".into()),
                ]),
            ),
        ]);
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn sanitize_keeps_other_leaves() {
        let input = map(vec![
            ("f", ResultValue::Float(0.25)),
            ("inf", ResultValue::Float(f64::INFINITY)),
            ("t", ResultValue::Bool(true)),
            ("n", ResultValue::Null),
            ("deep", map(vec![("x", map(vec![("y", ResultValue::Float(f64::NAN))]))])),
        ]);
        let out = sanitize(input);
        let expected = map(vec![
            ("f", ResultValue::Float(0.25)),
            ("inf", ResultValue::Float(f64::INFINITY)),
            ("t", ResultValue::Bool(true)),
            ("n", ResultValue::Null),
            ("deep", map(vec![("x", map(vec![("y", ResultValue::Null)]))])),
        ]);
        assert_eq!(out, expected);
    }

    #[test]
    fn accuracy_is_coerced_to_float() {
        let out = prepare_results(map(vec![("accuracy", ResultValue::Str("0.75".into()))])).unwrap();
        assert_eq!(out, map(vec![("accuracy", ResultValue::Float(0.75))]));

        let out = prepare_results(map(vec![("accuracy", ResultValue::Int(1))])).unwrap();
        assert_eq!(serde_json::to_string(&out).unwrap(), r#"{"accuracy":1.0}"#);
    }

    #[test]
    fn accuracy_must_be_present_and_numeric() {
        assert!(matches!(
            prepare_results(map(vec![])),
            Err(ResultsError::MissingAccuracy)
        ));
        assert!(matches!(
            prepare_results(map(vec![("accuracy", ResultValue::Float(f64::NAN))])),
            Err(ResultsError::InvalidAccuracy(_))
        ));
        assert!(matches!(
            prepare_results(ResultValue::List(vec![])),
            Err(ResultsError::NotAMapping("list"))
        ));
    }

    #[test]
    fn loads_toml_with_nan() {
        let path = temp_path("results.toml");
        let mut f = std::fs::File::create(&path).expect("create file");
        writeln!(
            f,
            "accuracy = 0.82\nmodel = \"xgboost\"\n[report]\nf1 = nan\nsupport = [10, 20]"
        )
        .expect("write file");

        let value = load_results(&path).expect("load results");
        let json = serde_json::to_value(&value).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "accuracy": 0.82,
                "model": "xgboost",
                "report": {"f1": null, "support": [10, 20]}
            })
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loads_json() {
        let path = temp_path("results.json");
        std::fs::write(&path, r#"{"accuracy": "0.5", "confusion": [[1, 2], [3, 4]]}"#)
            .expect("write file");
        let value = load_results(&path).expect("load results");
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!({"accuracy": 0.5, "confusion": [[1, 2], [3, 4]]})
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_results(&temp_path("absent.toml")).unwrap_err();
        assert!(matches!(err, ResultsError::Io { .. }));
    }
}
