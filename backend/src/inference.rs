use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tract_onnx::prelude::*;

use crate::models::ModelInfo;

/// Single-row binary classifier.
pub trait Classifier: Send + Sync {
    /// Class label for one feature vector laid out in manifest order.
    fn predict(&self, features: &[f32]) -> anyhow::Result<i64>;
}

/// ONNX classifier run through tract. The graph takes one `f32` input of
/// shape `[1, n_features]`; its first output holds the class label.
pub struct OnnxClassifier {
    model: TypedRunnableModel<TypedModel>,
    n_features: usize,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P, n_features: usize) -> TractResult<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, n_features)),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, n_features })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> anyhow::Result<i64> {
        if features.len() != self.n_features {
            anyhow::bail!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            );
        }

        let input = Tensor::from_shape(&[1, features.len()], features)?;
        let outputs = self.model.run(tvec!(input.into()))?;
        let first = outputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("model produced no output"))?;

        let labels = first.cast_to::<i64>()?;
        let label = labels
            .as_slice::<i64>()?
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("model produced an empty label tensor"))?;
        Ok(label)
    }
}

/// Locations of the three persisted artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub columns: PathBuf,
    pub results: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path, model: &str, columns: &str, results: &str) -> Self {
        Self {
            model: dir.join(model),
            columns: dir.join(columns),
            results: dir.join(results),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read the ordered column manifest (a JSON array of strings).
pub fn load_columns(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let columns: Vec<String> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(columns)
}

/// Process-wide model state, built once at startup and never mutated.
pub struct ModelContext {
    classifier: Option<Arc<dyn Classifier>>,
    columns: Vec<String>,
    paths: ArtifactPaths,
}

impl ModelContext {
    pub fn new(
        classifier: Option<Arc<dyn Classifier>>,
        columns: Vec<String>,
        paths: ArtifactPaths,
    ) -> Self {
        Self {
            classifier,
            columns,
            paths,
        }
    }

    /// Load manifest and model. Any failure leaves the context degraded:
    /// no classifier and an empty manifest.
    pub fn load(paths: ArtifactPaths) -> Self {
        let loaded = load_columns(&paths.columns).and_then(|columns| {
            let classifier = OnnxClassifier::load(&paths.model, columns.len())
                .with_context(|| format!("failed to load model {}", paths.model.display()))?;
            Ok((classifier, columns))
        });

        match loaded {
            Ok((classifier, columns)) => {
                log::info!(
                    "Model loaded from {} ({} columns)",
                    paths.model.display(),
                    columns.len()
                );
                Self::new(Some(Arc::new(classifier)), columns, paths)
            }
            Err(e) => {
                log::error!("Error loading model: {:#}", e);
                Self::new(None, Vec::new(), paths)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn classifier(&self) -> Option<Arc<dyn Classifier>> {
        self.classifier.clone()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn get_model_info(&self) -> ModelInfo {
        ModelInfo {
            model_file: file_name(&self.paths.model),
            columns_file: file_name(&self.paths.columns),
            results_file: file_name(&self.paths.results),
            model_columns: self.columns.clone(),
        }
    }
}
