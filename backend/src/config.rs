//! Runtime configuration read from the process environment.

use std::env;
use std::path::{Path, PathBuf};

use crate::inference::ArtifactPaths;

pub const DEFAULT_MODEL_DIR: &str = "model";
pub const DEFAULT_MODEL_FILE: &str = "best_model.onnx";
pub const DEFAULT_COLUMNS_FILE: &str = "model_columns.json";
pub const DEFAULT_RESULTS_FILE: &str = "model_results.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_body_bytes: usize,
    pub model_dir: PathBuf,
    pub model_file: String,
    pub columns_file: String,
    pub results_file: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            workers: num_cpus::get(),
            max_body_bytes: 1024 * 1024,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            columns_file: DEFAULT_COLUMNS_FILE.to_string(),
            results_file: DEFAULT_RESULTS_FILE.to_string(),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env_non_empty(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let model_dir = env_non_empty("VISA_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        Self {
            host: env_non_empty("HOST").unwrap_or(defaults.host),
            port: env_parsed("PORT", defaults.port),
            workers: env_parsed("WORKERS", defaults.workers).max(1),
            max_body_bytes: env_parsed("VISA_MAX_BODY_BYTES", defaults.max_body_bytes),
            model_dir: resolve_model_dir(&model_dir),
            model_file: env_non_empty("VISA_MODEL_FILE").unwrap_or(defaults.model_file),
            columns_file: env_non_empty("VISA_COLUMNS_FILE").unwrap_or(defaults.columns_file),
            results_file: env_non_empty("VISA_RESULTS_FILE").unwrap_or(defaults.results_file),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(
            &self.model_dir,
            &self.model_file,
            &self.columns_file,
            &self.results_file,
        )
    }
}

/// A relative model dir is looked up next to the executable first, then in
/// the working directory.
fn resolve_model_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    let beside_exe = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|parent| parent.join(dir)));
    match beside_exe {
        Some(candidate) if candidate.is_dir() => candidate,
        _ => dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    const VARS: [&str; 8] = [
        "HOST",
        "PORT",
        "WORKERS",
        "VISA_MAX_BODY_BYTES",
        "VISA_MODEL_DIR",
        "VISA_MODEL_FILE",
        "VISA_COLUMNS_FILE",
        "VISA_RESULTS_FILE",
    ];

    fn clear_env() {
        for v in VARS {
            env::remove_var(v);
        }
    }

    #[test]
    fn defaults_without_env() {
        let _guard = env_lock().lock().expect("env lock");
        clear_env();

        let cfg = ServiceConfig::from_env();
        assert_eq!(cfg.bind_address(), "0.0.0.0:5000");
        assert!(cfg.workers >= 1);
        let paths = cfg.artifact_paths();
        assert!(paths.model.ends_with("model/best_model.onnx"));
        assert!(paths.columns.ends_with("model/model_columns.json"));
        assert!(paths.results.ends_with("model/model_results.toml"));
    }

    #[test]
    fn env_overrides_and_invalid_numbers() {
        let _guard = env_lock().lock().expect("env lock");
        clear_env();
        env::set_var("HOST", "127.0.0.1");
        env::set_var("PORT", "not-a-port");
        env::set_var("WORKERS", "3");
        env::set_var("VISA_MODEL_DIR", "/srv/visa");
        env::set_var("VISA_RESULTS_FILE", "results.json");

        let cfg = ServiceConfig::from_env();
        clear_env();

        assert_eq!(cfg.bind_address(), "127.0.0.1:5000");
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.model_dir, PathBuf::from("/srv/visa"));
        assert_eq!(cfg.artifact_paths().results, PathBuf::from("/srv/visa/results.json"));
    }
}
