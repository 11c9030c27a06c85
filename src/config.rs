//! Configuration for the feature extraction tool.

use crate::dataset::{SubjectIdRule, SubjectTable, DEFAULT_SUBJECT_PATTERN};
use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration for a batch run.
///
/// Defaults reproduce the reference layout: the PAMAP2 dataset in the
/// working directory and two CSV outputs next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory of the dataset
    pub dataset_dir: PathBuf,

    /// Subdirectories searched for recordings, in order
    pub subdirs: Vec<String>,

    /// File extension of recordings
    pub extension: String,

    /// Regex with one capture group for the subject id in file names
    pub subject_id_pattern: String,

    /// Feature matrix output path
    pub features_output: PathBuf,

    /// Label vector output path
    pub labels_output: PathBuf,

    /// Optional run manifest output path
    pub manifest_output: Option<PathBuf>,

    /// Optional JSON subject table; the built-in PAMAP2 table otherwise
    pub subjects_file: Option<PathBuf>,

    /// Worker threads (all available CPUs when unset)
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("PAMAP2_Dataset"),
            subdirs: vec!["protocol".to_string(), "optional".to_string()],
            extension: "dat".to_string(),
            subject_id_pattern: DEFAULT_SUBJECT_PATTERN.to_string(),
            features_output: PathBuf::from("X_train.csv"),
            labels_output: PathBuf::from("Y_train.csv"),
            manifest_output: None,
            subjects_file: None,
            jobs: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// used when present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the per-user configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pamap-features")
            .join("config.json")
    }

    /// Compile the subject id rule.
    pub fn subject_rule(&self) -> Result<SubjectIdRule, DatasetError> {
        SubjectIdRule::new(&self.subject_id_pattern)
    }

    /// Load the subject table in use.
    pub fn subject_table(&self) -> Result<SubjectTable, DatasetError> {
        match &self.subjects_file {
            Some(path) => SubjectTable::from_json_file(path),
            None => Ok(SubjectTable::pamap2()),
        }
    }

    /// Number of worker threads to use (at least one).
    pub fn worker_count(&self) -> usize {
        self.jobs
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataset_dir, PathBuf::from("PAMAP2_Dataset"));
        assert_eq!(config.subdirs, vec!["protocol", "optional"]);
        assert_eq!(config.features_output, PathBuf::from("X_train.csv"));
        assert_eq!(config.labels_output, PathBuf::from("Y_train.csv"));
        assert!(config.manifest_output.is_none());
        assert!(config.subject_rule().is_ok());
        assert_eq!(config.subject_table().unwrap().len(), 9);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"jobs": 2, "extension": "txt"}"#).unwrap();
        assert_eq!(config.jobs, Some(2));
        assert_eq!(config.extension, "txt");
        assert_eq!(config.subdirs, Config::default().subdirs);
    }

    #[test]
    fn test_worker_count_is_positive() {
        let mut config = Config::default();
        assert!(config.worker_count() >= 1);
        config.jobs = Some(0);
        assert_eq!(config.worker_count(), 1);
        config.jobs = Some(3);
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("pamap-config-{}", uuid::Uuid::new_v4()))
            .join("config.json");
        let mut config = Config::default();
        config.jobs = Some(4);
        config.manifest_output = Some(PathBuf::from("run.json"));
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let name = format!("pamap-missing-{}.json", uuid::Uuid::new_v4());
        let missing = std::env::temp_dir().join(name);
        assert!(matches!(Config::load(Some(&missing)), Err(ConfigError::Io(_))));
    }
}
