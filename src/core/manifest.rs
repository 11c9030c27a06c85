//! Run manifest: a JSON sidecar describing one extraction run.
//!
//! The manifest names the producer, the feature columns, every input file
//! with its subject and segment counts, the output paths and the run
//! statistics, so a feature matrix can be traced back to its sources.

use crate::core::features::FEATURE_NAMES;
use crate::report::RunStats;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Manifest format version.
pub const MANIFEST_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "pamap-features";

/// Producing software.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    /// Host the run executed on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// One input file's contribution to the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub subject_id: u32,
    /// Raw samples read from the file
    pub samples: usize,
    /// Matrix rows contributed by the file
    pub segments: usize,
    /// Activity ids of those rows, in row order
    pub activities: Vec<u32>,
}

/// Output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPaths {
    pub features: PathBuf,
    pub labels: PathBuf,
}

/// Manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub manifest_version: String,
    pub run_id: String,
    /// RFC 3339
    pub created_at: String,
    pub producer: Producer,
    pub feature_names: Vec<String>,
    pub rows: usize,
    pub sources: Vec<SourceEntry>,
    pub outputs: OutputPaths,
    pub stats: RunStats,
}

/// Builds manifests for runs of one process.
pub struct ManifestBuilder {
    run_id: Uuid,
    host: Option<String>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            host: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok()),
        }
    }

    pub fn run_id(&self) -> String {
        self.run_id.to_string()
    }

    pub fn build(
        &self,
        sources: &[SourceEntry],
        outputs: OutputPaths,
        stats: RunStats,
    ) -> RunManifest {
        RunManifest {
            manifest_version: MANIFEST_VERSION.to_string(),
            run_id: self.run_id(),
            created_at: Utc::now().to_rfc3339(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: crate::VERSION.to_string(),
                host: self.host.clone(),
            },
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            rows: sources.iter().map(|s| s.segments).sum(),
            sources: sources.to_vec(),
            outputs,
            stats,
        }
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RunManifest {
    /// Write as pretty JSON.
    pub fn write(&self, path: &Path) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| crate::error::Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| crate::error::Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
