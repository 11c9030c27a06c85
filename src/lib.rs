//! PAMAP Features - per-activity feature extraction for wearable recordings.
//!
//! This library turns raw multi-sensor recordings (IMUs on hand, chest and
//! ankle plus heart rate, one file per subject) into a flat feature matrix
//! with one row per activity segment and a matching label vector, ready to
//! feed a classifier.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Batch Driver                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │   Dataset   │──▶│  Windowing  │──▶│    Stats    │        │
//! │  │ (.dat read) │   │ (segments)  │   │ (nan means) │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐        │
//! │  │  Subject    │────────────────────▶│  Features   │──▶ CSV │
//! │  │   Table     │                     │ (40 slots)  │        │
//! │  └─────────────┘                     └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pamap_features::{core::extract, dataset::{RawSample, SubjectTable}};
//!
//! let mut stream: Vec<RawSample> = (0..20).map(|i| RawSample::empty(i as f64, 3)).collect();
//! stream.push(RawSample::empty(20.0, 0)); // transient, ignored
//!
//! let table = SubjectTable::pamap2();
//! let features = extract(&stream, 101, &table)?;
//! assert_eq!(features.labels, vec![3]);
//! assert_eq!(features.rows[0].as_slice().len(), pamap_features::core::FEATURE_COUNT);
//! # Ok::<(), pamap_features::ExtractError>(())
//! ```

pub mod batch;
pub mod config;
pub mod core;
pub mod dataset;
pub mod error;
pub mod report;

// Re-export key types at crate root for convenience
pub use batch::{write_outputs, BatchDriver, FeatureMatrix, InputFile};
pub use config::{Config, ConfigError};
pub use core::{extract, FeatureVector, FileFeatures, FEATURE_COUNT, FEATURE_NAMES};
pub use dataset::{RawSample, SubjectInfo, SubjectTable};
pub use error::{DatasetError, Error, ExtractError, Result};
pub use report::{RunLog, RunStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shown when the dataset cannot be found.
pub const DATASET_HINT: &str = "\
Please download the PAMAP2 dataset from:
http://archive.ics.uci.edu/ml/datasets/PAMAP2+Physical+Activity+Monitoring
and copy it to the local directory.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_hint_contents() {
        assert!(DATASET_HINT.contains("PAMAP2"));
        assert!(DATASET_HINT.contains("archive.ics.uci.edu"));
    }
}
