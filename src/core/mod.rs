//! Core feature extraction.
//!
//! This module contains:
//! - Activity segmentation and window trimming
//! - Missing-aware channel statistics
//! - Feature vector assembly per segment
//! - Run manifest building for export

pub mod features;
pub mod manifest;
pub mod stats;
pub mod windowing;

// Re-export commonly used types
pub use features::{
    compute_segment_features, extract, FeatureVector, FileFeatures, SegmentFeatures,
    FEATURE_COUNT, FEATURE_NAMES,
};
pub use manifest::{ManifestBuilder, OutputPaths, RunManifest, SourceEntry, PRODUCER_NAME};
pub use stats::{nan_mean, Aggregation};
pub use windowing::{
    heart_rate_thirds, partition_segments, trimmed_window, ActivitySegment, IndexRange,
};
