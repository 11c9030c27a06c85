//! Raw recording access.
//!
//! This module provides the sample schema, the subject metadata table,
//! input file discovery, and the `.dat` stream reader.

pub mod discovery;
pub mod reader;
pub mod subject;
pub mod types;

// Re-export commonly used types
pub use discovery::{discover_inputs, SubjectIdRule, DEFAULT_SUBJECT_PATTERN};
pub use reader::{read_stream, read_stream_from};
pub use subject::{SubjectInfo, SubjectTable};
pub use types::{
    activity_name, Axis, ImuChannel, ImuSample, RawSample, SensorLocation, COLUMN_COUNT,
    COLUMN_NAMES, TRANSIENT_ACTIVITY_ID,
};
