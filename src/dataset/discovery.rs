//! Input file discovery and subject id resolution.

use crate::error::DatasetError;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default pattern for PAMAP2 file names (`subject101.dat`).
pub const DEFAULT_SUBJECT_PATTERN: &str = r"subject(\d{3})";

/// List input files under `root`.
///
/// Subdirectories are searched in the given order; files within each are
/// sorted by path so runs are reproducible. Missing subdirectories are
/// skipped. An empty result is an error.
pub fn discover_inputs(
    root: &Path,
    subdirs: &[String],
    extension: &str,
) -> Result<Vec<PathBuf>, DatasetError> {
    let mut inputs = Vec::new();

    for subdir in subdirs {
        let dir = root.join(subdir);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "dataset subdirectory not found, skipping");
            continue;
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| DatasetError::io(&dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| DatasetError::io(&dir, e))?.path();
            let matches = path
                .extension()
                .map(|e| e == extension)
                .unwrap_or(false);
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        debug!(dir = %dir.display(), count = files.len(), "discovered input files");
        inputs.extend(files);
    }

    if inputs.is_empty() {
        return Err(DatasetError::NoInputFiles {
            root: root.to_path_buf(),
            subdirs: subdirs.to_vec(),
            extension: extension.to_string(),
        });
    }

    Ok(inputs)
}

/// Rule deriving one integer subject id per input file.
///
/// The pattern is matched against the file name only, so the rule does not
/// depend on where the dataset lives. The first capture group must hold
/// the digits of the id.
#[derive(Debug, Clone)]
pub struct SubjectIdRule {
    pattern: Regex,
}

impl SubjectIdRule {
    pub fn new(pattern: &str) -> Result<Self, DatasetError> {
        let regex =
            Regex::new(pattern).map_err(|e| DatasetError::invalid_pattern(pattern, e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(DatasetError::invalid_pattern(
                pattern,
                "pattern needs a capture group around the subject id digits",
            ));
        }
        Ok(Self { pattern: regex })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Extract the subject id from a file path.
    pub fn parse(&self, path: &Path) -> Result<u32, DatasetError> {
        let not_found = || DatasetError::SubjectIdNotFound {
            path: path.to_path_buf(),
            pattern: self.pattern.as_str().to_string(),
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(not_found)?;

        self.pattern
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("pamap-discovery-{name}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_rule_parses_pamap2_names() {
        let rule = SubjectIdRule::new(DEFAULT_SUBJECT_PATTERN).unwrap();
        let id = rule
            .parse(Path::new("PAMAP2_Dataset/protocol/subject105.dat"))
            .unwrap();
        assert_eq!(id, 105);
    }

    #[test]
    fn test_rule_ignores_directory_names() {
        let rule = SubjectIdRule::new(DEFAULT_SUBJECT_PATTERN).unwrap();
        let err = rule.parse(Path::new("subject101/readme.dat")).unwrap_err();
        assert!(matches!(err, DatasetError::SubjectIdNotFound { .. }));
    }

    #[test]
    fn test_custom_rule() {
        let rule = SubjectIdRule::new(r"^s(\d+)_").unwrap();
        assert_eq!(rule.parse(Path::new("/data/s7_run.dat")).unwrap(), 7);
    }

    #[test]
    fn test_rule_requires_capture_group() {
        assert!(matches!(
            SubjectIdRule::new(r"subject\d{3}"),
            Err(DatasetError::InvalidPattern { .. })
        ));
        assert!(matches!(
            SubjectIdRule::new(r"subject(\d{3}"),
            Err(DatasetError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_discovery_order_and_filtering() {
        let root = scratch_dir("order");
        let protocol = root.join("protocol");
        let optional = root.join("optional");
        std::fs::create_dir_all(&protocol).unwrap();
        std::fs::create_dir_all(&optional).unwrap();
        for name in ["subject102.dat", "subject101.dat", "notes.txt"] {
            std::fs::write(protocol.join(name), "").unwrap();
        }
        std::fs::write(optional.join("subject101.dat"), "").unwrap();

        let subdirs = vec!["protocol".to_string(), "optional".to_string()];
        let inputs = discover_inputs(&root, &subdirs, "dat").unwrap();
        assert_eq!(
            inputs,
            vec![
                protocol.join("subject101.dat"),
                protocol.join("subject102.dat"),
                optional.join("subject101.dat"),
            ]
        );

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_discovery_without_inputs_fails() {
        let root = scratch_dir("empty");
        let subdirs = vec!["protocol".to_string()];
        let err = discover_inputs(&root, &subdirs, "dat").unwrap_err();
        assert!(matches!(err, DatasetError::NoInputFiles { .. }));
        std::fs::remove_dir_all(&root).unwrap();
    }
}
