//! Subject metadata lookup.
//!
//! The table is static reference data: built once, passed explicitly into
//! extraction, never mutated.

use crate::error::{DatasetError, ExtractError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Demographic and physiological attributes of one subject.
///
/// `sex` and `dominant_hand` are kept as the raw strings of the source
/// sheet; the feature encoding compares them literally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub sex: String,
    /// Years
    pub age: u32,
    /// Centimetres
    pub height_cm: f64,
    /// Kilograms
    pub weight_kg: f64,
    /// Beats per minute
    pub resting_hr: f64,
    /// Beats per minute
    pub max_hr: f64,
    pub dominant_hand: String,
}

impl SubjectInfo {
    fn new(
        sex: &str,
        age: u32,
        height_cm: f64,
        weight_kg: f64,
        resting_hr: f64,
        max_hr: f64,
        dominant_hand: &str,
    ) -> Self {
        Self {
            sex: sex.to_string(),
            age,
            height_cm,
            weight_kg,
            resting_hr,
            max_hr,
            dominant_hand: dominant_hand.to_string(),
        }
    }
}

/// Read-only subject lookup keyed by subject id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectTable {
    subjects: BTreeMap<u32, SubjectInfo>,
}

impl SubjectTable {
    /// The nine subjects of the PAMAP2 protocol, as listed in the
    /// dataset's subject information sheet.
    pub fn pamap2() -> Self {
        let subjects = [
            (101, SubjectInfo::new("Male", 27, 182.0, 83.0, 75.0, 193.0, "right")),
            (102, SubjectInfo::new("Female", 25, 169.0, 78.0, 74.0, 195.0, "right")),
            (103, SubjectInfo::new("Male", 31, 187.0, 92.0, 68.0, 189.0, "right")),
            (104, SubjectInfo::new("Male", 24, 194.0, 95.0, 58.0, 196.0, "right")),
            (105, SubjectInfo::new("Male", 26, 180.0, 73.0, 70.0, 194.0, "right")),
            (106, SubjectInfo::new("Male", 26, 183.0, 69.0, 60.0, 194.0, "right")),
            (107, SubjectInfo::new("Male", 23, 173.0, 86.0, 60.0, 197.0, "right")),
            (108, SubjectInfo::new("Male", 32, 179.0, 87.0, 66.0, 188.0, "left")),
            (109, SubjectInfo::new("Male", 31, 168.0, 65.0, 54.0, 189.0, "right")),
        ];
        Self {
            subjects: subjects.into_iter().collect(),
        }
    }

    /// Load a table from a JSON object keyed by subject id.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        Self::from_json_str(&content).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Look up a subject.
    pub fn get(&self, subject_id: u32) -> Result<&SubjectInfo, ExtractError> {
        self.subjects
            .get(&subject_id)
            .ok_or(ExtractError::UnknownSubject(subject_id))
    }

    /// Subjects in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SubjectInfo)> {
        self.subjects.iter().map(|(id, info)| (*id, info))
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pamap2_table() {
        let table = SubjectTable::pamap2();
        assert_eq!(table.len(), 9);

        let s102 = table.get(102).unwrap();
        assert_eq!(s102.sex, "Female");
        assert_eq!(s102.resting_hr, 74.0);

        let s108 = table.get(108).unwrap();
        assert_eq!(s108.dominant_hand, "left");
        assert_eq!(s108.max_hr, 188.0);
    }

    #[test]
    fn test_hand_strings_are_lowercase() {
        let table = SubjectTable::pamap2();
        assert!(table
            .iter()
            .all(|(_, s)| s.dominant_hand == "right" || s.dominant_hand == "left"));
    }

    #[test]
    fn test_unknown_subject() {
        let table = SubjectTable::pamap2();
        assert_eq!(table.get(110), Err(ExtractError::UnknownSubject(110)));
        assert!(table.get(100).is_err());
    }

    #[test]
    fn test_json_round_trip_keys_by_id() {
        let json = r#"{
            "201": {"sex": "Female", "age": 40, "height_cm": 160, "weight_kg": 55,
                    "resting_hr": 62, "max_hr": 180, "dominant_hand": "left"}
        }"#;
        let table = SubjectTable::from_json_str(json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(201).unwrap().age, 40);
    }

    #[test]
    fn test_fractional_measurements() {
        let json = r#"{
            "202": {"sex": "Male", "age": 35, "height_cm": 160.5, "weight_kg": 62.3,
                    "resting_hr": 58.5, "max_hr": 185.5, "dominant_hand": "right"}
        }"#;
        let table = SubjectTable::from_json_str(json).unwrap();
        let info = table.get(202).unwrap();
        assert_eq!(info.height_cm, 160.5);
        assert_eq!(info.weight_kg, 62.3);
        assert_eq!(info.resting_hr, 58.5);
        assert_eq!(info.max_hr, 185.5);
    }

    #[test]
    fn test_iteration_is_ascending() {
        let ids: Vec<u32> = SubjectTable::pamap2().iter().map(|(id, _)| id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
