//! Feature computation from activity segments.
//!
//! Each segment yields a fixed 40-element vector: trimmed-window channel
//! means, heart rate above resting for three temporal thirds, and the
//! subject's static attributes. Aggregates stay `Option<f64>` until
//! [`SegmentFeatures::to_vector`], the single place where undefined values
//! become `0.0`.

use crate::core::stats::{self, Aggregation};
use crate::core::windowing::{partition_segments, ActivitySegment};
use crate::dataset::subject::{SubjectInfo, SubjectTable};
use crate::dataset::types::{Axis, ImuChannel, RawSample, SensorLocation};
use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Length of every feature vector.
pub const FEATURE_COUNT: usize = 40;

/// Column names of the feature vector, in order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "hand_temp_mean",
    "chest_temp_mean",
    "ankle_temp_mean",
    "hand_accel_x_mean",
    "hand_accel_y_mean",
    "hand_accel_z_mean",
    "chest_accel_x_mean",
    "chest_accel_y_mean",
    "chest_accel_z_mean",
    "ankle_accel_x_mean",
    "ankle_accel_y_mean",
    "ankle_accel_z_mean",
    "hand_gyro_x_abs_mean",
    "hand_gyro_y_abs_mean",
    "hand_gyro_z_abs_mean",
    "chest_gyro_x_abs_mean",
    "chest_gyro_y_abs_mean",
    "chest_gyro_z_abs_mean",
    "ankle_gyro_x_abs_mean",
    "ankle_gyro_y_abs_mean",
    "ankle_gyro_z_abs_mean",
    "hand_magnet_x_abs_mean",
    "hand_magnet_y_abs_mean",
    "hand_magnet_z_abs_mean",
    "chest_magnet_x_abs_mean",
    "chest_magnet_y_abs_mean",
    "chest_magnet_z_abs_mean",
    "ankle_magnet_x_abs_mean",
    "ankle_magnet_y_abs_mean",
    "ankle_magnet_z_abs_mean",
    "hr_above_rest_early",
    "hr_above_rest_mid",
    "hr_above_rest_late",
    "age",
    "height_cm",
    "weight_kg",
    "sex_female",
    "sex_male",
    "hand_not_right",
    "hand_right",
];

/// Sensor channel aggregates over the trimmed window.
///
/// Arrays are ordered hand, chest, ankle; vector channels are x, y, z
/// within each location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorFeatures {
    pub temperature: [Option<f64>; 3],
    pub accel: [Option<f64>; 9],
    pub gyro_abs: [Option<f64>; 9],
    pub magnet_abs: [Option<f64>; 9],
}

/// Mean heart rate minus resting heart rate for early, middle and late
/// thirds of the segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRateFeatures {
    pub above_resting: [Option<f64>; 3],
}

/// Static per-subject attributes and their one-hot encodings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectFeatures {
    pub age: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// `[female, male]`
    pub sex: [f64; 2],
    /// `[not "Right", "Right"]`
    pub dominant_hand: [f64; 2],
}

/// All features of one activity segment, before zero substitution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentFeatures {
    pub activity_id: u32,
    pub sensors: SensorFeatures,
    pub heart_rate: HeartRateFeatures,
    pub subject: SubjectFeatures,
}

impl SegmentFeatures {
    /// Every slot in vector order; `None` where the aggregate is undefined.
    fn slots(&self) -> [Option<f64>; FEATURE_COUNT] {
        let mut slots = [None; FEATURE_COUNT];
        let subject = &self.subject;
        let values = self
            .sensors
            .temperature
            .iter()
            .chain(&self.sensors.accel)
            .chain(&self.sensors.gyro_abs)
            .chain(&self.sensors.magnet_abs)
            .chain(&self.heart_rate.above_resting)
            .copied()
            .chain(
                [
                    subject.age,
                    subject.height_cm,
                    subject.weight_kg,
                    subject.sex[0],
                    subject.sex[1],
                    subject.dominant_hand[0],
                    subject.dominant_hand[1],
                ]
                .into_iter()
                .map(Some),
            );
        for (slot, value) in slots.iter_mut().zip(values) {
            *slot = value;
        }
        slots
    }

    /// Number of slots that [`to_vector`](Self::to_vector) replaces with zero.
    pub fn missing_count(&self) -> usize {
        self.slots()
            .iter()
            .filter(|slot| !matches!(slot, Some(v) if !v.is_nan()))
            .count()
    }

    /// Flatten into the output layout. Undefined aggregates and any NaN
    /// become exactly `0.0`.
    pub fn to_vector(&self) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        for (value, slot) in values.iter_mut().zip(self.slots()) {
            *value = match slot {
                Some(v) if !v.is_nan() => v,
                _ => 0.0,
            };
        }
        FeatureVector(values)
    }
}

/// A finished, NaN-free feature row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Look a value up by column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }
}

/// Feature rows and labels for one subject stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFeatures {
    /// One row per segment, ascending activity id
    pub rows: Vec<FeatureVector>,
    /// Activity id of each row
    pub labels: Vec<u32>,
    /// Slots substituted with zero across all rows
    pub substituted: usize,
}

impl FileFeatures {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Compute all features of a single segment.
pub fn compute_segment_features(
    segment: &ActivitySegment<'_>,
    subject: &SubjectInfo,
) -> SegmentFeatures {
    let sensors = compute_sensor_features(segment);
    let heart_rate = compute_heart_rate_features(segment, subject);
    let subject = encode_subject(subject);

    SegmentFeatures {
        activity_id: segment.activity_id,
        sensors,
        heart_rate,
        subject,
    }
}

fn compute_sensor_features(segment: &ActivitySegment<'_>) -> SensorFeatures {
    let window = segment.trimmed_window();
    let mut features = SensorFeatures::default();

    for (loc_idx, location) in SensorLocation::ALL.into_iter().enumerate() {
        features.temperature[loc_idx] = stats::imu_channel(
            segment,
            window,
            location,
            ImuChannel::Temperature,
            Aggregation::Mean,
        );

        for axis in Axis::ALL {
            let slot = loc_idx * 3 + axis.index();
            features.accel[slot] = stats::imu_channel(
                segment,
                window,
                location,
                ImuChannel::Accel(axis),
                Aggregation::Mean,
            );
            features.gyro_abs[slot] = stats::imu_channel(
                segment,
                window,
                location,
                ImuChannel::Gyro(axis),
                Aggregation::MeanAbs,
            );
            features.magnet_abs[slot] = stats::imu_channel(
                segment,
                window,
                location,
                ImuChannel::Magnet(axis),
                Aggregation::MeanAbs,
            );
        }
    }

    features
}

fn compute_heart_rate_features(
    segment: &ActivitySegment<'_>,
    subject: &SubjectInfo,
) -> HeartRateFeatures {
    let resting = subject.resting_hr;
    let thirds = segment.heart_rate_thirds();
    HeartRateFeatures {
        above_resting: thirds.map(|range| stats::heart_rate(segment, range).map(|hr| hr - resting)),
    }
}

/// Encode static attributes.
///
/// Both one-hots compare exact strings: sex is male only for `"Male"` and
/// everything else encodes as female; handedness is right only for the
/// capitalized `"Right"`, which the PAMAP2 sheet (lowercase `"right"`)
/// never contains, so every PAMAP2 subject encodes as `[1, 0]`. Trained
/// models depend on this layout; keep it as is.
fn encode_subject(subject: &SubjectInfo) -> SubjectFeatures {
    let sex = if subject.sex == "Male" {
        [0.0, 1.0]
    } else {
        [1.0, 0.0]
    };
    let dominant_hand = if subject.dominant_hand == "Right" {
        [0.0, 1.0]
    } else {
        [1.0, 0.0]
    };

    SubjectFeatures {
        age: f64::from(subject.age),
        height_cm: subject.height_cm,
        weight_kg: subject.weight_kg,
        sex,
        dominant_hand,
    }
}

/// Extract one feature row per activity segment of a subject's stream.
///
/// Rows come out in ascending activity id order, labels aligned by index.
/// Fails only when the subject is not in the table.
pub fn extract(
    stream: &[RawSample],
    subject_id: u32,
    table: &SubjectTable,
) -> Result<FileFeatures, ExtractError> {
    let subject = table.get(subject_id)?;
    let mut output = FileFeatures::default();

    for segment in partition_segments(stream) {
        if segment.trimmed_window().is_empty() {
            warn!(
                subject_id,
                activity_id = segment.activity_id,
                samples = segment.len(),
                "segment too short for a trimmed window; sensor features will be zero"
            );
        }

        let features = compute_segment_features(&segment, subject);
        let missing = features.missing_count();
        debug!(
            subject_id,
            activity_id = segment.activity_id,
            samples = segment.len(),
            missing,
            "segment features computed"
        );

        output.substituted += missing;
        output.rows.push(features.to_vector());
        output.labels.push(segment.activity_id);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(sex: &str, hand: &str) -> SubjectInfo {
        SubjectInfo {
            sex: sex.to_string(),
            age: 30,
            height_cm: 175.0,
            weight_kg: 70.0,
            resting_hr: 60.0,
            max_hr: 190.0,
            dominant_hand: hand.to_string(),
        }
    }

    fn segment_of(samples: &[RawSample]) -> ActivitySegment<'_> {
        partition_segments(samples).remove(0)
    }

    #[test]
    fn test_feature_names_are_unique() {
        let mut names = FEATURE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_all_missing_becomes_zero() {
        let samples: Vec<RawSample> = (0..20).map(|i| RawSample::empty(i as f64, 4)).collect();
        let features = compute_segment_features(&segment_of(&samples), &subject("Male", "right"));

        assert_eq!(features.sensors.temperature, [None; 3]);
        assert_eq!(features.heart_rate.above_resting, [None; 3]);
        // 27 sensor aggregates + 3 heart rate thirds
        assert_eq!(features.missing_count(), 30);

        let vector = features.to_vector();
        assert!(vector.0[..33].iter().all(|&v| v == 0.0));
        assert!(vector.0.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_sex_one_hot_is_exact_match() {
        let encode = |sex: &str| encode_subject(&subject(sex, "right")).sex;
        assert_eq!(encode("Female"), [1.0, 0.0]);
        assert_eq!(encode("Male"), [0.0, 1.0]);
        assert_eq!(encode("male"), [1.0, 0.0]);
        assert_eq!(encode("unknown"), [1.0, 0.0]);
    }

    #[test]
    fn test_hand_one_hot_never_matches_pamap2_sheet() {
        let table = SubjectTable::pamap2();
        for (_, info) in table.iter() {
            assert_eq!(encode_subject(info).dominant_hand, [1.0, 0.0]);
        }
        assert_eq!(encode_subject(&subject("Male", "Right")).dominant_hand, [0.0, 1.0]);
    }

    #[test]
    fn test_heart_rate_above_resting() {
        // 100 samples: thirds are [0,33), [33,66), [66,99)
        let samples: Vec<RawSample> = (0..100)
            .map(|i| {
                let mut s = RawSample::empty(i as f64, 5);
                s.heart_rate = match i {
                    0..=32 => 90.0,
                    33..=65 => 120.0,
                    66..=98 => 150.0,
                    _ => 1000.0,
                };
                s
            })
            .collect();
        let features = compute_segment_features(&segment_of(&samples), &subject("Male", "right"));
        assert_eq!(
            features.heart_rate.above_resting,
            [Some(30.0), Some(60.0), Some(90.0)]
        );
    }

    #[test]
    fn test_vector_layout() {
        let samples: Vec<RawSample> = (0..10)
            .map(|i| {
                let mut s = RawSample::empty(i as f64, 7);
                s.hand.temperature = 31.0;
                s.ankle.accel = [1.0, -2.0, 3.0];
                s.chest.gyro = [-0.5, 0.5, -0.5];
                s.hand.magnet = [-10.0, 20.0, -30.0];
                s.heart_rate = 100.0;
                s
            })
            .collect();
        let vector = compute_segment_features(&segment_of(&samples), &subject("Female", "left"))
            .to_vector();

        assert_eq!(vector.get("hand_temp_mean"), Some(31.0));
        assert_eq!(vector.0[0], 31.0);
        assert_eq!(vector.0[9..12], [1.0, -2.0, 3.0]);
        assert_eq!(vector.0[15..18], [0.5, 0.5, 0.5]);
        assert_eq!(vector.0[21..24], [10.0, 20.0, 30.0]);
        assert_eq!(vector.0[30..33], [40.0, 40.0, 40.0]);
        assert_eq!(vector.0[33..], [30.0, 175.0, 70.0, 1.0, 0.0, 1.0, 0.0]);
        assert_eq!(vector.get("no_such_feature"), None);
    }

    #[test]
    fn test_extract_orders_by_activity() {
        let mut samples = Vec::new();
        for (i, id) in [12, 0, 3, 12, 3].into_iter().enumerate() {
            samples.push(RawSample::empty(i as f64, id));
        }
        let output = extract(&samples, 101, &SubjectTable::pamap2()).unwrap();
        assert_eq!(output.labels, vec![3, 12]);
        assert_eq!(output.len(), 2);
        assert_eq!(output.substituted, 60);
    }

    #[test]
    fn test_extract_unknown_subject() {
        let samples = vec![RawSample::empty(0.0, 1)];
        let err = extract(&samples, 999, &SubjectTable::pamap2()).unwrap_err();
        assert_eq!(err, ExtractError::UnknownSubject(999));
    }
}
