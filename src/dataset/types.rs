//! Raw sample schema for PAMAP2-style recordings.
//!
//! One `RawSample` per sensor tick: a timestamp, the activity label, the
//! heart rate, and one IMU reading per body location. Missing values are NaN.

use serde::{Deserialize, Serialize};

/// Activity id reserved for "no designated activity" (transient) rows.
pub const TRANSIENT_ACTIVITY_ID: u32 = 0;

/// Number of columns in a raw recording line.
pub const COLUMN_COUNT: usize = 54;

/// Column names in file order.
pub const COLUMN_NAMES: [&str; COLUMN_COUNT] = [
    "timestamp",
    "activityID",
    "heartrate",
    "hand_temp",
    "hand_accel_x",
    "hand_accel_y",
    "hand_accel_z",
    "hand_bad1",
    "hand_bad2",
    "hand_bad3",
    "hand_gyro_x",
    "hand_gyro_y",
    "hand_gyro_z",
    "hand_magnet_x",
    "hand_magnet_y",
    "hand_magnet_z",
    "hand_orient_1",
    "hand_orient_2",
    "hand_orient_3",
    "hand_orient_4",
    "chest_temp",
    "chest_accel_x",
    "chest_accel_y",
    "chest_accel_z",
    "chest_bad1",
    "chest_bad2",
    "chest_bad3",
    "chest_gyro_x",
    "chest_gyro_y",
    "chest_gyro_z",
    "chest_magnet_x",
    "chest_magnet_y",
    "chest_magnet_z",
    "chest_orient_1",
    "chest_orient_2",
    "chest_orient_3",
    "chest_orient_4",
    "ankle_temp",
    "ankle_accel_x",
    "ankle_accel_y",
    "ankle_accel_z",
    "ankle_bad1",
    "ankle_bad2",
    "ankle_bad3",
    "ankle_gyro_x",
    "ankle_gyro_y",
    "ankle_gyro_z",
    "ankle_magnet_x",
    "ankle_magnet_y",
    "ankle_magnet_z",
    "ankle_orient_1",
    "ankle_orient_2",
    "ankle_orient_3",
    "ankle_orient_4",
];

/// Number of columns per IMU block (temperature through orientation).
pub const IMU_COLUMN_COUNT: usize = 17;

/// Body location of an inertial measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorLocation {
    Hand,
    Chest,
    Ankle,
}

impl SensorLocation {
    /// All locations in feature order.
    pub const ALL: [SensorLocation; 3] = [
        SensorLocation::Hand,
        SensorLocation::Chest,
        SensorLocation::Ankle,
    ];

    /// Index of the first column of this location's IMU block.
    pub fn first_column(self) -> usize {
        match self {
            SensorLocation::Hand => 3,
            SensorLocation::Chest => 3 + IMU_COLUMN_COUNT,
            SensorLocation::Ankle => 3 + 2 * IMU_COLUMN_COUNT,
        }
    }
}

/// Vector-sensor axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A single channel of an IMU block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImuChannel {
    Temperature,
    /// ±16g accelerometer.
    Accel(Axis),
    /// ±6g accelerometer. Saturates during vigorous activity, never aggregated.
    Accel6g(Axis),
    Gyro(Axis),
    Magnet(Axis),
    /// Orientation quaternion component, 0..4. Flagged invalid in the
    /// dataset and never aggregated.
    Orientation(usize),
}

/// One IMU reading. NaN marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    /// Temperature in °C
    pub temperature: f64,
    /// ±16g acceleration, m/s²
    pub accel: [f64; 3],
    /// ±6g acceleration, m/s²
    pub accel_6g: [f64; 3],
    /// Angular rate, rad/s
    pub gyro: [f64; 3],
    /// Magnetic field, µT
    pub magnet: [f64; 3],
    /// Orientation quaternion
    pub orientation: [f64; 4],
}

impl Default for ImuSample {
    fn default() -> Self {
        Self {
            temperature: f64::NAN,
            accel: [f64::NAN; 3],
            accel_6g: [f64::NAN; 3],
            gyro: [f64::NAN; 3],
            magnet: [f64::NAN; 3],
            orientation: [f64::NAN; 4],
        }
    }
}

impl ImuSample {
    /// Build from the 17 values of one IMU block in file order.
    pub fn from_columns(values: &[f64; IMU_COLUMN_COUNT]) -> Self {
        Self {
            temperature: values[0],
            accel: [values[1], values[2], values[3]],
            accel_6g: [values[4], values[5], values[6]],
            gyro: [values[7], values[8], values[9]],
            magnet: [values[10], values[11], values[12]],
            orientation: [values[13], values[14], values[15], values[16]],
        }
    }

    /// Read one channel. Out-of-range orientation components read as NaN.
    pub fn value(&self, channel: ImuChannel) -> f64 {
        match channel {
            ImuChannel::Temperature => self.temperature,
            ImuChannel::Accel(axis) => self.accel[axis.index()],
            ImuChannel::Accel6g(axis) => self.accel_6g[axis.index()],
            ImuChannel::Gyro(axis) => self.gyro[axis.index()],
            ImuChannel::Magnet(axis) => self.magnet[axis.index()],
            ImuChannel::Orientation(i) => self.orientation.get(i).copied().unwrap_or(f64::NAN),
        }
    }
}

/// One tick of a subject's recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Seconds since the start of the recording
    pub timestamp: f64,
    /// Activity label (0 = transient)
    pub activity_id: u32,
    /// Heart rate in bpm (sampled at a lower rate, mostly NaN)
    pub heart_rate: f64,
    pub hand: ImuSample,
    pub chest: ImuSample,
    pub ankle: ImuSample,
}

impl RawSample {
    /// A sample with every sensor value missing.
    pub fn empty(timestamp: f64, activity_id: u32) -> Self {
        Self {
            timestamp,
            activity_id,
            heart_rate: f64::NAN,
            hand: ImuSample::default(),
            chest: ImuSample::default(),
            ankle: ImuSample::default(),
        }
    }

    pub fn imu(&self, location: SensorLocation) -> &ImuSample {
        match location {
            SensorLocation::Hand => &self.hand,
            SensorLocation::Chest => &self.chest,
            SensorLocation::Ankle => &self.ankle,
        }
    }

    pub fn imu_mut(&mut self, location: SensorLocation) -> &mut ImuSample {
        match location {
            SensorLocation::Hand => &mut self.hand,
            SensorLocation::Chest => &mut self.chest,
            SensorLocation::Ankle => &mut self.ankle,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.activity_id == TRANSIENT_ACTIVITY_ID
    }
}

/// Human-readable name of a PAMAP2 activity id.
pub fn activity_name(activity_id: u32) -> Option<&'static str> {
    let name = match activity_id {
        1 => "lying",
        2 => "sitting",
        3 => "standing",
        4 => "walking",
        5 => "running",
        6 => "cycling",
        7 => "Nordic walking",
        9 => "watching TV",
        10 => "computer work",
        11 => "car driving",
        12 => "ascending stairs",
        13 => "descending stairs",
        16 => "vacuum cleaning",
        17 => "ironing",
        18 => "folding laundry",
        19 => "house cleaning",
        20 => "playing soccer",
        24 => "rope jumping",
        _ => return None,
    };
    Some(name)
}
