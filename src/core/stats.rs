//! Missing-aware channel statistics over segment windows.
//!
//! Every aggregate is an `Option<f64>`: `None` when the window is empty or
//! holds only missing (NaN) samples. Nothing here substitutes values; that
//! happens once, when the feature vector is assembled.

use crate::core::windowing::{ActivitySegment, IndexRange};
use crate::dataset::types::{ImuChannel, RawSample, SensorLocation};
use statrs::statistics::Statistics;

/// How samples are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Signed arithmetic mean
    Mean,
    /// Mean of absolute values (sign carries no activity information)
    MeanAbs,
}

impl Aggregation {
    fn prepare(self, value: f64) -> f64 {
        match self {
            Aggregation::Mean => value,
            Aggregation::MeanAbs => value.abs(),
        }
    }
}

/// Mean of the non-missing values, or `None` if there are none.
pub fn nan_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let present: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return None;
    }
    Some(present.mean())
}

/// Aggregate one value per sample over `range` of a segment.
pub fn aggregate<F>(
    segment: &ActivitySegment<'_>,
    range: IndexRange,
    mode: Aggregation,
    read: F,
) -> Option<f64>
where
    F: Fn(&RawSample) -> f64,
{
    nan_mean(
        segment
            .slice(range)
            .iter()
            .map(|sample| mode.prepare(read(sample))),
    )
}

/// Aggregate an IMU channel at one body location.
pub fn imu_channel(
    segment: &ActivitySegment<'_>,
    range: IndexRange,
    location: SensorLocation,
    channel: ImuChannel,
    mode: Aggregation,
) -> Option<f64> {
    aggregate(segment, range, mode, |sample| {
        sample.imu(location).value(channel)
    })
}

/// Mean heart rate over `range`.
pub fn heart_rate(segment: &ActivitySegment<'_>, range: IndexRange) -> Option<f64> {
    aggregate(segment, range, Aggregation::Mean, |sample| sample.heart_rate)
}
