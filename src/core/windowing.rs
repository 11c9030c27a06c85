//! Activity segmentation and window trimming.
//!
//! A subject's stream is grouped by activity id (not by contiguous run),
//! then each segment is cut into a trimmed central window for the sensor
//! channels and into three temporal thirds for heart rate.

use crate::dataset::types::{RawSample, TRANSIENT_ACTIVITY_ID};
use std::collections::BTreeMap;

/// All samples of one subject that carry one activity id.
#[derive(Debug, Clone)]
pub struct ActivitySegment<'a> {
    /// Activity label shared by every sample
    pub activity_id: u32,
    /// Samples in stream order
    pub samples: Vec<&'a RawSample>,
}

impl<'a> ActivitySegment<'a> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Central window used for sensor channel statistics.
    pub fn trimmed_window(&self) -> IndexRange {
        trimmed_window(self.len())
    }

    /// Early, middle and late ranges used for heart rate.
    pub fn heart_rate_thirds(&self) -> [IndexRange; 3] {
        heart_rate_thirds(self.len())
    }

    /// Samples inside `range`, clamped to the segment.
    pub fn slice(&self, range: IndexRange) -> &[&'a RawSample] {
        let end = range.end.min(self.samples.len());
        let start = range.start.min(end);
        &self.samples[start..end]
    }
}

/// Half-open index range `[start, end)` into a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a stream into one segment per non-transient activity id.
///
/// Segments come back in ascending activity id order. Within a segment,
/// samples keep their stream order even when the activity recurs.
pub fn partition_segments(samples: &[RawSample]) -> Vec<ActivitySegment<'_>> {
    let mut groups: BTreeMap<u32, Vec<&RawSample>> = BTreeMap::new();
    for sample in samples {
        if sample.activity_id == TRANSIENT_ACTIVITY_ID {
            continue;
        }
        groups.entry(sample.activity_id).or_default().push(sample);
    }

    groups
        .into_iter()
        .map(|(activity_id, samples)| ActivitySegment {
            activity_id,
            samples,
        })
        .collect()
}

/// Central 80% of a segment of length `len`: `[len/10, 9*len/10)`.
pub fn trimmed_window(len: usize) -> IndexRange {
    IndexRange::new(len / 10, 9 * len / 10)
}

/// Heart-rate thirds: `[0, j1)`, `[j1, j2)`, `[j2, j3)` with
/// `j1 = 33*len/100`, `j2 = 66*len/100`, `j3 = len - 1`.
///
/// The last sample never falls in a third. For very short segments the
/// late third can be empty or inverted; inverted ranges read as empty.
pub fn heart_rate_thirds(len: usize) -> [IndexRange; 3] {
    let j1 = 33 * len / 100;
    let j2 = 66 * len / 100;
    let j3 = len.saturating_sub(1);
    [
        IndexRange::new(0, j1),
        IndexRange::new(j1, j2),
        IndexRange::new(j2, j3),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(ids: &[u32]) -> Vec<RawSample> {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| RawSample::empty(i as f64, id))
            .collect()
    }

    #[test]
    fn test_partition_groups_by_value_not_run() {
        let samples = stream(&[0, 12, 12, 0, 3, 3, 3, 12, 0]);
        let segments = partition_segments(&samples);

        let ids: Vec<u32> = segments.iter().map(|s| s.activity_id).collect();
        assert_eq!(ids, vec![3, 12]);

        let twelve: Vec<f64> = segments[1].samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(twelve, vec![1.0, 2.0, 7.0]);
    }

    #[test]
    fn test_partition_covers_each_labelled_row_once() {
        let ids = [5, 0, 1, 1, 0, 5, 24, 24, 24, 0, 1];
        let samples = stream(&ids);
        let segments = partition_segments(&samples);

        let mut seen: Vec<f64> = segments
            .iter()
            .flat_map(|s| s.samples.iter().map(|r| r.timestamp))
            .collect();
        seen.sort_by(f64::total_cmp);

        let expected: Vec<f64> = ids
            .iter()
            .enumerate()
            .filter(|&(_, &id)| id != TRANSIENT_ACTIVITY_ID)
            .map(|(i, _)| i as f64)
            .collect();
        assert_eq!(seen, expected);
        assert!(segments.iter().all(|s| !s.is_empty()));
        assert!(segments.iter().all(|s| s.samples.iter().all(|r| r.activity_id == s.activity_id)));
    }

    #[test]
    fn test_partition_only_transient() {
        assert!(partition_segments(&stream(&[0, 0, 0])).is_empty());
        assert!(partition_segments(&[]).is_empty());
    }

    #[test]
    fn test_trimmed_window_bounds() {
        for len in 1..=200 {
            let w = trimmed_window(len);
            assert_eq!(w.start, len / 10);
            assert_eq!(w.end, 9 * len / 10);
            assert!(w.start <= w.end && w.end <= len, "len {len}: {w:?}");
        }
        assert_eq!(trimmed_window(20), IndexRange::new(2, 18));
        assert!(trimmed_window(1).is_empty());
    }

    #[test]
    fn test_heart_rate_thirds() {
        let [early, mid, late] = heart_rate_thirds(100);
        assert_eq!(early, IndexRange::new(0, 33));
        assert_eq!(mid, IndexRange::new(33, 66));
        assert_eq!(late, IndexRange::new(66, 99));

        let [early, mid, late] = heart_rate_thirds(2);
        assert!(early.is_empty());
        assert_eq!(mid, IndexRange::new(0, 1));
        assert!(late.is_empty());

        let [_, _, late] = heart_rate_thirds(3);
        assert_eq!(late, IndexRange::new(1, 2));

        let thirds = heart_rate_thirds(0);
        assert!(thirds.iter().all(IndexRange::is_empty));
    }

    #[test]
    fn test_slice_clamps() {
        let samples = stream(&[4, 4, 4]);
        let segments = partition_segments(&samples);
        assert_eq!(segments[0].slice(IndexRange::new(1, 10)).len(), 2);
        assert!(segments[0].slice(IndexRange::new(5, 2)).is_empty());
    }
}
