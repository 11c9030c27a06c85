//! Demonstration of per-activity feature extraction.
//!
//! This example shows how to:
//! 1. Build a subject's sample stream
//! 2. Partition it into activity segments
//! 3. Compute typed segment features
//! 4. Flatten them into feature rows with labels
//!
//! Run with: cargo run --example extract_demo

use pamap_features::{
    core::{compute_segment_features, extract, partition_segments, FEATURE_NAMES},
    dataset::{activity_name, RawSample, SubjectTable},
};

fn main() {
    println!("PAMAP Features - Extraction Demo");
    println!("================================");
    println!();

    // Synthetic recording: standing, then walking, with transient gaps
    let mut stream = Vec::new();
    let mut t = 0.0;
    for (activity, samples, accel) in [(0, 10, 0.0), (3, 40, 9.8), (0, 10, 0.0), (4, 60, 11.2)] {
        for i in 0..samples {
            let mut sample = RawSample::empty(t, activity);
            sample.hand.temperature = 32.0 + i as f64 * 0.01;
            sample.chest.accel = [accel, 0.2, -0.1];
            sample.ankle.gyro = [0.3 * (i as f64).sin(), -0.1, 0.05];
            // heart rate arrives at a lower rate than the IMUs
            if i % 9 == 0 {
                sample.heart_rate = 80.0 + i as f64 * 0.5;
            }
            stream.push(sample);
            t += 0.01;
        }
    }
    println!("Stream: {} samples", stream.len());

    let table = SubjectTable::pamap2();
    let subject_id = 105;

    // Inspect the typed features of each segment
    let Ok(subject) = table.get(subject_id) else {
        eprintln!("subject {subject_id} missing from table");
        return;
    };
    for segment in partition_segments(&stream) {
        let features = compute_segment_features(&segment, subject);
        println!(
            "Activity {:>2} ({}): {} samples, window {:?}, {} undefined aggregates",
            segment.activity_id,
            activity_name(segment.activity_id).unwrap_or("unknown"),
            segment.len(),
            segment.trimmed_window(),
            features.missing_count()
        );
    }
    println!();

    // Flatten into rows
    match extract(&stream, subject_id, &table) {
        Ok(output) => {
            for (row, label) in output.rows.iter().zip(&output.labels) {
                println!("Row for activity {label}:");
                for (name, value) in FEATURE_NAMES.iter().zip(row.as_slice()) {
                    if *value != 0.0 {
                        println!("  {name:<24} {value:>10.4}");
                    }
                }
            }
        }
        Err(e) => eprintln!("Extraction failed: {e}"),
    }
}
