//! Reader for space-delimited raw recordings (`.dat`).

use crate::dataset::types::{
    ImuSample, RawSample, SensorLocation, COLUMN_COUNT, COLUMN_NAMES, IMU_COLUMN_COUNT,
};
use crate::error::DatasetError;
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;

/// Load one subject's recording from disk.
pub fn read_stream(path: impl AsRef<Path>) -> Result<Vec<RawSample>, DatasetError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| DatasetError::io(path, e))?;
    read_stream_from(file).map_err(|e| DatasetError::in_file(path, e))
}

/// Parse a recording from any reader.
///
/// Lines are single-space delimited with no header; `NaN` marks a missing
/// value. Every line must carry all 54 columns.
pub fn read_stream_from<R: Read>(reader: R) -> Result<Vec<RawSample>, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut samples = Vec::new();
    for result in reader.records() {
        let record = result?;
        samples.push(parse_record(&record)?);
    }
    Ok(samples)
}

fn parse_record(record: &StringRecord) -> Result<RawSample, DatasetError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    // A trailing delimiter shows up as empty fields at the end.
    let mut found = record.len();
    while found > 0 && record.get(found - 1) == Some("") {
        found -= 1;
    }
    if found != COLUMN_COUNT {
        return Err(DatasetError::MalformedRow {
            line,
            expected: COLUMN_COUNT,
            found,
        });
    }

    let number = |column: usize| -> Result<f64, DatasetError> {
        let raw = &record[column];
        raw.parse::<f64>().map_err(|_| DatasetError::InvalidValue {
            line,
            column: COLUMN_NAMES[column],
            value: raw.to_string(),
        })
    };

    let activity_id = parse_activity_id(&record[1]).ok_or_else(|| DatasetError::InvalidValue {
        line,
        column: COLUMN_NAMES[1],
        value: record[1].to_string(),
    })?;

    let mut sample = RawSample::empty(number(0)?, activity_id);
    sample.heart_rate = number(2)?;

    for location in SensorLocation::ALL {
        let first = location.first_column();
        let mut block = [f64::NAN; IMU_COLUMN_COUNT];
        for (offset, value) in block.iter_mut().enumerate() {
            *value = number(first + offset)?;
        }
        *sample.imu_mut(location) = ImuSample::from_columns(&block);
    }

    Ok(sample)
}

/// Activity ids are integers, sometimes written as integral floats.
fn parse_activity_id(raw: &str) -> Option<u32> {
    if let Ok(id) = raw.parse::<u32>() {
        return Some(id);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::{Axis, ImuChannel};

    fn line(timestamp: f64, activity: &str, hr: &str, fill: &str) -> String {
        let mut fields = vec![timestamp.to_string(), activity.to_string(), hr.to_string()];
        fields.extend(std::iter::repeat(fill.to_string()).take(COLUMN_COUNT - 3));
        fields.join(" ")
    }

    #[test]
    fn test_parse_lines() {
        let data = format!(
            "{}\n{}\n",
            line(8.38, "0", "104", "1.5"),
            line(8.39, "3", "NaN", "NaN")
        );
        let samples = read_stream_from(data.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);

        assert_eq!(samples[0].activity_id, 0);
        assert_eq!(samples[0].heart_rate, 104.0);
        assert_eq!(samples[0].ankle.value(ImuChannel::Magnet(Axis::Z)), 1.5);

        assert_eq!(samples[1].activity_id, 3);
        assert!(samples[1].heart_rate.is_nan());
        assert!(samples[1].hand.temperature.is_nan());
    }

    #[test]
    fn test_column_positions() {
        let mut fields: Vec<String> = (0..COLUMN_COUNT).map(|i| i.to_string()).collect();
        fields[1] = "5".to_string();
        let samples = read_stream_from(fields.join(" ").as_bytes()).unwrap();
        let s = &samples[0];
        assert_eq!(s.heart_rate, 2.0);
        assert_eq!(s.hand.temperature, 3.0);
        assert_eq!(s.hand.gyro[0], 10.0);
        assert_eq!(s.chest.temperature, 20.0);
        assert_eq!(s.chest.accel[2], 23.0);
        assert_eq!(s.ankle.temperature, 37.0);
        assert_eq!(s.ankle.orientation[3], 53.0);
    }

    #[test]
    fn test_trailing_delimiter_is_tolerated() {
        let data = format!("{} \n", line(1.0, "4", "90", "0"));
        let samples = read_stream_from(data.as_bytes()).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_short_line_is_rejected() {
        let err = read_stream_from("1.0 3 80 0.5".as_bytes()).unwrap_err();
        match err {
            DatasetError::MalformedRow { line, found, .. } => {
                assert_eq!(line, 1);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_number_names_column() {
        let data = line(1.0, "3", "fast", "0");
        let err = read_stream_from(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("heartrate"));
    }

    #[test]
    fn test_activity_id_formats() {
        assert_eq!(parse_activity_id("12"), Some(12));
        assert_eq!(parse_activity_id("12.0"), Some(12));
        assert_eq!(parse_activity_id("12.5"), None);
        assert_eq!(parse_activity_id("-1"), None);
        assert_eq!(parse_activity_id("NaN"), None);
    }

    #[test]
    fn test_file_errors_name_the_path() {
        let path = std::env::temp_dir().join(format!("subject105-{}.dat", uuid::Uuid::new_v4()));
        std::fs::write(&path, "1.0 3 80\n").unwrap();

        let err = read_stream(&path).unwrap_err();
        assert!(err.to_string().contains("subject105-"));
        match err {
            DatasetError::InFile { error, .. } => {
                assert!(matches!(*error, DatasetError::MalformedRow { line: 1, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_input() {
        assert!(read_stream_from("".as_bytes()).unwrap().is_empty());
    }
}
