//! CSV loader for city trip files.
//!
//! Loading parses every start timestamp and attaches its derived fields. A
//! single unparseable row fails the whole load; no partial dataset is returned.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, info};

use crate::dataset::{Capabilities, Dataset, TripRecord};
use crate::error::{ExplorerError, Result};

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A single row as it appears in a city file. Unknown columns, such as the
/// unnamed index column, are ignored.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    // stored as a float ("1992.0") in the source files
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

/// Parses a trip timestamp in any of the formats the city files use.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Opens and parses a city file.
///
/// # Errors
///
/// Returns [`ExplorerError::DataFormat`] if the file cannot be opened, a row is
/// malformed, or any start timestamp cannot be parsed.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_trips(path: &Path) -> Result<Dataset> {
    let file = File::open(path)
        .map_err(|e| ExplorerError::data_format(path, format!("cannot open file: {e}")))?;
    let dataset = parse_trips(file, path)?;
    info!(
        records = dataset.len(),
        has_gender = dataset.capabilities().has_gender,
        has_birth_year = dataset.capabilities().has_birth_year,
        "Trip file loaded"
    );
    Ok(dataset)
}

/// Parses trips from any CSV reader. `source` only labels errors.
pub fn parse_trips<R: Read>(reader: R, source: &Path) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ExplorerError::data_format(source, format!("unreadable header: {e}")))?;
    let capabilities = Capabilities::from_headers(headers.iter());
    debug!(?capabilities, "Schema capabilities detected");

    let mut records = Vec::new();

    for (idx, result) in rdr.deserialize::<RawTrip>().enumerate() {
        let row = idx + 1;
        let raw = result.map_err(|e| ExplorerError::data_format(source, format!("row {row}: {e}")))?;
        records.push(into_record(raw, row, source, capabilities)?);
    }

    Ok(Dataset::new(records, capabilities))
}

fn into_record(
    raw: RawTrip,
    row: usize,
    source: &Path,
    capabilities: Capabilities,
) -> Result<TripRecord> {
    let start_time = parse_timestamp(&raw.start_time).ok_or_else(|| {
        ExplorerError::data_format(
            source,
            format!("row {row}: unparseable Start Time '{}'", raw.start_time),
        )
    })?;

    let end_time = match raw.end_time.as_deref() {
        None => None,
        Some(value) => Some(parse_timestamp(value).ok_or_else(|| {
            ExplorerError::data_format(source, format!("row {row}: unparseable End Time '{value}'"))
        })?),
    };

    let birth_year = match raw.birth_year {
        Some(year) if !year.is_finite() => {
            return Err(ExplorerError::data_format(
                source,
                format!("row {row}: invalid Birth Year '{year}'"),
            ));
        }
        Some(year) => Some(year.round() as i32),
        None => None,
    };

    let mut record = TripRecord::new(
        start_time,
        raw.start_station,
        raw.end_station,
        raw.trip_duration,
    )
    .with_end_time(end_time)
    .with_user_type(raw.user_type);

    if capabilities.has_gender {
        record = record.with_gender(raw.gender);
    }
    if capabilities.has_birth_year {
        record = record.with_birth_year(birth_year);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHICAGO: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Customer,,
";

    const WASHINGTON: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
";

    fn source() -> &'static Path {
        Path::new("test.csv")
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = parse_timestamp("2017-01-01 09:07:57").unwrap();
        assert_eq!(parse_timestamp("2017-01-01T09:07:57").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2017-01-01 09:07:57.000 ").unwrap(), expected);
        assert!(parse_timestamp("01/01/2017 09:07").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_parse_full_schema() {
        let ds = parse_trips(CHICAGO.as_bytes(), source()).unwrap();

        assert_eq!(ds.len(), 3);
        assert!(ds.capabilities().has_gender);
        assert!(ds.capabilities().has_birth_year);

        let first = &ds.records()[0];
        assert_eq!(first.start_station, "Wood St & Hubbard St");
        assert_eq!(first.trip_duration, 321.0);
        assert_eq!(first.gender.as_deref(), Some("Male"));
        assert_eq!(first.birth_year, Some(1992));
        assert_eq!(first.derived().month, 6);
        assert_eq!(first.derived().hour, 15);
        assert!(first.end_time.is_some());

        let last = &ds.records()[2];
        assert_eq!(last.user_type.as_deref(), Some("Customer"));
        assert_eq!(last.gender, None);
        assert_eq!(last.birth_year, None);
    }

    #[test]
    fn test_parse_without_demographics() {
        let ds = parse_trips(WASHINGTON.as_bytes(), source()).unwrap();

        assert_eq!(ds.len(), 1);
        assert!(!ds.capabilities().has_gender);
        assert!(!ds.capabilities().has_birth_year);
        assert_eq!(ds.records()[0].trip_duration, 489.066);
    }

    #[test]
    fn test_bad_timestamp_fails_whole_load() {
        let data = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-01-01 09:07:57,2017-01-01 09:20:53,776,A,B,Subscriber
yesterday,2017-01-01 09:20:53,776,A,B,Subscriber
";
        let err = parse_trips(data.as_bytes(), source()).unwrap_err();
        match err {
            ExplorerError::DataFormat { reason, .. } => {
                assert!(reason.contains("row 2"), "{reason}");
                assert!(reason.contains("yesterday"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_duration_is_format_error() {
        let data = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-01-01 09:07:57,2017-01-01 09:20:53,long,A,B,Subscriber
";
        let err = parse_trips(data.as_bytes(), source()).unwrap_err();
        assert!(matches!(err, ExplorerError::DataFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_format_error() {
        let err = load_trips(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ExplorerError::DataFormat { .. }));
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let data = "Start Time,End Time,Trip Duration,Start Station,End Station,User Type\n";
        let ds = parse_trips(data.as_bytes(), source()).unwrap();
        assert!(ds.is_empty());
    }
}
