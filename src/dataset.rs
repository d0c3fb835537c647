//! In-memory trip dataset.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;

/// Calendar fields derived from a trip's start timestamp.
///
/// `month` is 1-based (1 = January), `day` counts from Monday (0 = Monday,
/// 6 = Sunday) and `hour` is 0..=23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedFields {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl DerivedFields {
    pub fn derive(start: &NaiveDateTime) -> Self {
        DerivedFields {
            month: start.month(),
            day: start.weekday().num_days_from_monday(),
            hour: start.hour(),
        }
    }

    pub fn weekday(&self) -> Weekday {
        Weekday::try_from(self.day as u8).unwrap_or(Weekday::Mon)
    }
}

/// One row of a city file. The start time and its derived fields are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub start_station: String,
    pub end_station: String,
    pub trip_duration: f64,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
    derived: DerivedFields,
}

impl TripRecord {
    pub fn new(
        start_time: NaiveDateTime,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
        trip_duration: f64,
    ) -> Self {
        TripRecord {
            derived: DerivedFields::derive(&start_time),
            start_time,
            end_time: None,
            start_station: start_station.into(),
            end_station: end_station.into(),
            trip_duration,
            user_type: None,
            gender: None,
            birth_year: None,
        }
    }

    pub fn with_end_time(mut self, end_time: Option<NaiveDateTime>) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn with_user_type(mut self, user_type: Option<String>) -> Self {
        self.user_type = user_type;
        self
    }

    pub fn with_gender(mut self, gender: Option<String>) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_birth_year(mut self, birth_year: Option<i32>) -> Self {
        self.birth_year = birth_year;
        self
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn derived(&self) -> DerivedFields {
        self.derived
    }
}

/// Optional columns present in a city's schema, checked once from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub has_gender: bool,
    pub has_birth_year: bool,
}

impl Capabilities {
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut caps = Capabilities::default();
        for h in headers {
            match h.trim() {
                "Gender" => caps.has_gender = true,
                "Birth Year" => caps.has_birth_year = true,
                _ => {}
            }
        }
        caps
    }
}

/// Ordered trips in source-file order. Never mutated after loading; filtering
/// builds a new `Dataset`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Vec<TripRecord>,
    capabilities: Capabilities,
}

impl Dataset {
    pub fn new(records: Vec<TripRecord>, capabilities: Capabilities) -> Self {
        Dataset {
            records,
            capabilities,
        }
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows `offset..offset + size`, clamped to the dataset. Empty once exhausted.
    pub fn page(&self, offset: usize, size: usize) -> &[TripRecord] {
        let start = offset.min(self.records.len());
        let end = offset.saturating_add(size).min(self.records.len());
        &self.records[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_derive_uses_monday_origin() {
        // 2017-03-06 was a Monday
        let monday = DerivedFields::derive(&at(2017, 3, 6, 8));
        assert_eq!(monday.month, 3);
        assert_eq!(monday.day, 0);
        assert_eq!(monday.hour, 8);

        // 2017-03-12 was a Sunday
        let sunday = DerivedFields::derive(&at(2017, 3, 12, 23));
        assert_eq!(sunday.day, 6);
        assert_eq!(sunday.weekday(), Weekday::Sun);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let ts = at(2017, 6, 30, 0);
        assert_eq!(DerivedFields::derive(&ts), DerivedFields::derive(&ts));

        let record = TripRecord::new(ts, "A", "B", 60.0);
        assert_eq!(record.derived(), DerivedFields::derive(&record.start_time()));
    }

    #[test]
    fn test_capabilities_from_headers() {
        let caps = Capabilities::from_headers([
            "",
            "Start Time",
            "End Time",
            "Trip Duration",
            "Start Station",
            "End Station",
            "User Type",
            "Gender",
            "Birth Year",
        ]);
        assert!(caps.has_gender);
        assert!(caps.has_birth_year);

        let caps = Capabilities::from_headers(["Start Time", "User Type"]);
        assert_eq!(caps, Capabilities::default());
    }

    #[test]
    fn test_page_clamps_to_len() {
        let records = (0..7)
            .map(|i| TripRecord::new(at(2017, 1, 2, i), "A", "B", i as f64))
            .collect();
        let ds = Dataset::new(records, Capabilities::default());

        assert_eq!(ds.page(0, 5).len(), 5);
        assert_eq!(ds.page(5, 5).len(), 2);
        assert!(ds.page(10, 5).is_empty());
        assert!(ds.page(usize::MAX, 5).is_empty());
    }
}
