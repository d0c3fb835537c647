//! Data types produced by the aggregation pipeline.

use chrono::Weekday;
use serde::Serialize;

/// A computed statistic, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Stat<T> {
    Value(T),
    /// The view holds no usable rows.
    NoData,
    /// The city file has no such column.
    Unavailable,
}

impl<T> Stat<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Stat::Value(v),
            None => Stat::NoData,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Stat::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Stat::NoData)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Stat::Unavailable)
    }
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Distinct values with their counts, most frequent first.
pub type FrequencyTable = Vec<ValueCount>;

/// Most popular times of travel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStats {
    pub month: u32,
    pub month_label: &'static str,
    pub day: Weekday,
    pub day_label: &'static str,
    pub hour: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationPair {
    pub start: String,
    pub end: String,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStats {
    pub start_station: String,
    pub end_station: String,
    pub trip: StationPair,
}

/// Total and mean trip duration, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub total_seconds: f64,
    pub mean_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demographics {
    pub gender: Stat<FrequencyTable>,
    pub birth_year: Stat<BirthYearStats>,
}

/// Complete result of one query, produced fresh each time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub trips: usize,
    pub time: Stat<TimeStats>,
    pub stations: Stat<StationStats>,
    pub duration: Stat<DurationStats>,
    pub user_types: FrequencyTable,
    pub demographics: Demographics,
}
