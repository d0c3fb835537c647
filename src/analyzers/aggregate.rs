use chrono::Weekday;
use tracing::warn;

use crate::analyzers::types::{
    BirthYearStats, Demographics, DurationStats, FrequencyTable, Stat, StationPair, StationStats,
    StatisticsReport, TimeStats, ValueCount,
};
use crate::analyzers::utility::{mean, mode, value_counts};
use crate::dataset::Dataset;
use crate::selection::{month_label, weekday_label};

/// Computes every statistic group over `dataset`.
///
/// Never fails: an empty view yields `NoData` sections and empty tables, and
/// optional columns missing from the city's schema yield `Unavailable`.
pub fn aggregate(dataset: &Dataset) -> StatisticsReport {
    if dataset.is_empty() {
        warn!("No trips in view, statistics will be reported as no data");
    }

    StatisticsReport {
        trips: dataset.len(),
        time: time_stats(dataset),
        stations: station_stats(dataset),
        duration: duration_stats(dataset),
        user_types: user_type_counts(dataset),
        demographics: demographics(dataset),
    }
}

/// Mode month, day of week and start hour.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn time_stats(dataset: &Dataset) -> Stat<TimeStats> {
    let derived: Vec<_> = dataset.records().iter().map(|r| r.derived()).collect();

    let popular = (
        mode(derived.iter().map(|d| d.month)),
        mode(derived.iter().map(|d| d.day)),
        mode(derived.iter().map(|d| d.hour)),
    );

    let (Some(month), Some(day), Some(hour)) = popular else {
        return Stat::NoData;
    };
    let day = Weekday::try_from(day as u8).unwrap_or(Weekday::Mon);

    Stat::Value(TimeStats {
        month,
        month_label: month_label(month),
        day,
        day_label: weekday_label(day),
        hour,
    })
}

/// Mode start station, end station and (start, end) pair.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn station_stats(dataset: &Dataset) -> Stat<StationStats> {
    let records = dataset.records();

    let start = mode(records.iter().map(|r| r.start_station.as_str()));
    let end = mode(records.iter().map(|r| r.end_station.as_str()));
    let pair = mode(
        records
            .iter()
            .map(|r| (r.start_station.as_str(), r.end_station.as_str())),
    );

    let (Some(start), Some(end), Some((pair_start, pair_end))) = (start, end, pair) else {
        return Stat::NoData;
    };

    Stat::Value(StationStats {
        start_station: start.to_string(),
        end_station: end.to_string(),
        trip: StationPair {
            start: pair_start.to_string(),
            end: pair_end.to_string(),
        },
    })
}

/// Sum and mean of trip duration.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn duration_stats(dataset: &Dataset) -> Stat<DurationStats> {
    let durations: Vec<f64> = dataset.records().iter().map(|r| r.trip_duration).collect();

    Stat::from_option(mean(&durations).map(|mean_seconds| DurationStats {
        total_seconds: durations.iter().sum(),
        mean_seconds,
    }))
}

/// Count per user type. Rows with a blank user type are skipped.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn user_type_counts(dataset: &Dataset) -> FrequencyTable {
    frequency_table(dataset.records().iter().filter_map(|r| r.user_type.as_deref()))
}

/// Gender counts and birth-year extremes, gated on the city's schema.
#[tracing::instrument(skip_all, fields(trips = dataset.len()))]
pub fn demographics(dataset: &Dataset) -> Demographics {
    let caps = dataset.capabilities();
    let records = dataset.records();

    let gender = if caps.has_gender {
        Stat::Value(frequency_table(
            records.iter().filter_map(|r| r.gender.as_deref()),
        ))
    } else {
        Stat::Unavailable
    };

    let birth_year = if caps.has_birth_year {
        let years: Vec<i32> = records.iter().filter_map(|r| r.birth_year).collect();
        let stats = match (
            years.iter().min(),
            years.iter().max(),
            mode(years.iter().copied()),
        ) {
            (Some(&earliest), Some(&most_recent), Some(most_common)) => Some(BirthYearStats {
                earliest,
                most_recent,
                most_common,
            }),
            _ => None,
        };
        Stat::from_option(stats)
    } else {
        Stat::Unavailable
    };

    Demographics { gender, birth_year }
}

fn frequency_table<'a>(values: impl Iterator<Item = &'a str>) -> FrequencyTable {
    value_counts(values)
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect()
}
