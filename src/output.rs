//! Output formatting and persistence for trip statistics.
//!
//! Supports the console report, raw-row pages, JSON serialization, and CSV
//! summary append.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::analyzers::types::{FrequencyTable, Stat, StatisticsReport};
use crate::dataset::TripRecord;
use crate::selection::{City, FilterSpec};

const RULE_WIDTH: usize = 40;
const NO_DATA: &str = "no data for the selected filters";

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &StatisticsReport) {
    debug!("{:#?}", report);
}

/// Writes a report as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(mut out: W, report: &StatisticsReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

fn rule(text: &mut String) {
    let _ = writeln!(text, "{}", "-".repeat(RULE_WIDTH));
}

fn push_table(text: &mut String, table: &FrequencyTable) {
    if table.is_empty() {
        let _ = writeln!(text, "  ({NO_DATA})");
    }
    for row in table {
        let _ = writeln!(text, "  {:<20} {}", row.value, row.count);
    }
}

/// Renders the four console sections of a report.
pub fn render_report(report: &StatisticsReport) -> String {
    let mut text = String::new();

    let _ = writeln!(text, "\nThe Most Frequent Times of Travel ({} trips)\n", report.trips);
    match &report.time {
        Stat::Value(time) => {
            let _ = writeln!(text, "Most popular month: {}", time.month_label);
            let _ = writeln!(text, "Most popular day of the week: {}", time.day_label);
            let _ = writeln!(text, "Most popular start hour: {}", time.hour);
        }
        _ => {
            let _ = writeln!(text, "Travel times: {NO_DATA}");
        }
    }
    rule(&mut text);

    let _ = writeln!(text, "\nThe Most Popular Stations and Trip\n");
    match &report.stations {
        Stat::Value(stations) => {
            let _ = writeln!(text, "Most popular start station: {}", stations.start_station);
            let _ = writeln!(text, "Most popular end station: {}", stations.end_station);
            let _ = writeln!(
                text,
                "Most frequent trip: {} -> {}",
                stations.trip.start, stations.trip.end
            );
        }
        _ => {
            let _ = writeln!(text, "Stations: {NO_DATA}");
        }
    }
    rule(&mut text);

    let _ = writeln!(text, "\nTrip Duration\n");
    match &report.duration {
        Stat::Value(duration) => {
            let _ = writeln!(text, "Total travel time: {:.1} seconds", duration.total_seconds);
            let _ = writeln!(text, "Mean travel time: {:.1} seconds", duration.mean_seconds);
        }
        _ => {
            let _ = writeln!(text, "Trip duration: {NO_DATA}");
        }
    }
    rule(&mut text);

    let _ = writeln!(text, "\nUser Stats\n");
    let _ = writeln!(text, "Counts of user types:");
    push_table(&mut text, &report.user_types);

    match &report.demographics.gender {
        Stat::Value(table) => {
            let _ = writeln!(text, "Counts of gender:");
            push_table(&mut text, table);
        }
        Stat::NoData => {
            let _ = writeln!(text, "Gender: {NO_DATA}");
        }
        Stat::Unavailable => {
            let _ = writeln!(text, "Gender information is not available for this city");
        }
    }

    match &report.demographics.birth_year {
        Stat::Value(years) => {
            let _ = writeln!(text, "Earliest year of birth: {}", years.earliest);
            let _ = writeln!(text, "Most recent year of birth: {}", years.most_recent);
            let _ = writeln!(text, "Most common year of birth: {}", years.most_common);
        }
        Stat::NoData => {
            let _ = writeln!(text, "Year of birth: {NO_DATA}");
        }
        Stat::Unavailable => {
            let _ = writeln!(text, "Year of birth information is not available for this city");
        }
    }
    rule(&mut text);

    text
}

/// Renders a page of raw trip rows. `offset` is the index of the first row.
pub fn render_page(offset: usize, records: &[TripRecord]) -> String {
    let mut text = String::new();
    for (i, r) in records.iter().enumerate() {
        let _ = write!(
            text,
            "{:>6}  {}  {:>8.0}s  {} -> {}  {}",
            offset + i,
            r.start_time().format("%Y-%m-%d %H:%M:%S"),
            r.trip_duration,
            r.start_station,
            r.end_station,
            r.user_type.as_deref().unwrap_or("-"),
        );
        if let Some(gender) = &r.gender {
            let _ = write!(text, "  {gender}");
        }
        if let Some(year) = r.birth_year {
            let _ = write!(text, "  {year}");
        }
        text.push('\n');
    }
    text
}

/// One flat CSV row describing a query and its headline numbers.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub city: String,
    pub month_filter: String,
    pub day_filter: String,
    pub trips: usize,
    pub popular_month: Option<&'static str>,
    pub popular_day: Option<&'static str>,
    pub popular_hour: Option<u32>,
    pub popular_start_station: Option<String>,
    pub popular_end_station: Option<String>,
    pub total_duration_seconds: Option<f64>,
    pub mean_duration_seconds: Option<f64>,
}

impl ReportSummary {
    pub fn new(city: City, spec: &FilterSpec, report: &StatisticsReport) -> Self {
        let time = report.time.value();
        let stations = report.stations.value();
        let duration = report.duration.value();

        ReportSummary {
            city: city.name().to_string(),
            month_filter: spec.month.to_string(),
            day_filter: spec.day.to_string(),
            trips: report.trips,
            popular_month: time.map(|t| t.month_label),
            popular_day: time.map(|t| t.day_label),
            popular_hour: time.map(|t| t.hour),
            popular_start_station: stations.map(|s| s.start_station.clone()),
            popular_end_station: stations.map(|s| s.end_station.clone()),
            total_duration_seconds: duration.map(|d| d.total_seconds),
            mean_duration_seconds: duration.map(|d| d.mean_seconds),
        }
    }
}

/// Appends a [`ReportSummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &Path, summary: &ReportSummary) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV summary");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // header only on the first write
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
