//! Month / day-of-week filtering over a loaded [`Dataset`].

use tracing::debug;

use crate::dataset::{Dataset, TripRecord};
use crate::selection::{DayFilter, FilterSpec, MonthFilter};

fn matches(record: &TripRecord, spec: &FilterSpec) -> bool {
    let derived = record.derived();

    let month_ok = match spec.month {
        MonthFilter::All => true,
        MonthFilter::Only(month) => derived.month == month.number(),
    };
    let day_ok = match spec.day {
        DayFilter::All => true,
        DayFilter::Only(day) => derived.day == day.num_days_from_monday(),
    };

    month_ok && day_ok
}

/// Returns a new dataset holding the records that satisfy `spec`, in their
/// original order. The input is left untouched.
///
/// An empty result is not an error.
pub fn filter(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    if spec.is_unfiltered() {
        return dataset.clone();
    }

    let records: Vec<TripRecord> = dataset
        .records()
        .iter()
        .filter(|r| matches(r, spec))
        .cloned()
        .collect();

    debug!(
        month = %spec.month,
        day = %spec.day,
        before = dataset.len(),
        after = records.len(),
        "Filter applied"
    );

    Dataset::new(records, dataset.capabilities())
}
