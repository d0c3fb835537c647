//! Trip statistics.
//!
//! Counts values with explicit frequency maps and picks modes with a fixed
//! tie-break: among equally frequent values the smallest one wins (numeric
//! order for months, days, hours and birth years; lexicographic order for
//! stations and station pairs).

pub mod aggregate;
pub mod types;
pub mod utility;

pub use aggregate::aggregate;
pub use types::StatisticsReport;
