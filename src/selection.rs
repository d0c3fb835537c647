//! Closed selection sets (city, month, day) and the pure validation functions
//! that turn user tokens into them.
//!
//! Tokens are matched case-insensitively after trimming. Anything outside the
//! set is an [`ExplorerError::InvalidSelection`]; callers decide whether to
//! re-prompt or abort.

use std::fmt;

use chrono::Weekday;
use serde::Serialize;

use crate::error::{ExplorerError, Result};

pub const CITY_NAMES: [&str; 3] = ["chicago", "new york city", "washington"];
pub const MONTH_TOKENS: [&str; 7] = [
    "all", "january", "february", "march", "april", "may", "june",
];
pub const DAY_TOKENS: [&str; 8] = [
    "all",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Lower-case name as typed at the prompt.
    pub fn name(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        }
    }

    /// Default file name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Months present in the source data. Filters never name a month after June.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterMonth {
    January,
    February,
    March,
    April,
    May,
    June,
}

impl FilterMonth {
    pub const ALL: [FilterMonth; 6] = [
        FilterMonth::January,
        FilterMonth::February,
        FilterMonth::March,
        FilterMonth::April,
        FilterMonth::May,
        FilterMonth::June,
    ];

    /// 1-based calendar month number, matching `DerivedFields::month`.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthFilter {
    #[default]
    All,
    Only(FilterMonth),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterSpec {
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl FilterSpec {
    pub fn new(month: MonthFilter, day: DayFilter) -> Self {
        FilterSpec { month, day }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.month == MonthFilter::All && self.day == DayFilter::All
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Only(m) => f.write_str(MONTH_TOKENS[m.number() as usize]),
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::Only(d) => f.write_str(DAY_TOKENS[d.num_days_from_monday() as usize + 1]),
        }
    }
}

/// Capitalised month label for a 1-based month number.
pub fn month_label(month: u32) -> &'static str {
    match chrono::Month::try_from(month as u8) {
        Ok(m) => m.name(),
        Err(_) => "Unknown",
    }
}

/// Capitalised day label, Monday first.
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

pub fn parse_city(input: &str) -> Result<City> {
    let token = normalize(input);
    City::ALL
        .into_iter()
        .find(|c| c.name() == token)
        .ok_or_else(|| ExplorerError::invalid_selection("city", input, &CITY_NAMES))
}

pub fn parse_month(input: &str) -> Result<MonthFilter> {
    let token = normalize(input);
    match MONTH_TOKENS.iter().position(|m| *m == token) {
        Some(0) => Ok(MonthFilter::All),
        Some(idx) => Ok(MonthFilter::Only(FilterMonth::ALL[idx - 1])),
        None => Err(ExplorerError::invalid_selection(
            "month",
            input,
            &MONTH_TOKENS,
        )),
    }
}

pub fn parse_day(input: &str) -> Result<DayFilter> {
    let token = normalize(input);
    match DAY_TOKENS.iter().position(|d| *d == token) {
        Some(0) => Ok(DayFilter::All),
        Some(idx) => {
            let day = Weekday::try_from((idx - 1) as u8)
                .map_err(|_| ExplorerError::invalid_selection("day", input, &DAY_TOKENS))?;
            Ok(DayFilter::Only(day))
        }
        None => Err(ExplorerError::invalid_selection("day", input, &DAY_TOKENS)),
    }
}

/// Strict yes/no. Only the exact words are accepted.
pub fn parse_yes_no(input: &str) -> Result<bool> {
    match normalize(input).as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(ExplorerError::invalid_selection(
            "answer",
            input,
            &["yes", "no"],
        )),
    }
}
