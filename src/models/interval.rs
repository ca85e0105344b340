//! Interval presets used to sample a time window

use chrono::{Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Coarse time range selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Week,
    Month,
    Year,
    Decade,
}

/// Distance between two consecutive sample dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Days(u32),
    Weeks(u32),
    Months(u32),
}

impl Step {
    /// Move `date` one step into the past. `None` when the result is not representable.
    pub fn back(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Step::Days(n) => date.checked_sub_days(Days::new(u64::from(n))),
            Step::Weeks(n) => date.checked_sub_days(Days::new(u64::from(n) * 7)),
            Step::Months(n) => date.checked_sub_months(Months::new(n)),
        }
    }
}

impl Interval {
    /// Presets in fall-through order
    pub const ALL: [Interval; 4] = [Interval::Week, Interval::Month, Interval::Year, Interval::Decade];

    pub fn step(self) -> Step {
        match self {
            Interval::Week => Step::Days(1),
            Interval::Month => Step::Days(2),
            Interval::Year => Step::Weeks(2),
            Interval::Decade => Step::Months(6),
        }
    }

    /// Number of dates sampled for this preset
    pub fn samples(self) -> usize {
        match self {
            Interval::Week => 7,
            Interval::Month => 5,
            Interval::Year => 9,
            Interval::Decade => 7,
        }
    }

    /// The preset selected after this one when toggling
    pub fn next(self) -> Interval {
        match self {
            Interval::Week => Interval::Month,
            Interval::Month => Interval::Year,
            Interval::Year => Interval::Decade,
            Interval::Decade => Interval::Week,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Week => "week",
            Interval::Month => "month",
            Interval::Year => "year",
            Interval::Decade => "decade",
        }
    }

    /// Parse interval string to a preset
    /// Supported: week, month, year, decade and their short forms
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "week" | "w" | "1w" | "7d" => Ok(Interval::Week),
            "month" | "m" | "1mnt" | "30d" => Ok(Interval::Month),
            "year" | "y" | "1y" => Ok(Interval::Year),
            "decade" | "10y" => Ok(Interval::Decade),
            _ => Err(format!(
                "Unknown interval: '{}'. Supported: week, month, year, decade",
                s
            )),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}
