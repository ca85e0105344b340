//! Exchange rate models

use chrono::NaiveDate;
use std::fmt;

/// One queried calendar date, rendered as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleDate(pub NaiveDate);

impl SampleDate {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for SampleDate {
    fn from(date: NaiveDate) -> Self {
        SampleDate(date)
    }
}

impl fmt::Display for SampleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

/// Source and target currency codes of a chart
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    source: String,
    target: String,
}

impl CurrencyPair {
    /// Build a pair from two ISO codes. Codes are upper-cased and must differ.
    pub fn new(source: &str, target: &str) -> Result<Self, String> {
        let source = normalize_code(source)?;
        let target = normalize_code(target)?;

        if source == target {
            return Err("Source and target currencies must be different".to_string());
        }

        Ok(Self { source, target })
    }

    /// Parse a pair written as `SRC/TGT`
    pub fn parse(pair: &str) -> Result<Self, String> {
        let parts: Vec<&str> = pair.split('/').collect();
        if parts.len() != 2 {
            return Err(format!("Invalid pair format '{}'. Use: SRC/TGT", pair));
        }
        Self::new(parts[0], parts[1])
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Comma separated form used as the `symbols` query parameter
    pub fn query(&self) -> String {
        format!("{},{}", self.source, self.target)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.target)
    }
}

fn normalize_code(code: &str) -> Result<String, String> {
    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("Invalid currency code '{}'. Expected three letters like USD", code));
    }
    Ok(code)
}

/// Source and target rate observed for one date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateObservation {
    pub source_rate: f64,
    pub target_rate: f64,
}

impl RateObservation {
    /// Units of target currency per one unit of source currency
    pub fn cross_rate(&self) -> Option<f64> {
        if self.source_rate == 0.0 {
            None
        } else {
            Some(self.target_rate / self.source_rate)
        }
    }
}
