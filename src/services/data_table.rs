//! In-memory table merging per-date rate responses into two index-aligned series

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use crate::models::{CurrencyPair, RateObservation, SampleDate, Series, SeriesPoint};

/// Aggregation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("Invalid response for {date}: currency '{code}' is neither {source_code} nor {target_code}")]
    InvalidResponse {
        date: SampleDate,
        code: String,
        source_code: String,
        target_code: String,
    },
}

/// Which side of the pair a currency code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

#[derive(Debug, Default)]
struct TableState {
    source_rates: HashMap<SampleDate, f64>,
    target_rates: HashMap<SampleDate, f64>,
    date_indices: HashMap<SampleDate, u32>,
    next_index: u32,
}

impl TableState {
    fn assign_index(&mut self, date: SampleDate) -> u32 {
        if let Some(&index) = self.date_indices.get(&date) {
            return index;
        }
        let index = self.next_index;
        self.date_indices.insert(date, index);
        self.next_index += 1;
        index
    }

    fn insert(&mut self, date: SampleDate, side: Side, rate: f64) {
        match side {
            Side::Source => self.source_rates.insert(date, rate),
            Side::Target => self.target_rates.insert(date, rate),
        };
        self.assign_index(date);
    }

    fn series(&self, side: Side, label: &str) -> Series {
        let rates = match side {
            Side::Source => &self.source_rates,
            Side::Target => &self.target_rates,
        };
        let points = rates
            .iter()
            .filter_map(|(date, &value)| {
                self.date_indices
                    .get(date)
                    .map(|&index| SeriesPoint { index, value })
            })
            .collect();
        Series::new(label, points)
    }
}

/// Rates for one currency pair keyed by date.
///
/// Every mutating call takes the table lock once, so concurrent completions
/// never interleave their updates to the rate maps and the index counter.
#[derive(Debug)]
pub struct DataTable {
    pair: CurrencyPair,
    state: Mutex<TableState>,
}

impl DataTable {
    pub fn new(pair: CurrencyPair) -> Self {
        Self {
            pair,
            state: Mutex::new(TableState::default()),
        }
    }

    /// String of format `SRC,TGT` used to query the API
    pub fn currencies(&self) -> String {
        self.pair.query()
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        // Poisoning only means another completion panicked; the maps stay consistent per call
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn classify(&self, date: SampleDate, code: &str) -> Result<Side, TableError> {
        if code == self.pair.source() {
            Ok(Side::Source)
        } else if code == self.pair.target() {
            Ok(Side::Target)
        } else {
            Err(TableError::InvalidResponse {
                date,
                code: code.to_string(),
                source_code: self.pair.source().to_string(),
                target_code: self.pair.target().to_string(),
            })
        }
    }

    /// Store one rate under the source or target map and index its date
    pub fn record_observation(&self, date: SampleDate, code: &str, rate: f64) -> Result<(), TableError> {
        let side = self.classify(date, code)?;
        self.lock().insert(date, side, rate);
        Ok(())
    }

    /// Store every rate of one API response.
    ///
    /// All codes are checked before anything is written, so a response with
    /// an unknown currency leaves the table untouched. Returns the number of
    /// rates stored.
    pub fn record_rates(&self, date: SampleDate, rates: &BTreeMap<String, f64>) -> Result<usize, TableError> {
        let classified = rates
            .iter()
            .map(|(code, &rate)| self.classify(date, code).map(|side| (side, rate)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = self.lock();
        for (side, rate) in &classified {
            state.insert(date, *side, *rate);
        }
        Ok(classified.len())
    }

    /// Give a date the next free index unless it already has one
    pub fn assign_date_index(&self, date: SampleDate) -> u32 {
        self.lock().assign_index(date)
    }

    pub fn source_series(&self) -> Series {
        self.lock().series(Side::Source, self.pair.source())
    }

    pub fn target_series(&self) -> Series {
        self.lock().series(Side::Target, self.pair.target())
    }

    /// All indexed dates, ordered by index
    pub fn dates_by_index(&self) -> Vec<SampleDate> {
        let state = self.lock();
        let mut dates: Vec<(u32, SampleDate)> = state
            .date_indices
            .iter()
            .map(|(date, &index)| (index, *date))
            .collect();
        dates.sort_by_key(|(index, _)| *index);
        dates.into_iter().map(|(_, date)| date).collect()
    }

    /// Both rates for a date, if both have been recorded
    pub fn observation(&self, date: SampleDate) -> Option<RateObservation> {
        let state = self.lock();
        let source_rate = *state.source_rates.get(&date)?;
        let target_rate = *state.target_rates.get(&date)?;
        Some(RateObservation { source_rate, target_rate })
    }

    /// Number of indexed dates
    pub fn date_count(&self) -> usize {
        self.lock().date_indices.len()
    }
}
