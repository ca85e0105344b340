//! Selection state for one gather cycle

use super::{CurrencyPair, Interval};

/// The interval and currency pair the user is looking at
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub interval: Interval,
    pub pair: CurrencyPair,
    /// Also sample every tier after the selected one (historical fall-through)
    pub cascade_tiers: bool,
}

impl Session {
    pub fn new(interval: Interval, pair: CurrencyPair) -> Self {
        Self {
            interval,
            pair,
            cascade_tiers: false,
        }
    }

    /// Switch to the next interval preset
    pub fn toggle_interval(&mut self) {
        self.interval = self.interval.next();
    }

    /// Replace the target currency, keeping the source
    pub fn change_target(&mut self, target: &str) -> Result<(), String> {
        self.pair = CurrencyPair::new(self.pair.source(), target)?;
        Ok(())
    }
}
