//! Data models shared by the services and commands
//!
//! This module organizes the value types that flow between the timeline
//! generator, the rate table, the HTTP source and the chart renderer.

pub mod chart;
pub mod interval;
pub mod rates;
pub mod session;

// Re-export commonly used types for convenience
pub use chart::{Series, SeriesPoint};
pub use interval::{Interval, Step};
pub use rates::{CurrencyPair, RateObservation, SampleDate};
pub use session::Session;
