pub mod fixer;

use async_trait::async_trait;
use crate::models::{CurrencyPair, SampleDate};

pub use fixer::{ApiError, FixerClient, RatesResponse};

/// Anything that can answer "what were these rates on this date"
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Wait for permission to send one more request.
    ///
    /// Called before `fetch_rates` and outside its timeout, so time spent
    /// queued behind the provider's rate limit is never counted against it.
    async fn throttle(&self) {}

    async fn fetch_rates(&self, date: SampleDate, pair: &CurrencyPair) -> Result<RatesResponse, ApiError>;
}
