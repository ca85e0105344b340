use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};
use crate::api::RateSource;
use crate::models::{CurrencyPair, Interval, SampleDate, Series, Session};
use crate::services::data_table::DataTable;
use crate::services::timeline_service;

/// Failures of the orchestration itself; per-date failures are never errors
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Background task failed: {0}")]
    Background(String),
}

/// What happened to the requests of one gather cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatherReport {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Everything the chart and table views need after a gather cycle
#[derive(Debug, Clone)]
pub struct ExchangeSnapshot {
    pub pair: CurrencyPair,
    pub interval: Interval,
    pub source_series: Series,
    pub target_series: Series,
    /// Sample date for each index on the x axis
    pub labels: Vec<SampleDate>,
    /// Base currency the provider quoted both rates against
    pub base: Option<String>,
    pub report: GatherReport,
    pub table: Arc<DataTable>,
}

#[derive(Debug)]
enum FetchOutcome {
    Recorded { base: String },
    Dropped,
}

/// Fans out one rate request per sample date and merges the answers
pub struct ExchangeService {
    source: Arc<dyn RateSource>,
    request_timeout: Duration,
}

impl ExchangeService {
    pub fn new(source: Arc<dyn RateSource>, request_timeout: Duration) -> Self {
        Self {
            source,
            request_timeout,
        }
    }

    /// Query every date of the session's timeline and build both series.
    ///
    /// Returns once every request has succeeded, failed or timed out. Failed
    /// dates are logged and left out of the series.
    pub async fn gather(&self, session: &Session, today: NaiveDate) -> Result<ExchangeSnapshot, ExchangeError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "gather",
            run = %run_id,
            pair = %session.pair,
            interval = %session.interval
        );
        self.gather_inner(session, today).instrument(span).await
    }

    async fn gather_inner(&self, session: &Session, today: NaiveDate) -> Result<ExchangeSnapshot, ExchangeError> {
        let dates = timeline_service::timeline_for(session, today);
        let table = Arc::new(DataTable::new(session.pair.clone()));

        // Oldest date first so indices follow time along the x axis
        for date in dates.iter().rev() {
            table.assign_date_index(*date);
        }

        info!("Querying {} for {} dates from {} back", table.currencies(), table.date_count(), today);

        let mut requests = JoinSet::new();
        for date in &dates {
            let date = *date;
            let source = Arc::clone(&self.source);
            let table = Arc::clone(&table);
            let pair = session.pair.clone();
            let timeout = self.request_timeout;
            requests.spawn(
                async move { fetch_and_record(source, table, pair, date, timeout).await }
                    .in_current_span(),
            );
        }

        let mut report = GatherReport {
            requested: dates.len(),
            ..GatherReport::default()
        };
        let mut base = None;
        while let Some(joined) = requests.join_next().await {
            match joined {
                Ok(FetchOutcome::Recorded { base: quoted }) => {
                    report.succeeded += 1;
                    base.get_or_insert(quoted);
                }
                Ok(FetchOutcome::Dropped) => report.failed += 1,
                Err(e) => {
                    warn!("Rate request task aborted: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Gathered {}/{} dates ({} dropped)",
            report.succeeded, report.requested, report.failed
        );

        let series_table = Arc::clone(&table);
        let (source_series, target_series, labels) = tokio::task::spawn_blocking(move || {
            (
                series_table.source_series(),
                series_table.target_series(),
                series_table.dates_by_index(),
            )
        })
        .await
        .map_err(|e| ExchangeError::Background(e.to_string()))?;

        Ok(ExchangeSnapshot {
            pair: session.pair.clone(),
            interval: session.interval,
            source_series,
            target_series,
            labels,
            base,
            report,
            table,
        })
    }
}

async fn fetch_and_record(
    source: Arc<dyn RateSource>,
    table: Arc<DataTable>,
    pair: CurrencyPair,
    date: SampleDate,
    timeout: Duration,
) -> FetchOutcome {
    // Queueing for the rate limit is not part of the request timeout
    source.throttle().await;

    let response = match tokio::time::timeout(timeout, source.fetch_rates(date, &pair)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!("API call failed for {}: {}", date, e);
            return FetchOutcome::Dropped;
        }
        Err(_) => {
            warn!("API call for {} timed out after {:?}", date, timeout);
            return FetchOutcome::Dropped;
        }
    };

    if response.date != date.date() {
        debug!("Provider answered {} with rates published on {}", date, response.date);
    }

    match table.record_rates(date, &response.rates) {
        Ok(0) => {
            warn!("API returned no rates for {}", date);
            FetchOutcome::Dropped
        }
        Ok(count) => {
            debug!("API call successful for {} ({} rates)", date, count);
            FetchOutcome::Recorded { base: response.base }
        }
        Err(e) => {
            warn!("Dropping response: {}", e);
            FetchOutcome::Dropped
        }
    }
}
