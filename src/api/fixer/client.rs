use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::sync::Mutex;
use tracing::{debug, warn};
use super::models::{parse_rates_body, ApiError, RatesResponse};
use crate::api::RateSource;
use crate::models::{CurrencyPair, SampleDate};
use crate::utils::ratelimit::{self, RequestThrottle};

/// Client for Fixer-compatible historical exchange rate APIs
pub struct FixerClient {
    http_client: HttpClient,
    base_url: String,
    access_key: Option<String>,
    throttle: Mutex<RequestThrottle>,
}

impl FixerClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.frankfurter.app";
    const DEFAULT_MAX_REQUESTS_PER_SECOND: usize = 5;

    /// Create a new client with custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: None,
            throttle: Mutex::new(RequestThrottle::per_second(Self::DEFAULT_MAX_REQUESTS_PER_SECOND)),
        }
    }

    /// Send `access_key` with every request (data.fixer.io)
    pub fn with_access_key(mut self, access_key: Option<String>) -> Self {
        self.access_key = access_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_max_requests_per_second(mut self, max_requests: usize) -> Self {
        self.throttle = Mutex::new(RequestThrottle::per_second(max_requests));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL and query parameters for one historical lookup
    fn request_parts(&self, date: SampleDate, pair: &CurrencyPair) -> (String, Vec<(&'static str, String)>) {
        let url = format!("{}/{}", self.base_url, date);
        let mut query = vec![("symbols", pair.query())];
        if let Some(key) = &self.access_key {
            query.push(("access_key", key.clone()));
        }
        (url, query)
    }

    /// Map a non-success HTTP status to an error
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let body_text = response.text().await.unwrap_or_default();
        let message = ApiError::body_message(&body_text);

        match status_code {
            400 => ApiError::BadRequest(message),
            401 | 403 => ApiError::Unauthorized(message),
            404 | 422 => ApiError::NotFound(message),
            429 => {
                warn!("Rate limited by exchange rate API, retry after {:?} s", retry_after);
                ApiError::RateLimited { retry_after }
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    /// GET /{date}?symbols=SRC,TGT
    ///
    /// Retrieves the rates of both currencies of `pair` on `date`, relative to
    /// the provider's base currency. Does not wait on the rate limit; callers
    /// go through [`RateSource::throttle`] first.
    pub async fn get_historical_rates(
        &self,
        date: SampleDate,
        pair: &CurrencyPair,
    ) -> Result<RatesResponse, ApiError> {
        let (url, query) = self.request_parts(date, pair);
        debug!("GET {} symbols={}", url, pair.query());

        let response = self.http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::RequestError(format!("Failed to read response: {}", e)))?;

        parse_rates_body(&body)
    }
}

#[async_trait]
impl RateSource for FixerClient {
    async fn throttle(&self) {
        ratelimit::acquire(&self.throttle).await;
    }

    async fn fetch_rates(&self, date: SampleDate, pair: &CurrencyPair) -> Result<RatesResponse, ApiError> {
        self.get_historical_rates(date, pair).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixer::test_server::{StubResponse, StubServer};
    use chrono::NaiveDate;

    fn date() -> SampleDate {
        SampleDate(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap())
    }

    #[test]
    fn test_request_parts_without_key() {
        let client = FixerClient::with_base_url("https://rates.example.com/".to_string());
        let pair = CurrencyPair::new("USD", "GBP").unwrap();

        let (url, query) = client.request_parts(date(), &pair);
        assert_eq!(url, "https://rates.example.com/2024-01-07");
        assert_eq!(query, vec![("symbols", "USD,GBP".to_string())]);
    }

    #[test]
    fn test_request_parts_with_key() {
        let client = FixerClient::with_base_url("http://data.fixer.io/api".to_string())
            .with_access_key(Some("secret".to_string()));
        let pair = CurrencyPair::new("USD", "GBP").unwrap();

        let (_, query) = client.request_parts(date(), &pair);
        assert!(query.contains(&("access_key", "secret".to_string())));
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let client = FixerClient::with_base_url(FixerClient::DEFAULT_BASE_URL.to_string())
            .with_access_key(Some("  ".to_string()));
        let pair = CurrencyPair::new("USD", "GBP").unwrap();

        let (_, query) = client.request_parts(date(), &pair);
        assert_eq!(query.len(), 1);
        assert_eq!(client.base_url(), FixerClient::DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let client = FixerClient::with_base_url("http://127.0.0.1:1".to_string());
        let pair = CurrencyPair::new("USD", "GBP").unwrap();

        let err = client.fetch_rates(date(), &pair).await.unwrap_err();
        assert!(matches!(err, ApiError::RequestError(_)));
    }

    fn usd_gbp() -> CurrencyPair {
        CurrencyPair::new("USD", "GBP").unwrap()
    }

    /// Status and body the stub answers with, mapped to the error it should produce
    async fn error_for(response: StubResponse) -> ApiError {
        let response = Mutex::new(Some(response));
        let server = StubServer::start(move |_| {
            response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| StubResponse::new(500, "answered twice"))
        })
        .await;

        let client = FixerClient::with_base_url(server.base_url.clone());
        client.fetch_rates(date(), &usd_gbp()).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_success_body_is_decoded() {
        let server = StubServer::start(|_| {
            StubResponse::new(
                200,
                r#"{"amount":1.0,"base":"EUR","date":"2024-01-05","rates":{"GBP":0.86,"USD":1.09}}"#,
            )
        })
        .await;
        let client = FixerClient::with_base_url(server.base_url.clone())
            .with_access_key(Some("secret".to_string()));

        let response = client.fetch_rates(date(), &usd_gbp()).await.unwrap();

        assert_eq!(response.base, "EUR");
        assert_eq!(response.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(response.rates.get("USD"), Some(&1.09));
        assert_eq!(response.rates.get("GBP"), Some(&0.86));

        let targets = server.targets();
        assert_eq!(targets.len(), 1);
        assert!(targets[0].starts_with("/2024-01-07?symbols=USD"));
        assert!(targets[0].contains("GBP"));
        assert!(targets[0].ends_with("&access_key=secret"));
    }

    #[tokio::test]
    async fn test_in_band_failure_is_rejected() {
        let body = r#"{"success":false,"error":{"code":106,"type":"no_rates_available"}}"#;
        let err = error_for(StubResponse::new(200, body)).await;

        assert_eq!(
            err,
            ApiError::Rejected { code: 106, info: "no_rates_available".to_string() }
        );
    }

    #[tokio::test]
    async fn test_bad_request() {
        let err = error_for(StubResponse::new(400, r#"{"message":"bad date"}"#)).await;
        assert_eq!(err, ApiError::BadRequest("bad date".to_string()));
    }

    #[tokio::test]
    async fn test_unauthorized_and_forbidden() {
        let body = r#"{"success":false,"error":{"code":101,"type":"invalid_access_key","info":"Invalid key."}}"#;
        assert_eq!(
            error_for(StubResponse::new(401, body)).await,
            ApiError::Unauthorized("Invalid key.".to_string())
        );
        assert_eq!(
            error_for(StubResponse::new(403, "forbidden")).await,
            ApiError::Unauthorized("forbidden".to_string())
        );
    }

    #[tokio::test]
    async fn test_not_found_and_unprocessable() {
        assert_eq!(
            error_for(StubResponse::new(404, r#"{"message":"not found"}"#)).await,
            ApiError::NotFound("not found".to_string())
        );
        assert_eq!(
            error_for(StubResponse::new(422, r#"{"message":"invalid date"}"#)).await,
            ApiError::NotFound("invalid date".to_string())
        );
    }

    #[tokio::test]
    async fn test_rate_limited_reads_retry_after() {
        let err = error_for(StubResponse::new(429, "").with_header("Retry-After", "7")).await;
        assert_eq!(err, ApiError::RateLimited { retry_after: Some(7) });

        let err = error_for(StubResponse::new(429, "slow down")).await;
        assert_eq!(err, ApiError::RateLimited { retry_after: None });
    }

    #[tokio::test]
    async fn test_server_error() {
        let err = error_for(StubResponse::new(503, r#"{"message":"maintenance"}"#)).await;
        assert_eq!(err, ApiError::ServerError(503, "maintenance".to_string()));
    }

    #[tokio::test]
    async fn test_other_status_is_http_error() {
        let err = error_for(StubResponse::new(418, "teapot")).await;
        assert_eq!(err, ApiError::HttpError(418, "teapot".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_does_not_wait_on_throttle() {
        let server = StubServer::start(|_| {
            StubResponse::new(200, r#"{"base":"EUR","date":"2024-01-05","rates":{"USD":1.09}}"#)
        })
        .await;
        let client = FixerClient::with_base_url(server.base_url.clone()).with_max_requests_per_second(1);

        client.throttle().await;
        let started = std::time::Instant::now();
        client.fetch_rates(date(), &usd_gbp()).await.unwrap();
        client.fetch_rates(date(), &usd_gbp()).await.unwrap();
        assert!(started.elapsed() < std::time::Duration::from_millis(900));

        // The window is full, so the next admission waits
        let started = std::time::Instant::now();
        client.throttle().await;
        assert!(started.elapsed() >= std::time::Duration::from_millis(100));
    }
}
