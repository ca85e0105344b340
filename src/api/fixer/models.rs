use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Historical rates response: `GET /{date}?symbols=SRC,TGT`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesResponse {
    pub base: String,
    /// Date the provider actually published the rates for (may precede the queried date)
    pub date: NaiveDate,
    pub rates: BTreeMap<String, f64>,
}

/// Fixer reports failures as `200 {"success": false, "error": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixerErrorBody {
    pub success: bool,
    pub error: FixerErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixerErrorDetail {
    pub code: i32,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub info: Option<String>,
}

/// Error body of Frankfurter-style providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Comprehensive error type for API operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 401/403, missing or invalid access key
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 404 Not Found, usually a date outside the provider's history
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited. Retry after {retry_after:?} s")]
    RateLimited { retry_after: Option<u64> },
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Provider answered 200 but flagged the request as failed
    #[error("Rejected by provider ({code}): {info}")]
    Rejected { code: i32, info: String },
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Deserialization error
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// Pull the most useful message out of an error body
    pub fn body_message(body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<MessageBody>(body) {
            return parsed.message;
        }
        if let Ok(parsed) = serde_json::from_str::<FixerErrorBody>(body) {
            return parsed.error.info.or(parsed.error.kind).unwrap_or_default();
        }
        body.trim().to_string()
    }
}

/// Decode a successful HTTP body into rates, recognising Fixer's in-band errors
pub fn parse_rates_body(body: &str) -> Result<RatesResponse, ApiError> {
    if let Ok(failure) = serde_json::from_str::<FixerErrorBody>(body) {
        if !failure.success {
            return Err(ApiError::Rejected {
                code: failure.error.code,
                info: failure
                    .error
                    .info
                    .or(failure.error.kind)
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
    }

    serde_json::from_str::<RatesResponse>(body)
        .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
}
