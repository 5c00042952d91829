//! HTTP client for the Gemini `generateContent` API.
//!
//! The API layer is split into cohesive modules:
//! - `gemini`: wire request for `models/{model}:generateContent`
//! - `client`: endpoint/credential holder and dispatch
//! - `retry`: rate-limit cooldown wrapper usable around any [`ModelClient`]

use crate::error::ApiError;
use crate::types::{GenerateRequest, GenerateResponse};
use async_trait::async_trait;

mod client;
mod gemini;
pub mod retry;

pub use client::ApiClient;
pub use retry::{RateLimitPolicy, RateLimitedClient};

/// Minimal model API interface used by the review loop.
///
/// Tests provide deterministic scripted responses through this trait while
/// the production path uses [`ApiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError>;
}

/// Parse a delta-seconds `Retry-After` header.
pub(crate) fn parse_retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn retry_after_accepts_delta_seconds_only() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after_secs(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 30 "));
        assert_eq!(parse_retry_after_secs(&headers), Some(30));
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after_secs(&headers), None);
    }
}
