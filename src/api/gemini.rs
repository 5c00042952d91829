//! `models/{model}:generateContent` request helper.

use crate::api::parse_retry_after_secs;
use crate::error::ApiError;
use crate::types::{GenerateRequest, GenerateResponse};

/// Send one `generateContent` request and parse the response payload.
pub(crate) async fn request(
    http: &reqwest::Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    request: &GenerateRequest,
) -> Result<GenerateResponse, ApiError> {
    let url = format!("{base_url}/models/{model}:generateContent");
    let response = http
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let retry_after_secs = parse_retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::status(status, body, retry_after_secs));
    }

    // Decode separately so a malformed 2xx body is not mistaken for a
    // transport failure.
    let body = response.text().await?;
    serde_json::from_str::<GenerateResponse>(&body)
        .map_err(|e| ApiError::InvalidResponse(format!("undecodable generateContent body: {e}")))
}
