//! API client for the Gemini endpoint.
//!
//! The client itself never retries: rate-limit handling is a separate,
//! user-visible layer (`api::retry`) and every other failure is reported to
//! the caller as-is.

mod transport;

use super::gemini;
use super::ModelClient;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{GenerateRequest, GenerateResponse};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Client for the Gemini `generateContent` API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ApiClient {
    /// Build a client from resolved API configuration.
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_timeout(config, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(config: &ApiConfig, timeout: Duration) -> Self {
        Self {
            http: transport::build_http_client(timeout),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.trim().to_string(),
        }
    }

    /// Send one request and return the raw response.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        debug!(
            model = %self.model,
            turns = request.contents.len(),
            "sending generateContent request"
        );
        let response = gemini::request(
            &self.http,
            &self.base_url,
            &self.model,
            &self.api_key,
            request,
        )
        .await
        .map_err(|err| transport::with_diagnostic_hints(&self.model, err))?;
        if let Some(usage) = response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "generateContent usage"
            );
        }
        Ok(response)
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        ApiClient::generate(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Content;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request() -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content::user("hello")],
            system_instruction: None,
            generation_config: None,
        }
    }

    fn api_for(addr: std::net::SocketAddr) -> ApiConfig {
        ApiConfig {
            base_url: format!("http://{addr}/v1beta"),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn api_client_respects_timeout_policy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Keep the connection open so the client must hit its timeout.
        let _accept = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = ApiClient::with_timeout(&api_for(addr), Duration::from_millis(50));
        let err = client.generate(&request()).await.expect_err("timeout expected");
        match err {
            ApiError::Http(inner) => assert!(inner.is_timeout(), "unexpected error: {inner}"),
            other => panic!("expected timeout Http error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn api_client_posts_to_model_endpoint_with_key_header() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = vec![0u8; 8192];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"done"}]},"finishReason":"STOP"}]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        let client = ApiClient::with_timeout(&api_for(addr), Duration::from_secs(3));
        let response = client.generate(&request()).await.expect("success");
        assert_eq!(response.text().as_deref(), Some("done"));

        let raw_request = server.await.unwrap();
        assert!(
            raw_request.starts_with("POST /v1beta/models/test-model:generateContent "),
            "request line: {raw_request}"
        );
        assert!(
            raw_request.to_ascii_lowercase().contains("x-goog-api-key: test-key"),
            "headers: {raw_request}"
        );
    }

    #[tokio::test]
    async fn api_client_surfaces_429_without_retrying() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#;
            let response = format!(
                "HTTP/1.1 429 Too Many Requests\r\nContent-Type: application/json\r\nRetry-After: 12\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        });

        let client = ApiClient::with_timeout(&api_for(addr), Duration::from_secs(3));
        let err = client.generate(&request()).await.expect_err("429 expected");
        assert!(err.is_rate_limit(), "got: {err}");
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.retry_after_secs(), Some(12));
    }

    #[tokio::test]
    async fn api_client_reports_undecodable_success_body_as_invalid_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let body = "<html>captive portal</html>";
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        });

        let client = ApiClient::with_timeout(&api_for(addr), Duration::from_secs(3));
        let err = client.generate(&request()).await.expect_err("decode failure expected");
        assert!(matches!(err, ApiError::InvalidResponse(_)), "got: {err}");
        assert!(!err.is_rate_limit());
    }
}
