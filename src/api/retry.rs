//! Rate-limit cooldown wrapper for model requests.
//!
//! When the provider signals "too many requests" the wrapper tells the user,
//! waits a fixed cooldown, tells the user again, and reissues the identical
//! request. The number of automatic reissues is bounded; once exhausted the
//! rate-limit error is returned like any other failure.

use super::ModelClient;
use crate::config::RetryConfig;
use crate::error::ApiError;
use crate::types::{GenerateRequest, GenerateResponse};
use crate::ui::render::RenderSink;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Bounded cooldown policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Pause before each automatic reissue.
    pub cooldown: Duration,
    /// Reissues allowed per logical request, excluding the first attempt.
    pub max_retries: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RateLimitPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            cooldown: Duration::from_secs(config.cooldown_secs),
            max_retries: config.max_retries,
        }
    }
}

/// [`ModelClient`] decorator applying [`RateLimitPolicy`].
pub struct RateLimitedClient<C> {
    inner: C,
    policy: RateLimitPolicy,
    sink: Arc<dyn RenderSink>,
}

impl<C: ModelClient> RateLimitedClient<C> {
    pub fn new(inner: C, policy: RateLimitPolicy, sink: Arc<dyn RenderSink>) -> Self {
        Self {
            inner,
            policy,
            sink,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: ModelClient> ModelClient for RateLimitedClient<C> {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        let mut retries: u32 = 0;
        loop {
            match self.inner.generate(request).await {
                Err(err) if err.is_rate_limit() && retries < self.policy.max_retries => {
                    retries += 1;
                    warn!(
                        retry = retries,
                        cooldown_secs = self.policy.cooldown.as_secs(),
                        server_retry_after = ?err.retry_after_secs(),
                        "model rate limit hit"
                    );
                    self.sink.warn(&format!(
                        "API rate limit hit (429). Pausing for {} seconds before retrying...",
                        self.policy.cooldown.as_secs()
                    ));
                    sleep(self.policy.cooldown).await;
                    self.sink.activity(&format!(
                        "Pause complete; retrying the request (retry {retries} of {}).",
                        self.policy.max_retries
                    ));
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{RecordingSink, ScriptedModel};
    use crate::types::Content;

    fn request() -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content::user("plan please")],
            system_instruction: None,
            generation_config: None,
        }
    }

    fn policy(max_retries: u32) -> RateLimitPolicy {
        RateLimitPolicy {
            cooldown: Duration::from_millis(1),
            max_retries,
        }
    }

    #[tokio::test]
    async fn one_rate_limit_means_one_pause_and_one_identical_reissue() {
        let model = ScriptedModel::new(vec![
            Err(ApiError::status(429, "quota".into(), None)),
            Ok("create_directory('A')".to_string()),
        ]);
        let sink = Arc::new(RecordingSink::default());
        let client = RateLimitedClient::new(model, policy(1), sink.clone());

        let response = client.generate(&request()).await.expect("retry recovers");
        assert_eq!(response.text().as_deref(), Some("create_directory('A')"));

        let seen = client.inner().requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1], "reissued request must be identical");

        let lines = sink.lines();
        assert_eq!(
            lines.iter().filter(|l| l.contains("rate limit hit")).count(),
            1
        );
        assert_eq!(
            lines.iter().filter(|l| l.contains("retrying the request")).count(),
            1
        );
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let model = ScriptedModel::new(vec![
            Err(ApiError::status(429, "quota".into(), None)),
            Err(ApiError::status(429, "quota".into(), None)),
            Ok("never reached".to_string()),
        ]);
        let sink = Arc::new(RecordingSink::default());
        let client = RateLimitedClient::new(model, policy(1), sink);

        let err = client.generate(&request()).await.expect_err("exhausted");
        assert!(err.is_rate_limit());
        assert_eq!(client.inner().requests().len(), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let model = ScriptedModel::new(vec![
            Err(ApiError::status(500, "boom".into(), None)),
            Ok("never reached".to_string()),
        ]);
        let sink = Arc::new(RecordingSink::default());
        let client = RateLimitedClient::new(model, policy(3), sink.clone());

        let err = client.generate(&request()).await.expect_err("500 propagates");
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(client.inner().requests().len(), 1);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn policy_from_config() {
        let policy = RateLimitPolicy::from(RetryConfig {
            cooldown_secs: 65,
            max_retries: 1,
        });
        assert_eq!(policy.cooldown, Duration::from_secs(65));
        assert_eq!(policy, RateLimitPolicy::default());
    }
}
