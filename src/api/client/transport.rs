//! HTTP transport helpers for Gemini requests.

use crate::error::ApiError;
use std::time::Duration;

/// Build an HTTP client with timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Append actionable hints to common misconfiguration statuses.
pub(super) fn with_diagnostic_hints(model: &str, err: ApiError) -> ApiError {
    let ApiError::Status {
        code,
        mut body,
        retry_after_secs,
    } = err
    else {
        return err;
    };

    match code {
        400 if body.contains("API_KEY_INVALID") => {
            body.push_str("\nHint: GOOGLE_API_KEY was rejected; check the key in your .env file.");
        }
        401 | 403 => {
            body.push_str(
                "\nHint: the API key is not authorized for the Generative Language API.",
            );
        }
        404 => {
            body.push_str(&format!(
                "\nHint: model `{model}` was not found; set GEMINI_MODEL to an available model."
            ));
        }
        _ => {}
    }
    ApiError::status(code, body, retry_after_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_model_setting() {
        let err = with_diagnostic_hints(
            "gemini-9",
            ApiError::status(404, "not found".into(), None),
        );
        let text = err.to_string();
        assert!(text.contains("`gemini-9`"), "missing hint: {text}");
        assert!(text.contains("GEMINI_MODEL"), "missing hint: {text}");
    }

    #[test]
    fn rate_limit_passes_through_untouched() {
        let err = with_diagnostic_hints("m", ApiError::status(429, "quota".into(), Some(4)));
        assert_eq!(err.to_string(), "status 429: quota");
        assert_eq!(err.retry_after_secs(), Some(4));
    }

    #[test]
    fn invalid_key_hint() {
        let err = with_diagnostic_hints(
            "m",
            ApiError::status(400, r#"{"reason":"API_KEY_INVALID"}"#.into(), None),
        );
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }
}
