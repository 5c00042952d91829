//! Startup preflight validation.
//!
//! These checks run before the session starts to surface common
//! configuration mistakes as actionable errors instead of raw API or process
//! failures.

use crate::config::Config;
use crate::error::{ConfigError, ToolError};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Validate that the resolved configuration can be used for requests.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api.api_key.trim().is_empty() {
        return Err(ConfigError::Missing("GOOGLE_API_KEY"));
    }
    validate_base_url(&config.api.base_url)?;
    if config.api.model.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "resolved an empty model name; set GEMINI_MODEL or pass --model".to_string(),
        ));
    }
    if config.server.command.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "TIDY_FS_SERVER_COMMAND is empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(
            "no API base URL configured; set GEMINI_BASE_URL".to_string(),
        ));
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|err| ConfigError::Invalid(format!("invalid GEMINI_BASE_URL `{trimmed}`: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::Invalid(format!(
                "invalid GEMINI_BASE_URL `{trimmed}`: unsupported scheme `{other}` (expected http or https)"
            )));
        }
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::Invalid(format!(
            "invalid GEMINI_BASE_URL `{trimmed}`: missing host"
        )));
    }
    Ok(())
}

/// Confirm the server launcher runs by invoking `<command> --version`.
pub async fn check_server_binary(command: &str) -> Result<(), ToolError> {
    let probe = Command::new(command)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(VERSION_PROBE_TIMEOUT, probe).await {
        Err(_) => return Err(ToolError::Timeout(VERSION_PROBE_TIMEOUT)),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolError::BinaryNotFound(command.to_string()));
        }
        Ok(Err(e)) => {
            return Err(ToolError::Spawn(format!("failed to run `{command} --version`: {e}")));
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        return Err(ToolError::Spawn(format!(
            "`{command} --version` exited with {}",
            output.status
        )));
    }
    debug!(
        command,
        version = %String::from_utf8_lossy(&output.stdout).trim(),
        "server launcher available"
    );
    Ok(())
}
