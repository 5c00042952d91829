//! Unified error types for the organizer.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ToolError
// ---------------------------------------------------------------------------

/// Errors arising from the filesystem tool server session.
#[derive(Debug)]
pub enum ToolError {
    /// The launcher binary could not be located on `PATH`.
    BinaryNotFound(String),
    /// The process could not be spawned or its pipes captured.
    Spawn(String),
    /// Reading or writing the stdio channel failed.
    Io(String),
    /// The server replied with something that is not valid JSON-RPC/MCP.
    Protocol(String),
    /// The server did not answer within the request timeout.
    Timeout(Duration),
    /// The server returned a JSON-RPC error object.
    Server { code: i64, message: String },
    /// The tool ran but reported a failure (`isError: true`).
    ExecutionFailed(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BinaryNotFound(cmd) => write!(
                f,
                "`{cmd}` not found; install Node.js (npm/npx) and make sure it is on PATH"
            ),
            Self::Spawn(msg) => write!(f, "spawn: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
            Self::Timeout(after) => write!(f, "tool server did not respond within {after:?}"),
            Self::Server { code, message } => write!(f, "server error {code}: {message}"),
            Self::ExecutionFailed(msg) => write!(f, "execution failed: {msg}"),
        }
    }
}

impl std::error::Error for ToolError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when resolving configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required key is absent or empty.
    Missing(&'static str),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the model HTTP API layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status {
        code: u16,
        body: String,
        retry_after_secs: Option<u64>,
    },
    /// A 2xx response whose payload could not be used.
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(code: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        Self::Status {
            code,
            body,
            retry_after_secs,
        }
    }

    /// HTTP status code when this is a status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Server-suggested retry delay, if one was sent.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Status {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }

    /// True for the provider's transient "too many requests" signal.
    ///
    /// Gemini reports quota exhaustion as HTTP 429 with a `RESOURCE_EXHAUSTED`
    /// status in the body; some proxies keep the body but rewrite the code.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::Status { code, body, .. } => {
                *code == 429 || body.to_ascii_uppercase().contains("RESOURCE_EXHAUSTED")
            }
            _ => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// StartupError: fatal, top-level
// ---------------------------------------------------------------------------

/// Errors that end the run before or while bringing the session up.
#[derive(Debug)]
pub enum StartupError {
    Config(ConfigError),
    Tool(ToolError),
    /// Console input closed before a target directory was chosen.
    NoTargetDirectory,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Tool(e) => write!(f, "tool server: {e}"),
            Self::NoTargetDirectory => {
                write!(f, "could not determine a valid target directory to organize")
            }
        }
    }
}

impl std::error::Error for StartupError {}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ToolError> for StartupError {
    fn from(e: ToolError) -> Self {
        Self::Tool(e)
    }
}
