//! Runtime configuration.
//!
//! Settings come from the process environment (optionally seeded from a
//! `.env` file by the binary) and are resolved once at startup. CLI flags are
//! applied on top by `main`.

mod env;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_RATE_LIMIT_COOLDOWN_SECS: u64 = 65;
pub const DEFAULT_RATE_LIMIT_RETRIES: u32 = 1;
pub const DEFAULT_SERVER_COMMAND: &str = "npx";
pub const DEFAULT_SERVER_PACKAGE: &str = "@modelcontextprotocol/server-filesystem";

/// Model endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Directory boundary settings, kept as raw user text until the path guard
/// resolves them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    /// Outermost boundary; `~` by default.
    pub allowed_root: String,
    pub default_target_dir: Option<String>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            allowed_root: "~".to_string(),
            default_target_dir: None,
        }
    }
}

/// How the filesystem tool server is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub command: String,
    pub package: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_SERVER_COMMAND.to_string(),
            package: DEFAULT_SERVER_PACKAGE.to_string(),
        }
    }
}

/// Rate-limit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub cooldown_secs: u64,
    /// Automatic reissues after a rate-limit, not counting the first attempt.
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_RATE_LIMIT_COOLDOWN_SECS,
            max_retries: DEFAULT_RATE_LIMIT_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub color: bool,
    /// Echo raw model responses and enable debug-level tracing.
    pub debug: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api: ApiConfig,
    pub paths: PathConfig,
    pub server: ServerConfig,
    pub retry: RetryConfig,
    pub display: DisplayConfig,
}

/// Resolve configuration from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&|key: &str| std::env::var(key).ok())
}

/// Resolve configuration from an arbitrary key lookup.
pub fn load_config_from<FEnv>(env_lookup: &FEnv) -> Result<Config, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let mut config = Config::default();

    config.api.api_key =
        env::non_empty(env_lookup, "GOOGLE_API_KEY").ok_or(ConfigError::Missing("GOOGLE_API_KEY"))?;
    if let Some(url) = env::non_empty(env_lookup, "GEMINI_BASE_URL") {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(model) = env::non_empty(env_lookup, "GEMINI_MODEL") {
        config.api.model = model;
    }
    // Clamp to at least 1 second to avoid an accidental "no timeout".
    config.api.timeout_secs =
        env::unsigned(env_lookup, "TIDY_API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS)?.max(1);

    if let Some(root) = env::non_empty(env_lookup, "TOP_LEVEL_ALLOWED_PATH") {
        config.paths.allowed_root = root;
    }
    config.paths.default_target_dir = env::non_empty(env_lookup, "DEFAULT_TARGET_DIR");

    if let Some(command) = env::non_empty(env_lookup, "TIDY_FS_SERVER_COMMAND") {
        config.server.command = command;
    }
    if let Some(package) = env::non_empty(env_lookup, "TIDY_FS_SERVER_PACKAGE") {
        config.server.package = package;
    }

    config.retry.cooldown_secs = env::unsigned(
        env_lookup,
        "TIDY_RATE_LIMIT_COOLDOWN_SECS",
        DEFAULT_RATE_LIMIT_COOLDOWN_SECS,
    )?;
    let retries = env::unsigned(
        env_lookup,
        "TIDY_RATE_LIMIT_RETRIES",
        u64::from(DEFAULT_RATE_LIMIT_RETRIES),
    )?;
    config.retry.max_retries = u32::try_from(retries).map_err(|_| {
        ConfigError::Invalid(format!("TIDY_RATE_LIMIT_RETRIES value `{retries}` is too large"))
    })?;

    config.display.debug = env::bool_flag(env_lookup, "DEBUG", false)?;
    // https://no-color.org: any non-empty value disables color.
    config.display.color = env::non_empty(env_lookup, "NO_COLOR").is_none();

    Ok(config)
}
