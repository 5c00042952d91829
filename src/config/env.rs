//! Environment value parsing helpers.
//!
//! Every reader takes an injected lookup closure so tests never touch the
//! process environment.

use crate::error::ConfigError;

/// Fetch a key, treating empty/whitespace-only values as unset.
pub(super) fn non_empty<FEnv>(env_lookup: &FEnv, key: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a boolean flag. Unset keys yield `default`.
pub(super) fn bool_flag<FEnv>(
    env_lookup: &FEnv,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(env_lookup, key) else {
        return Ok(default);
    };
    parse_bool(&raw).ok_or_else(|| {
        ConfigError::Invalid(format!(
            "invalid {key} value `{raw}`: expected true/false, 1/0, yes/no"
        ))
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a non-negative integer count. Unset keys yield `default`.
pub(super) fn unsigned<FEnv>(env_lookup: &FEnv, key: &str, default: u64) -> Result<u64, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(env_lookup, key) else {
        return Ok(default);
    };
    raw.parse::<u64>().map_err(|_| {
        ConfigError::Invalid(format!(
            "invalid {key} value `{raw}`: expected a non-negative integer"
        ))
    })
}
