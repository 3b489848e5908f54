use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// development config pointed at the public trends site.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i32 = |var: &str, default: &str| -> Result<i32, ConfigError> {
        or_default(var, default)
            .parse::<i32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("TRENDSCOPE_ENV", "development"))?;
    let bind_addr = parse_addr("TRENDSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("TRENDSCOPE_LOG_LEVEL", "info");

    let upstream_base_url = or_default("TRENDSCOPE_UPSTREAM_BASE_URL", "https://trends.google.com/");
    if !(upstream_base_url.starts_with("http://") || upstream_base_url.starts_with("https://")) {
        return Err(invalid(
            "TRENDSCOPE_UPSTREAM_BASE_URL",
            "must be an http(s) URL".to_string(),
        ));
    }
    let host_language = or_default("TRENDSCOPE_HOST_LANGUAGE", "en-US");
    let tz_offset_minutes = parse_i32("TRENDSCOPE_TZ_OFFSET_MINUTES", "360")?;
    let request_timeout_secs = parse_u64("TRENDSCOPE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("TRENDSCOPE_USER_AGENT", "trendscope/0.1 (search-trend-report)");

    let max_attempts = parse_u32("TRENDSCOPE_MAX_ATTEMPTS", "5")?;
    if max_attempts == 0 {
        return Err(invalid(
            "TRENDSCOPE_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let rate_limit_cooldown_secs = parse_u64("TRENDSCOPE_RATE_LIMIT_COOLDOWN_SECS", "60")?;
    let wordcloud_max_words = parse_usize("TRENDSCOPE_WORDCLOUD_MAX_WORDS", "25")?;
    let inbound_rate_limit_per_min = parse_usize("TRENDSCOPE_INBOUND_RATE_LIMIT_PER_MIN", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_base_url,
        host_language,
        tz_offset_minutes,
        request_timeout_secs,
        user_agent,
        max_attempts,
        rate_limit_cooldown_secs,
        wordcloud_max_words,
        inbound_rate_limit_per_min,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TRENDSCOPE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
