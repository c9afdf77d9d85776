use crate::app_config::{AppConfig, Environment, ProxySettings};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Proxy variables are collected into [`ProxySettings`] without validation;
/// a broken proxy configuration never fails here.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("SHELFDB_ENV", "development"))?;

    let bind_addr = parse("SHELFDB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SHELFDB_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default("SHELFDB_SOURCES_PATH", "./config/sources.yaml"));

    let db_max_connections = parse_u32("SHELFDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SHELFDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHELFDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("SHELFDB_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "SHELFDB_SCRAPER_USER_AGENT",
        "shelfdb/0.1 (listing-ingest)",
    );
    let scraper_inter_request_delay_ms =
        parse_u64("SHELFDB_SCRAPER_INTER_REQUEST_DELAY_MS", "250")?;
    let scraper_max_retries = parse_u32("SHELFDB_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("SHELFDB_SCRAPER_RETRY_BACKOFF_BASE_SECS", "5")?;

    let batch_size = parse_usize("SHELFDB_BATCH_SIZE", "100")?;
    if batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHELFDB_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let batch_delay_ms = parse_u64("SHELFDB_BATCH_DELAY_MS", "300")?;

    let proxy = ProxySettings {
        use_proxy: optional("SHELFDB_USE_PROXY").is_some_and(|v| parse_switch(&v)),
        scheme: optional("SHELFDB_PROXY_SCHEME").unwrap_or_else(|| "http".to_string()),
        host: optional("SHELFDB_PROXY_HOST"),
        port: optional("SHELFDB_PROXY_PORT"),
        username: optional("SHELFDB_PROXY_USERNAME"),
        password: optional("SHELFDB_PROXY_PASSWORD"),
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        sources_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        batch_size,
        batch_delay_ms,
        proxy,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHELFDB_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Interprets a boolean feature switch. Anything unrecognized is "off".
fn parse_switch(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
