use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

/// Runtime configuration, sourced from the environment (with `.env`
/// support for development).
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,

    /// Postgres connection string. When absent the server falls back to
    /// the in-memory store (development only).
    pub database_url: Option<String>,

    /// Maximum number of provisioning runs in flight at once.
    pub admission_capacity: usize,

    /// Lifetime of a minted account, in days.
    pub account_ttl_days: i64,

    /// Recovery address used for requesters that did not configure one.
    pub default_recovery_email: String,

    /// Upstream registration bridge endpoint.
    pub registrar_url: String,
    pub registrar_timeout_secs: Option<u64>,

    /// HMAC key for hashing bearer tokens before lookup.
    pub auth_token_key: String,

    pub cors_allowed_origins: Vec<String>,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server_host = env_or("SERVER_HOST", "0.0.0.0");
        let server_port = parse_env("SERVER_PORT", 8000u16)?;

        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let admission_capacity = parse_env("ADMISSION_CAPACITY", 3usize)?;
        let account_ttl_days = parse_env("ACCOUNT_TTL_DAYS", 15i64)?;

        let default_recovery_email = env_or("DEFAULT_RECOVERY_EMAIL", "recovery@tempmail.plus");

        let registrar_url = env_or("REGISTRAR_URL", "http://127.0.0.1:9300/register");
        let registrar_timeout_secs = match std::env::var("REGISTRAR_TIMEOUT_SECS") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("REGISTRAR_TIMEOUT_SECS must be an integer")?,
            ),
            Err(_) => None,
        };

        let auth_token_key = env_or("AUTH_TOKEN_KEY", "change-me-hmac-key");
        if auth_token_key == "change-me-hmac-key" {
            warn!("AUTH_TOKEN_KEY is unset; using the development default");
        }

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let dev_mode = std::env::var("DEV_MODE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            server_host,
            server_port,
            database_url,
            admission_capacity,
            account_ttl_days,
            default_recovery_email,
            registrar_url,
            registrar_timeout_secs,
            auth_token_key,
            cors_allowed_origins,
            dev_mode,
        })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.account_ttl_days * 24 * 60 * 60
    }

    pub fn registrar_timeout(&self) -> Option<Duration> {
        self.registrar_timeout_secs.map(Duration::from_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}
