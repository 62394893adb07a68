use anyhow::{Context, Result};

use crate::manager::pagination::DEFAULT_PAGE_SIZE;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the applications REST API, e.g. `https://careers.example.com/api`.
    pub backend_url: String,
    /// Admin session token forwarded to the backend as a bearer token.
    pub backend_token: Option<String>,
    pub backend_timeout_secs: u64,
    pub login_path: String,
    pub page_size: usize,
    /// Company named in the applicant email template.
    pub company_name: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            backend_url: require_env("BACKEND_URL")?,
            backend_token: std::env::var("BACKEND_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            backend_timeout_secs: parse_env("BACKEND_TIMEOUT_SECS", 30)?,
            login_path: std::env::var("LOGIN_PATH").unwrap_or_else(|_| "/admin/login".to_string()),
            page_size: parse_env("PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            company_name: std::env::var("COMPANY_NAME")
                .unwrap_or_else(|_| "Cybaem Tech".to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
