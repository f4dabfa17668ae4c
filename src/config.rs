// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

/// Rows shown per page on the results screen.
pub const RESULTS_PAGE_SIZE: usize = 10;

/// Quiet period before a test-filter change triggers a refetch.
pub const REFETCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// How long the "session expired" notice stays up before redirecting to login.
pub const SESSION_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// How long the summary modal shows its success state before closing.
pub const SUMMARY_DISMISS_DELAY: Duration = Duration::from_millis(1500);

pub const LOGIN_PATH: &str = "/login";

/// Cookie carrying the admin bearer token when no Authorization header is sent.
pub const SESSION_COOKIE: &str = "compass_token";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Strengths Compass REST API, always ending with '/'.
    pub api_base_url: Url,
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
    pub upstream_timeout_secs: u64,
    pub rust_log: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let api_base_url = env::var("COMPASS_API_URL")
            .map_err(|_| AppError::Internal("COMPASS_API_URL must be set".to_string()))?;
        let api_base_url = parse_base_url(&api_base_url)?;

        let bind_addr = env::var("CONSOLE_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Internal(format!("CONSOLE_BIND_ADDR is invalid: {}", e)))?;

        let allowed_origin = env::var("CONSOLE_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let upstream_timeout_secs = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                AppError::Internal(format!("UPSTREAM_TIMEOUT_SECS is invalid: {}", e))
            })?,
            Err(_) => 30,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Ok(Self {
            api_base_url,
            bind_addr,
            allowed_origin,
            upstream_timeout_secs,
            rust_log,
            log_dir,
        })
    }

    /// Configuration pointing at `api_base_url` with defaults for everything else.
    pub fn for_upstream(api_base_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            allowed_origin: "http://localhost:5173".to_string(),
            upstream_timeout_secs: 30,
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
        })
    }
}

/// Parses the upstream base URL and makes sure relative joins keep its path.
pub fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    let url = Url::parse(&normalized)
        .map_err(|e| AppError::Internal(format!("COMPASS_API_URL is invalid: {}", e)))?;
    if url.cannot_be_a_base() {
        return Err(AppError::Internal(
            "COMPASS_API_URL must be an http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("https://api.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/");
        assert_eq!(
            url.join("tests").unwrap().as_str(),
            "https://api.example.com/api/tests"
        );
    }

    #[test]
    fn base_url_rejects_garbage() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:admin@example.com").is_err());
    }
}
