// src/api/client.rs

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::AppError;
use crate::utils::session::SessionStore;

const CLIENT_USER_AGENT: &str = concat!("compass-console/", env!("CARGO_PKG_VERSION"));

const JSON: &str = "application/json";

/// Longest slice of an error body kept for logs.
const ERROR_BODY_LIMIT: usize = 300;

/// Builds the shared connection pool used by every [`ApiClient`].
pub fn build_http_client(config: &Config) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .user_agent(CLIENT_USER_AGENT)
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// API client bound to one admin session.
///
/// Cloning is cheap; the connection pool and session are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: Url, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http,
            base_url,
            session,
        }
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::Internal(format!("Invalid API path '{}': {}", path, e)))
    }

    /// Sends one authenticated request and maps failure statuses.
    ///
    /// * no token: `MissingAuth`, nothing is sent;
    /// * 401: the session is cleared and `SessionExpired` returned;
    /// * 404: `NotFound`;
    /// * any other non-2xx or transport failure: `Upstream`.
    async fn send(
        &self,
        method: Method,
        path: &str,
        accept: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, AppError> {
        let token = self.session.token().ok_or(AppError::MissingAuth)?;
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url.path());

        let request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token)
            .header(ACCEPT, accept);
        let response = build(request).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("{} {} was rejected with 401, clearing session", method, path);
            self.session.clear();
            return Err(AppError::SessionExpired);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("'{}' was not found", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(AppError::Upstream(format!(
                "{} {} returned {}: {}",
                method, path, status, snippet
            )));
        }

        Ok(response)
    }

    /// Reads a JSON body; an empty body reads as `null`.
    async fn json_body(response: Response) -> Result<Value, AppError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, AppError> {
        let response = self
            .send(Method::GET, path, JSON, |request| request.query(query))
            .await?;
        Self::json_body(response).await
    }

    /// Downloads a binary body, e.g. a spreadsheet export.
    pub async fn get_bytes(&self, path: &str, accept: &str) -> Result<Vec<u8>, AppError> {
        let response = self.send(Method::GET, path, accept, |request| request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, AppError> {
        let response = self
            .send(Method::POST, path, JSON, |request| request.json(body))
            .await?;
        Self::json_body(response).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, AppError> {
        let response = self
            .send(Method::PUT, path, JSON, |request| request.json(body))
            .await?;
        Self::json_body(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.send(Method::DELETE, path, JSON, |request| request)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_base_url;
    use crate::utils::session::MemorySession;

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        // Port 9 is never listened on; reaching the network would yield Upstream instead.
        let base = parse_base_url("http://127.0.0.1:9/api").unwrap();
        let client = ApiClient::new(reqwest::Client::new(), base, Arc::new(MemorySession::default()));

        let err = client.get_json("tests", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::MissingAuth));
    }

    #[test]
    fn paths_join_under_the_base_path() {
        let base = parse_base_url("http://localhost:8000/api/v1").unwrap();
        let client = ApiClient::new(reqwest::Client::new(), base, Arc::new(MemorySession::new("t")));
        assert_eq!(
            client.url("/test-results/3/report").unwrap().as_str(),
            "http://localhost:8000/api/v1/test-results/3/report"
        );
    }
}
