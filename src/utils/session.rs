// src/utils/session.rs

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    body::Body,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};

use crate::{config::SESSION_COOKIE, error::AppError};

/// Where the API client reads its bearer token from.
///
/// The client never looks the token up on its own; whoever builds it hands a
/// store in, and the client clears that store when the API rejects the token.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn clear(&self);
}

/// Session kept in memory for the lifetime of one console view or request.
#[derive(Default)]
pub struct MemorySession {
    token: Mutex<Option<String>>,
}

impl MemorySession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.token().is_none()
    }
}

impl SessionStore for MemorySession {
    fn token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySession")
            .field("token", &self.token().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Session injected into request extensions by [`require_session`].
#[derive(Clone)]
pub struct Session(pub Arc<dyn SessionStore>);

impl Session {
    pub fn from_token(token: impl Into<String>) -> Self {
        Session(Arc::new(MemorySession::new(token)))
    }
}

/// Reads the admin token from `Authorization: Bearer <token>`, falling back to
/// the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Axum Middleware: Session.
///
/// Rejects the request with "not logged in" when no token is present, so the
/// API is never called without credentials. Otherwise injects a [`Session`]
/// for handlers to build their API client with.
pub async fn require_session(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let token = token_from_headers(req.headers()).ok_or(AppError::MissingAuth)?;
    req.extensions_mut().insert(Session::from_token(token));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("compass_token=xyz"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; compass_token=xyz; lang=en"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_tokens_are_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        headers.insert(header::COOKIE, HeaderValue::from_static("compass_token="));
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn clearing_drops_the_token_and_debug_redacts_it() {
        let session = MemorySession::new("secret-token");
        assert!(!format!("{:?}", session).contains("secret-token"));
        session.clear();
        assert!(session.is_cleared());
    }
}
