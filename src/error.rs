// src/error.rs

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::config::{LOGIN_PATH, SESSION_COOKIE, SESSION_REDIRECT_DELAY};

/// A client-side validation failure tied to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// No bearer token available; the request was never sent upstream.
    #[error("Not logged in")]
    MissingAuth,

    /// Upstream answered 401. The session has already been cleared.
    #[error("Session expired")]
    SessionExpired,

    #[error("{}: {}", .0.field, .0.message)]
    Validation(FieldError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure or non-success status from the upstream API.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message safe to show to the admin user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingAuth => "You are not logged in. Please log in to continue.".to_string(),
            AppError::SessionExpired => {
                "Your session has expired. Redirecting to login...".to_string()
            }
            AppError::Validation(field_error) => field_error.message.clone(),
            AppError::BadRequest(msg) | AppError::Conflict(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Upstream(_) => {
                "The server could not complete the request. Please try again.".to_string()
            }
            AppError::Internal(_) => "Internal Server Error".to_string(),
        }
    }
}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.user_message();
        match self {
            AppError::SessionExpired => {
                let body = Json(json!({
                    "error": message,
                    "session_expired": true,
                    "redirect_to": LOGIN_PATH,
                    "redirect_after_ms": SESSION_REDIRECT_DELAY.as_millis() as u64,
                }));
                let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
                let headers = response.headers_mut();
                let refresh = format!("{}; url={}", SESSION_REDIRECT_DELAY.as_secs(), LOGIN_PATH);
                if let Ok(value) = HeaderValue::from_str(&refresh) {
                    headers.insert(header::REFRESH, value);
                }
                let cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE);
                if let Ok(value) = HeaderValue::from_str(&cookie) {
                    headers.insert(header::SET_COOKIE, value);
                }
                response
            }
            AppError::Validation(field_error) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "field": field_error.field,
                })),
            )
                .into_response(),
            AppError::MissingAuth => plain(StatusCode::UNAUTHORIZED, message),
            AppError::BadRequest(_) => plain(StatusCode::BAD_REQUEST, message),
            AppError::Conflict(_) => plain(StatusCode::CONFLICT, message),
            AppError::NotFound(_) => plain(StatusCode::NOT_FOUND, message),
            AppError::Upstream(detail) => {
                tracing::warn!("Upstream request failed: {}", detail);
                plain(StatusCode::BAD_GATEWAY, message)
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal Server Error: {}", detail);
                plain(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

fn plain(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation(err)
    }
}

/// Transport failures never carry the request URL into the message, it may hold query data.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Upstream(format!("malformed JSON from API: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
