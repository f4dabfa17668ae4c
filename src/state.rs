use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::FromRef;

use crate::api::client::ApiClient;
use crate::config::Config;
use crate::utils::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub config: Config,
    pub submissions: SubmissionGuard,
}

impl AppState {
    pub fn new(http: reqwest::Client, config: Config) -> Self {
        Self {
            http,
            config,
            submissions: SubmissionGuard::default(),
        }
    }

    /// API client acting on behalf of the request's admin session.
    pub fn api_for(&self, session: &Session) -> ApiClient {
        ApiClient::new(
            self.http.clone(),
            self.config.api_base_url.clone(),
            session.0.clone(),
        )
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SubmissionGuard {
    fn from_ref(state: &AppState) -> Self {
        state.submissions.clone()
    }
}

/// Result ids whose summary submission is currently in flight.
#[derive(Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<Mutex<HashSet<i64>>>,
}

impl SubmissionGuard {
    /// Claims `result_id`, or returns `None` if a submission for it is already running.
    /// The claim is released when the ticket is dropped.
    pub fn try_acquire(&self, result_id: i64) -> Option<SubmissionTicket> {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(result_id);
        inserted.then(|| SubmissionTicket {
            guard: self.clone(),
            result_id,
        })
    }
}

pub struct SubmissionTicket {
    guard: SubmissionGuard,
    result_id: i64,
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.result_id);
    }
}
