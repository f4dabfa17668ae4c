// src/api/results.rs

use async_trait::async_trait;
use serde_json::Value;

use crate::api::client::ApiClient;
use crate::error::AppError;
use crate::models::report::ReportRequest;
use crate::models::result::TestResultRecord;
use crate::models::test::TestOption;
use crate::results::dates::DateRange;
use crate::results::export::XLSX_CONTENT_TYPE;
use crate::results::normalize::{list_items, normalize_batch};
use crate::results::probe::first_at_paths;

/// Server-side filters for a results fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultQuery {
    pub range: DateRange,
    pub test_id: Option<i64>,
}

impl ResultQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.range.query_pairs();
        if let Some(test_id) = self.test_id {
            pairs.push(("test_id", test_id.to_string()));
        }
        pairs
    }
}

/// The calls the results screen makes against the API.
#[async_trait]
pub trait ResultsBackend: Send + Sync {
    /// Raw `/test-results-comprehensive/all` response.
    async fn fetch_results(&self, query: &ResultQuery) -> Result<Value, AppError>;

    /// Spreadsheet bytes of every report.
    async fn export_reports(&self) -> Result<Vec<u8>, AppError>;

    async fn submit_report(&self, result_id: i64, report: &ReportRequest) -> Result<(), AppError>;

    async fn list_tests(&self) -> Result<Vec<TestOption>, AppError>;
}

#[async_trait]
impl ResultsBackend for ApiClient {
    async fn fetch_results(&self, query: &ResultQuery) -> Result<Value, AppError> {
        self.get_json("test-results-comprehensive/all", &query.query_pairs())
            .await
    }

    async fn export_reports(&self) -> Result<Vec<u8>, AppError> {
        self.get_bytes("test-results-comprehensive/export", XLSX_CONTENT_TYPE)
            .await
    }

    async fn submit_report(&self, result_id: i64, report: &ReportRequest) -> Result<(), AppError> {
        let cleaned = report.sanitized();
        cleaned.check()?;
        self.put_json(&format!("test-results/{}/report", result_id), &cleaned)
            .await?;
        tracing::info!("Submitted report summary for result {}", result_id);
        Ok(())
    }

    async fn list_tests(&self) -> Result<Vec<TestOption>, AppError> {
        let payload = self.get_json("tests", &[]).await?;
        Ok(parse_test_options(&payload))
    }
}

/// Fetches and normalizes results for `query`.
pub async fn fetch_records<B: ResultsBackend + ?Sized>(
    backend: &B,
    query: &ResultQuery,
) -> Result<Vec<TestResultRecord>, AppError> {
    let payload = backend.fetch_results(query).await?;
    Ok(normalize_batch(&payload))
}

/// Reads `{id, title}` pairs out of a `/tests` response, skipping rows without an id.
pub fn parse_test_options(payload: &Value) -> Vec<TestOption> {
    let Some(items) = list_items(payload) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let id = match item.get("id")? {
                Value::Number(n) => n.as_i64()?,
                Value::String(s) => s.trim().parse().ok()?,
                _ => return None,
            };
            let title = first_at_paths(item, &[&["title"], &["name"]])
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Test #{}", id));
            Some(TestOption { id, title })
        })
        .collect()
}
