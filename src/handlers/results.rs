// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::results::{ResultQuery, ResultsBackend, fetch_records},
    config::RESULTS_PAGE_SIZE,
    error::{AppError, FieldError},
    models::report::ReportRequest,
    results::{
        dates::validate_date_range,
        export::{ExportFile, XLSX_CONTENT_TYPE},
        query::{filter_records, paginate},
    },
    state::AppState,
    utils::session::Session,
};

/// Query string of the results list.
///
/// Everything arrives as text so a blank form field means "unset" instead of
/// failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ResultListParams {
    pub search: Option<String>,
    pub page: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub test_id: Option<String>,
}

fn parse_optional<T: std::str::FromStr>(
    field: &'static str,
    raw: Option<&str>,
    message: &str,
) -> Result<Option<T>, FieldError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| FieldError::new(field, message)),
    }
}

/// Lists comprehensive results, normalized, searched and paginated.
///
/// Dates and test id go to the API; search and paging are applied here.
/// Invalid dates are rejected before the API is called.
pub async fn list_results(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<ResultListParams>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let range = validate_date_range(params.from_date.as_deref(), params.to_date.as_deref(), today)?;
    let test_id = parse_optional::<i64>("test_id", params.test_id.as_deref(), "Select a valid test.")?;
    let page = parse_optional::<usize>("page", params.page.as_deref(), "Page must be a number.")?
        .unwrap_or(1);

    let api = state.api_for(&session);
    let records = fetch_records(&api, &ResultQuery { range, test_id }).await?;

    let filtered = filter_records(&records, params.search.as_deref().unwrap_or_default());
    Ok(Json(paginate(&filtered, page, RESULTS_PAGE_SIZE)))
}

/// Streams the spreadsheet export as a timestamped download.
pub async fn export_results(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = state.api_for(&session).export_reports().await?;
    let export = ExportFile::new(bytes, Utc::now());
    tracing::info!("Serving export {} ({} bytes)", export.filename, export.bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, export.content_disposition()),
        ],
        export.bytes,
    ))
}

/// Options for the test filter dropdown.
pub async fn list_tests(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, AppError> {
    let tests = state.api_for(&session).list_tests().await?;
    Ok(Json(tests))
}

/// Saves the summary and recommendations for one result.
///
/// The summary is sanitized first; one that is blank afterwards is rejected
/// locally. A second submission for the same result while the first is still
/// running gets 409.
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    Json(payload): Json<ReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.sanitized();
    payload.check()?;

    let _ticket = state.submissions.try_acquire(id).ok_or_else(|| {
        AppError::Conflict("A summary for this result is already being submitted.".to_string())
    })?;

    state.api_for(&session).submit_report(id, &payload).await?;

    Ok(Json(json!({ "message": "Report summary saved." })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_numbers_treat_blank_as_unset() {
        assert_eq!(parse_optional::<i64>("test_id", Some("  "), "bad"), Ok(None));
        assert_eq!(parse_optional::<i64>("test_id", Some("12"), "bad"), Ok(Some(12)));
        assert_eq!(
            parse_optional::<i64>("test_id", Some("twelve"), "bad"),
            Err(FieldError::new("test_id", "bad"))
        );
    }
}
