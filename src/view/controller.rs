// src/view/controller.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::api::results::{ResultQuery, ResultsBackend, fetch_records};
use crate::config::{
    LOGIN_PATH, REFETCH_DEBOUNCE, RESULTS_PAGE_SIZE, SESSION_REDIRECT_DELAY, SUMMARY_DISMISS_DELAY,
};
use crate::error::{AppError, FieldError};
use crate::models::report::ReportRequest;
use crate::models::result::TestResultRecord;
use crate::models::test::TestOption;
use crate::results::dates::validate_date_range;
use crate::results::export::ExportFile;
use crate::results::query::{Page, clamp_page, filter_records, paginate};
use crate::view::debounce::Debouncer;
use crate::view::summary::{SubmitRefusal, SummaryModal};

/// Banner or inline message currently shown on the screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewNotice {
    #[default]
    None,
    FieldError(FieldError),
    Error {
        message: String,
    },
    /// Terminal: the front end shows the message and navigates to
    /// `redirect_to` after `redirect_after_ms`.
    SessionExpired {
        message: String,
        redirect_to: String,
        redirect_after_ms: u64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    pub records: Vec<TestResultRecord>,
    pub tests: Vec<TestOption>,
    pub search: String,
    /// 1-based page into the filtered records.
    pub page: usize,
    pub query: ResultQuery,
    pub loading: bool,
    pub notice: ViewNotice,
    pub summary: SummaryModal,
}

impl ResultsView {
    fn session_expired(&self) -> bool {
        matches!(self.notice, ViewNotice::SessionExpired { .. })
    }

    fn filtered(&self) -> Vec<TestResultRecord> {
        filter_records(&self.records, &self.search)
    }
}

struct Inner<B> {
    backend: Arc<B>,
    view: Mutex<ResultsView>,
    refetch: Debouncer<Option<i64>>,
}

pub struct ResultsController<B> {
    inner: Arc<Inner<B>>,
}

impl<B: ResultsBackend + 'static> ResultsController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                view: Mutex::new(ResultsView {
                    page: 1,
                    ..ResultsView::default()
                }),
                refetch: Debouncer::new(REFETCH_DEBOUNCE),
            }),
        }
    }

    pub async fn snapshot(&self) -> ResultsView {
        self.inner.view.lock().await.clone()
    }

    /// Loads the test dropdown.
    pub async fn load_tests(&self) -> Result<(), AppError> {
        self.inner.ensure_active().await?;
        match self.inner.backend.list_tests().await {
            Ok(tests) => {
                self.inner.view.lock().await.tests = tests;
                Ok(())
            }
            Err(e) => Err(self.inner.fail(e).await),
        }
    }

    /// Refetches results for the current filters.
    pub async fn refresh(&self) -> Result<(), AppError> {
        self.inner.refresh().await
    }

    /// Updates the search term; any change sends the user back to page 1.
    pub async fn set_search(&self, term: &str) {
        let mut view = self.inner.view.lock().await;
        if view.search != term {
            view.search = term.to_string();
            view.page = 1;
        }
    }

    pub async fn set_page(&self, requested: usize) {
        let mut view = self.inner.view.lock().await;
        let total = view.filtered().len();
        view.page = clamp_page(requested, total, RESULTS_PAGE_SIZE);
    }

    /// Rows for the current search term and page.
    pub async fn current_page(&self) -> Page<TestResultRecord> {
        let view = self.inner.view.lock().await;
        paginate(&view.filtered(), view.page, RESULTS_PAGE_SIZE)
    }

    /// Validates and applies a date range, then refetches.
    ///
    /// An invalid range is shown next to its field and nothing is fetched.
    pub async fn set_date_range(&self, from: Option<&str>, to: Option<&str>) -> Result<(), AppError> {
        self.inner.ensure_active().await?;
        let today = Local::now().date_naive();
        let range = match validate_date_range(from, to, today) {
            Ok(range) => range,
            Err(field_error) => {
                self.inner.view.lock().await.notice = ViewNotice::FieldError(field_error.clone());
                return Err(AppError::Validation(field_error));
            }
        };

        {
            let mut view = self.inner.view.lock().await;
            view.query.range = range;
            view.page = 1;
            view.notice = ViewNotice::None;
        }
        self.inner.refresh().await
    }

    /// Selects a test filter. The refetch waits for the selection to settle.
    pub async fn select_test(&self, test_id: Option<i64>) {
        {
            let mut view = self.inner.view.lock().await;
            if view.session_expired() {
                return;
            }
            view.query.test_id = test_id;
            view.page = 1;
        }

        let inner = self.inner.clone();
        self.inner.refetch.schedule(test_id, async move {
            // Failures are already reflected in the view's notice.
            let _ = inner.refresh().await;
        });
    }

    /// Test id whose refetch is still waiting out the debounce delay.
    pub fn pending_refetch(&self) -> Option<Option<i64>> {
        self.inner.refetch.pending_key()
    }

    /// Downloads the spreadsheet export and saves it into `dir`.
    pub async fn export_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AppError> {
        self.inner.ensure_active().await?;
        let bytes = match self.inner.backend.export_reports().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.inner.fail(e).await),
        };
        let export = ExportFile::new(bytes, Utc::now());
        match export.save_into(dir) {
            Ok(path) => Ok(path),
            Err(e) => Err(self.inner.fail(e).await),
        }
    }

    pub async fn open_summary(&self, result_id: i64) {
        let mut view = self.inner.view.lock().await;
        if !view.session_expired() {
            view.summary.open(result_id);
        }
    }

    pub async fn close_summary(&self) {
        self.inner.view.lock().await.summary.close();
    }

    /// Submits the open modal's summary.
    ///
    /// Refused locally when the modal is not open, already submitting, or the
    /// summary is blank. On success the modal closes itself after a short delay.
    pub async fn submit_summary(&self, report: ReportRequest) -> Result<(), AppError> {
        let result_id = {
            let mut view = self.inner.view.lock().await;
            if view.session_expired() {
                return Err(AppError::SessionExpired);
            }
            match view.summary.begin_submit(&report) {
                Ok(result_id) => result_id,
                Err(SubmitRefusal::AlreadySubmitting) => {
                    return Err(AppError::Conflict(
                        "A summary is already being submitted.".to_string(),
                    ));
                }
                Err(SubmitRefusal::NotOpen) => {
                    return Err(AppError::BadRequest("No result selected.".to_string()));
                }
                Err(SubmitRefusal::Invalid(message)) => {
                    return Err(AppError::Validation(FieldError::new(
                        "report_summary",
                        message,
                    )));
                }
            }
        };

        match self.inner.backend.submit_report(result_id, &report).await {
            Ok(()) => {
                let saved = self.inner.view.lock().await.summary.finish(Ok(()));
                if let Some(generation) = saved {
                    let inner = self.inner.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(SUMMARY_DISMISS_DELAY).await;
                        inner.view.lock().await.summary.dismiss_saved(generation);
                    });
                }
                Ok(())
            }
            Err(e) => {
                self.inner
                    .view
                    .lock()
                    .await
                    .summary
                    .finish(Err(e.user_message()));
                Err(self.inner.fail(e).await)
            }
        }
    }
}

impl<B: ResultsBackend + 'static> Inner<B> {
    async fn ensure_active(&self) -> Result<(), AppError> {
        if self.view.lock().await.session_expired() {
            return Err(AppError::SessionExpired);
        }
        Ok(())
    }

    async fn refresh(&self) -> Result<(), AppError> {
        let query = {
            let mut view = self.view.lock().await;
            if view.session_expired() {
                return Err(AppError::SessionExpired);
            }
            view.loading = true;
            view.query
        };

        match fetch_records(self.backend.as_ref(), &query).await {
            Ok(records) => {
                let mut view = self.view.lock().await;
                if view.session_expired() {
                    return Err(AppError::SessionExpired);
                }
                tracing::debug!("Loaded {} results for {:?}", records.len(), query);
                view.records = records;
                view.loading = false;
                if !matches!(view.notice, ViewNotice::FieldError(_)) {
                    view.notice = ViewNotice::None;
                }
                let total = view.filtered().len();
                view.page = clamp_page(view.page, total, RESULTS_PAGE_SIZE);
                Ok(())
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Reflects `err` in the view and hands it back.
    ///
    /// An expired session wipes the screen: pending refetches are dropped, the
    /// modal is closed and the expiry notice replaces every other message.
    async fn fail(&self, err: AppError) -> AppError {
        let mut view = self.view.lock().await;
        view.loading = false;
        match &err {
            AppError::SessionExpired => {
                self.refetch.cancel();
                view.records.clear();
                view.summary.reset();
                view.notice = ViewNotice::SessionExpired {
                    message: err.user_message(),
                    redirect_to: LOGIN_PATH.to_string(),
                    redirect_after_ms: SESSION_REDIRECT_DELAY.as_millis() as u64,
                };
            }
            AppError::Validation(field_error) => {
                view.notice = ViewNotice::FieldError(field_error.clone());
            }
            other => {
                tracing::warn!("Results screen action failed: {}", other);
                if !view.session_expired() {
                    view.notice = ViewNotice::Error {
                        message: other.user_message(),
                    };
                }
            }
        }
        err
    }
}
