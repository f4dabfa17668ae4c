// src/view/summary.rs

use serde::Serialize;

use crate::models::report::ReportRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SummaryState {
    Closed,
    Open {
        result_id: i64,
        error: Option<String>,
    },
    Submitting {
        result_id: i64,
    },
    /// Saved; shown briefly before the modal closes itself.
    Saved {
        result_id: i64,
    },
}

/// Why a submission was refused before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRefusal {
    NotOpen,
    AlreadySubmitting,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryModal {
    state: SummaryState,
    saves: u64,
}

impl Default for SummaryModal {
    fn default() -> Self {
        Self {
            state: SummaryState::Closed,
            saves: 0,
        }
    }
}

impl SummaryModal {
    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SummaryState::Submitting { .. })
    }

    /// Opens the modal for `result_id`. Ignored while a submission is in flight.
    pub fn open(&mut self, result_id: i64) {
        if !self.is_submitting() {
            self.state = SummaryState::Open {
                result_id,
                error: None,
            };
        }
    }

    /// Closes the modal. Ignored while a submission is in flight.
    pub fn close(&mut self) {
        if !self.is_submitting() {
            self.state = SummaryState::Closed;
        }
    }

    /// Moves `Open → Submitting` if `report` passes the local checks.
    ///
    /// A failed check keeps the modal open with the message inline.
    pub fn begin_submit(&mut self, report: &ReportRequest) -> Result<i64, SubmitRefusal> {
        let result_id = match &self.state {
            SummaryState::Open { result_id, .. } => *result_id,
            SummaryState::Submitting { .. } => return Err(SubmitRefusal::AlreadySubmitting),
            SummaryState::Closed | SummaryState::Saved { .. } => {
                return Err(SubmitRefusal::NotOpen);
            }
        };

        if let Err(field_error) = report.sanitized().check() {
            self.state = SummaryState::Open {
                result_id,
                error: Some(field_error.message.clone()),
            };
            return Err(SubmitRefusal::Invalid(field_error.message));
        }

        self.state = SummaryState::Submitting { result_id };
        Ok(result_id)
    }

    /// Records the outcome of the submission started by `begin_submit`.
    ///
    /// Returns the save generation on success, to be handed to `dismiss_saved`.
    pub fn finish(&mut self, outcome: Result<(), String>) -> Option<u64> {
        let SummaryState::Submitting { result_id } = self.state else {
            return None;
        };
        match outcome {
            Ok(()) => {
                self.saves += 1;
                self.state = SummaryState::Saved { result_id };
                Some(self.saves)
            }
            Err(message) => {
                self.state = SummaryState::Open {
                    result_id,
                    error: Some(message),
                };
                None
            }
        }
    }

    /// Auto-dismiss step: closes the modal only if it still shows the saved
    /// state of that same save.
    pub fn dismiss_saved(&mut self, generation: u64) {
        if matches!(self.state, SummaryState::Saved { .. }) && self.saves == generation {
            self.state = SummaryState::Closed;
        }
    }

    /// Drops the modal unconditionally, e.g. when the session ends.
    pub fn reset(&mut self) {
        self.state = SummaryState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(summary: &str) -> ReportRequest {
        ReportRequest {
            report_summary: summary.into(),
            recommendations: None,
        }
    }

    #[test]
    fn happy_path_goes_through_saved_to_closed() {
        let mut modal = SummaryModal::default();
        modal.open(9);
        assert_eq!(modal.begin_submit(&report("Solid")), Ok(9));
        assert!(modal.is_submitting());

        let saved = modal.finish(Ok(())).unwrap();
        assert_eq!(modal.state(), &SummaryState::Saved { result_id: 9 });

        modal.dismiss_saved(saved);
        assert_eq!(modal.state(), &SummaryState::Closed);
    }

    #[test]
    fn empty_summary_stays_open_with_inline_error() {
        let mut modal = SummaryModal::default();
        modal.open(9);
        let refusal = modal.begin_submit(&report("  ")).unwrap_err();
        assert!(matches!(refusal, SubmitRefusal::Invalid(_)));
        assert!(matches!(
            modal.state(),
            SummaryState::Open { result_id: 9, error: Some(_) }
        ));
    }

    #[test]
    fn double_submit_is_refused() {
        let mut modal = SummaryModal::default();
        modal.open(9);
        modal.begin_submit(&report("first")).unwrap();
        assert_eq!(
            modal.begin_submit(&report("second")),
            Err(SubmitRefusal::AlreadySubmitting)
        );

        modal.close();
        assert!(modal.is_submitting());
    }

    #[test]
    fn failure_reopens_with_error() {
        let mut modal = SummaryModal::default();
        modal.open(4);
        modal.begin_submit(&report("text")).unwrap();
        assert_eq!(modal.finish(Err("Server said no".into())), None);
        assert_eq!(
            modal.state(),
            &SummaryState::Open {
                result_id: 4,
                error: Some("Server said no".into())
            }
        );
    }

    #[test]
    fn submit_on_closed_modal_is_refused() {
        let mut modal = SummaryModal::default();
        assert_eq!(modal.begin_submit(&report("x")), Err(SubmitRefusal::NotOpen));
    }

    #[test]
    fn stale_dismiss_does_not_close_a_reopened_modal() {
        let mut modal = SummaryModal::default();
        modal.open(1);
        modal.begin_submit(&report("x")).unwrap();
        let saved = modal.finish(Ok(())).unwrap();
        modal.open(2);
        modal.dismiss_saved(saved);
        assert!(matches!(modal.state(), SummaryState::Open { result_id: 2, .. }));
    }

    #[test]
    fn earlier_save_does_not_dismiss_a_later_save_of_the_same_result() {
        let mut modal = SummaryModal::default();
        modal.open(1);
        modal.begin_submit(&report("first")).unwrap();
        let first = modal.finish(Ok(())).unwrap();

        modal.close();
        modal.open(1);
        modal.begin_submit(&report("second")).unwrap();
        let second = modal.finish(Ok(())).unwrap();

        modal.dismiss_saved(first);
        assert_eq!(modal.state(), &SummaryState::Saved { result_id: 1 });
        modal.dismiss_saved(second);
        assert_eq!(modal.state(), &SummaryState::Closed);
    }
}
