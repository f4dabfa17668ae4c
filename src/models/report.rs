// src/models/report.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::FieldError;
use crate::utils::html::{clean_html, clean_optional};

/// Body of `PUT /test-results/{id}/report`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ReportRequest {
    #[validate(
        custom(function = validate_not_blank),
        length(max = 10000, message = "Summary must be at most 10000 characters.")
    )]
    pub report_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 10000, message = "Recommendations must be at most 10000 characters."))]
    pub recommendations: Option<String>,
}

impl ReportRequest {
    /// Copy with markup stripped from both fields, as it is sent upstream.
    pub fn sanitized(&self) -> Self {
        Self {
            report_summary: clean_html(&self.report_summary).trim().to_string(),
            recommendations: clean_optional(self.recommendations.as_deref()),
        }
    }

    /// Runs the local checks and reports the first failure against its field.
    pub fn check(&self) -> Result<(), FieldError> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let field_errors = errors.field_errors();
        for field in ["report_summary", "recommendations"] {
            if let Some(first) = field_errors.get(field).and_then(|list| list.first()) {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value.".to_string());
                return Err(FieldError::new(field, message));
            }
        }
        Err(FieldError::new("report_summary", errors.to_string()))
    }
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("summary_required")
            .with_message("Summary cannot be empty.".into()));
    }
    Ok(())
}
