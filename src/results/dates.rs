// src/results/dates.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated `from_date`/`to_date` pair; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Query parameters for the results endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = self.from {
            pairs.push(("from_date", from.format(DATE_FORMAT).to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("to_date", to.format(DATE_FORMAT).to_string()));
        }
        pairs
    }
}

/// Validates raw `YYYY-MM-DD` inputs against `today`.
///
/// Blank inputs mean "no bound". Neither date may be in the future and the
/// start must not come after the end.
pub fn validate_date_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, FieldError> {
    let from = parse_date("from_date", from)?;
    let to = parse_date("to_date", to)?;

    if from.is_some_and(|d| d > today) {
        return Err(FieldError::new("from_date", "Start date cannot be in the future."));
    }
    if to.is_some_and(|d| d > today) {
        return Err(FieldError::new("to_date", "End date cannot be in the future."));
    }
    if matches!((from, to), (Some(start), Some(end)) if start > end) {
        return Err(FieldError::new(
            "to_date",
            "End date must be on or after the start date.",
        ));
    }

    Ok(DateRange { from, to })
}

fn parse_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, FieldError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| FieldError::new(field, "Use the YYYY-MM-DD date format.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = validate_date_range(Some("2024-02-01"), Some("2024-01-01"), today()).unwrap_err();
        assert_eq!(err.field, "to_date");
    }

    #[test]
    fn future_dates_are_rejected() {
        let err = validate_date_range(Some("2099-01-01"), None, today()).unwrap_err();
        assert_eq!(err.field, "from_date");

        let err = validate_date_range(None, Some("2099-01-01"), today()).unwrap_err();
        assert_eq!(err.field, "to_date");
    }

    #[test]
    fn ordinary_range_is_accepted() {
        let range = validate_date_range(Some("2024-01-01"), Some("2024-01-31"), today()).unwrap();
        assert_eq!(
            range.query_pairs(),
            vec![
                ("from_date", "2024-01-01".to_string()),
                ("to_date", "2024-01-31".to_string())
            ]
        );
    }

    #[test]
    fn same_day_and_today_are_accepted() {
        assert!(validate_date_range(Some("2024-06-15"), Some("2024-06-15"), today()).is_ok());
    }

    #[test]
    fn blank_inputs_are_open_bounds() {
        let range = validate_date_range(Some(""), Some("  "), today()).unwrap();
        assert_eq!(range, DateRange::default());
        assert!(range.query_pairs().is_empty());
    }

    #[test]
    fn malformed_dates_name_their_field() {
        let err = validate_date_range(Some("01/02/2024"), None, today()).unwrap_err();
        assert_eq!(err.field, "from_date");
    }
}
