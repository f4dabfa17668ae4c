// src/models/result.rs

use serde::Serialize;
use serde_json::Value;

/// Placeholder shown for any text field the API did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Badge colour bucket for a score category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryBucket {
    High,
    Medium,
    LowOrOther,
}

impl CategoryBucket {
    /// Buckets a category label case-insensitively. Anything that is not
    /// "high" or "medium" (including a missing label) lands in `LowOrOther`.
    pub fn from_category(category: Option<&str>) -> Self {
        match category.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
            Some("high") => CategoryBucket::High,
            Some("medium") => CategoryBucket::Medium,
            _ => CategoryBucket::LowOrOther,
        }
    }
}

/// Score line for one cluster or construct.
///
/// Numeric fields stay `None` when the API omitted them, zero is a real score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub name: String,
    pub total: Option<f64>,
    pub average: Option<f64>,
    pub percentage: Option<f64>,
    pub count: Option<u64>,
    pub category: Option<String>,
    pub bucket: CategoryBucket,
}

/// One comprehensive test result flattened for the results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResultRecord {
    pub result_id: Option<i64>,
    pub user_id: Option<i64>,

    pub name: String,
    pub email: String,
    pub role: String,
    pub contact: String,
    pub gender: String,
    pub age: String,
    pub city: String,
    pub state: String,
    pub profession: String,

    pub test_title: String,
    pub test_description: String,

    pub total_score: Option<f64>,
    pub average_score: Option<f64>,
    pub average_percentage: Option<f64>,
    pub overall_category: String,
    pub overall_bucket: CategoryBucket,

    pub clusters: Vec<ScoreEntry>,
    pub constructs: Vec<ScoreEntry>,

    pub sdb_percentage: Option<f64>,

    /// The item exactly as the API returned it.
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_is_case_insensitive() {
        assert_eq!(CategoryBucket::from_category(Some("HIGH")), CategoryBucket::High);
        assert_eq!(CategoryBucket::from_category(Some(" Medium ")), CategoryBucket::Medium);
        assert_eq!(CategoryBucket::from_category(Some("Low")), CategoryBucket::LowOrOther);
        assert_eq!(CategoryBucket::from_category(Some("exceptional")), CategoryBucket::LowOrOther);
        assert_eq!(CategoryBucket::from_category(None), CategoryBucket::LowOrOther);
    }
}
