// src/models/resource.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Admin-managed collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Schools,
    Organizations,
    Clusters,
    Constructs,
    Questions,
    Options,
    Tests,
    Users,
}

impl Resource {
    /// Collection path on the API, relative to its base URL.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Schools => "schools",
            Resource::Organizations => "organizations",
            Resource::Clusters => "clusters",
            Resource::Constructs => "constructs",
            Resource::Questions => "questions",
            Resource::Options => "options",
            Resource::Tests => "tests",
            Resource::Users => "users",
        }
    }

    pub fn item_path(self, id: i64) -> String {
        format!("{}/{}", self.path(), id)
    }
}

/// DTO for deleting several rows of one collection at once.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, max = 500, message = "Select between 1 and 500 items."))]
    pub ids: Vec<i64>,
}

/// Outcome of a bulk delete once every request settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkDeleteOutcome {
    pub deleted: usize,
    pub failed: usize,
}
