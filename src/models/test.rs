// src/models/test.rs

use serde::{Deserialize, Serialize};

/// Entry of the test filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOption {
    pub id: i64,
    pub title: String,
}
