// src/api/mod.rs

pub mod client;
pub mod resources;
pub mod results;

pub use client::{ApiClient, build_http_client};
pub use results::{ResultQuery, ResultsBackend, fetch_records};
