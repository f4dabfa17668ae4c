// src/view/mod.rs

pub mod controller;
pub mod debounce;
pub mod summary;

pub use controller::{ResultsController, ResultsView, ViewNotice};
pub use debounce::Debouncer;
pub use summary::{SummaryModal, SummaryState};
