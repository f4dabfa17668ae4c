// src/results/mod.rs

pub mod dates;
pub mod export;
pub mod normalize;
pub mod probe;
pub mod query;

pub use dates::{DateRange, validate_date_range};
pub use export::{ExportFile, export_filename};
pub use normalize::{normalize_batch, normalize_item};
pub use query::{Page, filter_records, paginate};
