// src/results/query.rs

use serde::Serialize;

use crate::models::result::TestResultRecord;

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually served, after clamping.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Keeps the records matching `term` in any searchable column.
///
/// Matching is a case-insensitive substring test over name, email, contact,
/// test title, overall category and every cluster or construct name. A blank
/// term keeps everything.
pub fn filter_records(records: &[TestResultRecord], term: &str) -> Vec<TestResultRecord> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| matches(record, &needle))
        .cloned()
        .collect()
}

fn matches(record: &TestResultRecord, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    [
        &record.name,
        &record.email,
        &record.contact,
        &record.test_title,
        &record.overall_category,
    ]
    .into_iter()
    .any(|field| contains(field))
        || record.clusters.iter().any(|c| contains(&c.name))
        || record.constructs.iter().any(|c| contains(&c.name))
}

/// Number of pages needed for `total_items`; an empty list still has one page.
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_items.div_ceil(page_size).max(1)
}

/// Clamps a requested 1-based page into the valid range.
pub fn clamp_page(requested: usize, total_items: usize, page_size: usize) -> usize {
    requested.clamp(1, page_count(total_items, page_size))
}

/// Cuts page `requested` (1-based, clamped) out of `items`.
pub fn paginate<T: Clone>(items: &[T], requested: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let page = clamp_page(requested, total_items, page_size);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        page_size,
        total_items,
        total_pages: page_count(total_items, page_size),
    }
}
