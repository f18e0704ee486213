//! Clamping helpers for page/offset pagination.
//!
//! Malformed pagination input is normalized, never rejected.

pub fn clamp_page(requested: Option<i64>) -> i64 {
    requested.unwrap_or(1).max(1)
}

pub fn clamp_page_size(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max)
}

pub fn offset(page: i64, page_size: i64) -> i64 {
    (page - 1).saturating_mul(page_size)
}
