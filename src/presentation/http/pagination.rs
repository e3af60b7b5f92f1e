//! Pagination Response Header
//!
//! Paginated endpoints return the page's items as the JSON body and the
//! paging metadata in a `Pagination` header, camelCase JSON, so clients can
//! keep their list bindings simple.

use serde::Serialize;

use crate::shared::error::AppError;
use crate::shared::pagination::PagedSlice;

/// Name of the pagination response header.
pub const PAGINATION_HEADER: &str = "pagination";

/// Paging metadata as it travels in the header.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: i32,
    pub items_per_page: i32,
    pub total_items: i64,
    pub total_pages: i32,
}

impl<T> From<&PagedSlice<T>> for PaginationMeta {
    fn from(page: &PagedSlice<T>) -> Self {
        Self {
            current_page: page.current_page,
            items_per_page: page.page_size,
            total_items: page.total_count,
            total_pages: page.total_pages,
        }
    }
}

/// Encode the header value for a page.
pub fn pagination_header_value<T>(page: &PagedSlice<T>) -> Result<String, AppError> {
    serde_json::to_string(&PaginationMeta::from(page))
        .map_err(|e| AppError::Internal(format!("failed to encode pagination header: {e}")))
}
