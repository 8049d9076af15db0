//! Page slicing shared by every list screen.

use serde::Serialize;
use std::num::NonZeroUsize;

/// Position of one page within a list. Derived on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: usize,
    /// Zero only when the list is empty
    pub total_pages: usize,
    pub total_items: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,
}

/// Slice `items` to the requested 1-based page.
///
/// Requests below 1 land on page 1; requests past the end land on the last
/// page, or on page 1 with an empty slice when there are no items.
pub fn paginate<T>(items: &[T], requested_page: i64, page_size: NonZeroUsize) -> (&[T], PageInfo) {
    let page_size = page_size.get();
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);
    let last_page = total_pages.max(1);

    let current_page = if requested_page < 1 {
        1
    } else {
        usize::try_from(requested_page).map_or(last_page, |page| page.min(last_page))
    };

    let start = ((current_page - 1) * page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    let has_prev = current_page > 1;
    let has_next = current_page < total_pages;

    let info = PageInfo {
        current_page,
        total_pages,
        total_items,
        has_prev,
        has_next,
        prev_page: has_prev.then(|| current_page - 1),
        next_page: has_next.then(|| current_page + 1),
    };

    (&items[start..end], info)
}
