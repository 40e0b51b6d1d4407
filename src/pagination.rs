// 📄 Pagination - 1-based page windows over an ordered list

use serde::{Deserialize, Serialize};

/// Default page size used by the directory listing
pub const DEFAULT_PER_PAGE: usize = 10;

/// Slice one page out of `items`.
///
/// Pages are 1-based: page 1 holds items `[0, per_page)`. Pages past the end
/// are empty, and pages below 1 are treated as page 1.
pub fn paginate<T: Clone>(items: &[T], current_page: i64, per_page: usize) -> Vec<T> {
    let (start, end) = window(items.len(), current_page, per_page);
    items[start..end].to_vec()
}

/// `[start, end)` bounds of a page, clipped to `len`.
fn window(len: usize, current_page: i64, per_page: usize) -> (usize, usize) {
    let page = current_page.max(1) as u64;
    let start = (page - 1).saturating_mul(per_page as u64);
    let end = start.saturating_add(per_page as u64);

    let start = start.min(len as u64) as usize;
    let end = end.min(len as u64) as usize;
    (start, end)
}

// ============================================================================
// PAGE METADATA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: i64,
    pub per_page: usize,
    pub total_items: usize,
    /// Always at least 1, so an empty listing still has a "page 1 of 1"
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    pub fn new(total_items: usize, current_page: i64, per_page: usize) -> Self {
        let current_page = current_page.max(1);
        let total_pages = if per_page == 0 {
            1
        } else {
            total_items.div_ceil(per_page).max(1)
        };

        PageInfo {
            current_page,
            per_page,
            total_items,
            total_pages,
            has_next: (current_page as u64) < total_pages as u64,
            has_previous: current_page > 1,
        }
    }
}

/// One page of results plus the metadata needed to render a pager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T: Clone> Page<T> {
    pub fn from_slice(items: &[T], current_page: i64, per_page: usize) -> Self {
        Page {
            items: paginate(items, current_page, per_page),
            info: PageInfo::new(items.len(), current_page, per_page),
        }
    }
}

impl<T> Page<T> {
    /// Convert the items while keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
