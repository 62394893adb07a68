use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Position of one page within a filtered result set. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based index of the first item shown; 0 when there is nothing to show.
    pub showing_from: usize,
    pub showing_to: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

pub fn page_count(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Clamps a requested page to `[1, max(page_count, 1)]`.
pub fn clamp_page(page: usize, total_items: usize, page_size: usize) -> usize {
    page.clamp(1, page_count(total_items, page_size).max(1))
}

/// Slices `items` to the requested page; out-of-range pages are clamped, never wrapped.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> (&[T], PageInfo) {
    let total_items = items.len();
    let total_pages = page_count(total_items, page_size);
    let page = clamp_page(page, total_items, page_size);

    let start = ((page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);
    let slice = &items[start..end];

    let info = PageInfo {
        page,
        page_size,
        total_items,
        total_pages,
        showing_from: if slice.is_empty() { 0 } else { start + 1 },
        showing_to: end,
        has_previous: page > 1,
        has_next: page < total_pages,
    };
    (slice, info)
}
