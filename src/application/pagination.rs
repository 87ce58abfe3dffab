//! Page-number pagination helpers.
//!
//! Requests are forgiving: a page parameter that is not an integer resolves to
//! the first page, and numbers outside `1..=num_pages` clamp to the nearest
//! valid page. An empty listing still has exactly one (empty) page.

use std::num::NonZeroU32;

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A requested page before it has been checked against the listing size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: NonZeroU32,
}

impl PageRequest {
    pub fn new(number: i64, size: NonZeroU32) -> Self {
        Self { number, size }
    }

    pub fn first(size: NonZeroU32) -> Self {
        Self::new(1, size)
    }

    /// Interpret a raw `page` query parameter.
    pub fn parse(raw: Option<&str>, size: NonZeroU32) -> Self {
        let number = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(1);
        Self::new(number, size)
    }
}

/// The concrete slice a request resolves to once the total is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

pub fn resolve_window(total: u64, request: PageRequest) -> PageWindow {
    let size = u64::from(request.size.get());
    let num_pages = total.div_ceil(size).max(1);
    let number = if request.number < 1 {
        1
    } else {
        (request.number as u64).min(num_pages)
    };

    PageWindow {
        number,
        num_pages,
        offset: (number - 1) * size,
        limit: size,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, total: u64, page_size: NonZeroU32) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total,
            page_size: page_size.get(),
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }
}

/// Paginate an in-memory sequence.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let window = resolve_window(total, request);
    let slice = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    Page::new(slice, window, total, request.size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero size")
    }

    #[test]
    fn thirteen_items_split_into_ten_and_three() {
        let items: Vec<u32> = (1..=13).collect();

        let first = paginate(items.clone(), PageRequest::new(1, size(10)));
        assert_eq!(first.items.len(), 10);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.num_pages, 2);

        let second = paginate(items, PageRequest::new(2, size(10)));
        assert_eq!(second.items, vec![11, 12, 13]);
        assert!(!second.has_next);
        assert!(second.has_previous);
    }

    #[test]
    fn out_of_range_numbers_clamp_to_nearest_page() {
        let items: Vec<u32> = (1..=13).collect();

        let beyond = paginate(items.clone(), PageRequest::new(9, size(10)));
        assert_eq!(beyond.number, 2);
        assert_eq!(beyond.items.len(), 3);

        let below = paginate(items, PageRequest::new(-4, size(10)));
        assert_eq!(below.number, 1);
        assert_eq!(below.items.len(), 10);
    }

    #[test]
    fn non_numeric_page_parameter_means_first_page() {
        assert_eq!(PageRequest::parse(Some("last"), size(10)).number, 1);
        assert_eq!(PageRequest::parse(None, size(10)).number, 1);
        assert_eq!(PageRequest::parse(Some(" 3 "), size(10)).number, 3);
    }

    #[test]
    fn empty_sequence_has_single_empty_page() {
        let page = paginate(Vec::<u32>::new(), PageRequest::new(4, size(10)));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn window_offsets_follow_page_number() {
        let window = resolve_window(25, PageRequest::new(3, size(10)));
        assert_eq!(window.offset, 20);
        assert_eq!(window.limit, 10);
        assert_eq!(window.num_pages, 3);
    }
}
