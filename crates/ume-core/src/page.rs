//! Fixed-size paging over an ordered view.
//!
//! Paging never fails: out-of-range pages are empty and the current page
//! index is clamped whenever the underlying list shrinks.

use crate::error::ViewError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Page size used by list screens unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => unreachable!(),
};

/// Number of pages needed for `len` items; at least one, even when empty.
#[must_use]
pub const fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    let pages = len.div_ceil(page_size.get());
    if pages == 0 { 1 } else { pages }
}

/// Slice out page `page` (zero-based). Pages past the end are empty.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: NonZeroUsize) -> &[T] {
    let size = page_size.get();
    let start = page.saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Position summary for a "showing X-Y of N" footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Zero-based current page.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based index of the first row on the page, 0 when the page is empty.
    pub first_row: usize,
    /// 1-based index of the last row on the page, 0 when the page is empty.
    pub last_row: usize,
}

/// Current page and page size of one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    page: usize,
    page_size: NonZeroUsize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// # Errors
    ///
    /// Returns [`ViewError::ZeroPageSize`] when `page_size` is zero.
    pub fn new(page_size: usize) -> Result<Self, ViewError> {
        NonZeroUsize::new(page_size)
            .map(Self::with_page_size)
            .ok_or(ViewError::ZeroPageSize)
    }

    #[must_use]
    pub const fn with_page_size(page_size: NonZeroUsize) -> Self {
        Self { page: 0, page_size }
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    #[must_use]
    pub const fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 0
    }

    #[must_use]
    pub const fn has_next(&self, len: usize) -> bool {
        self.page.saturating_add(1) < self.total_pages(len)
    }

    /// Advance one page. No-op on the last page; returns whether it moved.
    pub const fn next_page(&mut self, len: usize) -> bool {
        if self.has_next(len) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. No-op on the first page; returns whether it moved.
    pub const fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub const fn first_page(&mut self) {
        self.page = 0;
    }

    pub const fn last_page(&mut self, len: usize) {
        self.page = self.total_pages(len) - 1;
    }

    /// Change the page size, keeping the first visible row on screen.
    pub const fn set_page_size(&mut self, page_size: NonZeroUsize, len: usize) {
        let first_row = self.page.saturating_mul(self.page_size.get());
        self.page_size = page_size;
        self.page = first_row / page_size.get();
        self.clamp(len);
    }

    /// Pull the page index back into range after the list changed size.
    /// Returns true if the index moved.
    pub const fn clamp(&mut self, len: usize) -> bool {
        let last = self.total_pages(len) - 1;
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }

    /// The current page of `items`.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page, self.page_size)
    }

    #[must_use]
    pub fn page_info(&self, len: usize) -> PageInfo {
        self.page_info_for(self.page, len)
    }

    /// Footer for an arbitrary page, which may lie past the end of the list.
    /// Such a page shows no rows: `first_row` and `last_row` are 0.
    #[must_use]
    pub fn page_info_for(&self, page: usize, len: usize) -> PageInfo {
        let start = page.saturating_mul(self.page_size.get());
        let shown = len.saturating_sub(start).min(self.page_size.get());
        let first_row = if shown == 0 { 0 } else { start + 1 };
        PageInfo {
            page,
            total_pages: self.total_pages(len),
            total_items: len,
            first_row,
            last_row: if shown == 0 { 0 } else { first_row + shown - 1 },
        }
    }
}
