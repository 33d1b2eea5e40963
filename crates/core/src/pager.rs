//! Client-side list pagination.
//!
//! Every list in the storefront and admin console is fetched in full and
//! sliced locally. [`paginate`] is the pure derivation; [`PageCursor`] is the
//! per-view page state that must be clamped whenever the list shrinks.

use std::num::NonZeroUsize;

use thiserror::Error;

/// Page size used by every admin console table.
pub const ADMIN_TABLE_PAGE_SIZE: usize = 5;

/// Page size of the storefront product grid.
pub const CATALOG_PAGE_SIZE: usize = 12;

/// Errors raised by the pager.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PagerError {
    /// Page size was zero.
    #[error("invalid argument: page size must be positive")]
    InvalidArgument,
}

/// The visible slice of a list plus the page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// Items on the requested page; empty when the page is out of range.
    pub visible: &'a [T],
    /// `ceil(len / page_size)`, never below 1.
    pub total_pages: usize,
}

/// Number of pages needed for `len` items, at least 1.
#[must_use]
pub const fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    let pages = len.div_ceil(page_size.get());
    if pages == 0 { 1 } else { pages }
}

/// Slice `items` into the 1-based `page` of size `page_size`.
///
/// Pages outside `1..=total_pages` (including 0) produce an empty slice.
///
/// # Errors
///
/// Returns [`PagerError::InvalidArgument`] if `page_size` is zero.
///
/// # Example
///
/// ```
/// use voltmart_core::paginate;
///
/// let items = [1, 2, 3, 4, 5, 6, 7];
/// let page = paginate(&items, 5, 2).unwrap();
/// assert_eq!(page.visible, &[6, 7]);
/// assert_eq!(page.total_pages, 2);
/// ```
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Result<Page<'_, T>, PagerError> {
    let size = NonZeroUsize::new(page_size).ok_or(PagerError::InvalidArgument)?;
    let total_pages = total_pages(items.len(), size);

    let visible = page
        .checked_sub(1)
        .and_then(|index| index.checked_mul(size.get()))
        .filter(|start| *start < items.len())
        .and_then(|start| {
            let end = start.saturating_add(size.get()).min(items.len());
            items.get(start..end)
        })
        .unwrap_or(&[]);

    Ok(Page {
        visible,
        total_pages,
    })
}

const fn const_page_size(size: usize) -> NonZeroUsize {
    match NonZeroUsize::new(size) {
        Some(size) => size,
        None => NonZeroUsize::MIN,
    }
}

/// Current page of a paginated view.
///
/// Page size is a per-view constant; `page` is always kept within
/// `1..=total_pages` by [`PageCursor::clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    page_size: NonZeroUsize,
}

impl PageCursor {
    /// Start on page 1.
    ///
    /// # Errors
    ///
    /// Returns [`PagerError::InvalidArgument`] if `page_size` is zero.
    pub fn new(page_size: usize) -> Result<Self, PagerError> {
        let page_size = NonZeroUsize::new(page_size).ok_or(PagerError::InvalidArgument)?;
        Ok(Self { page: 1, page_size })
    }

    /// Cursor for admin tables.
    #[must_use]
    pub const fn admin_table() -> Self {
        Self {
            page: 1,
            page_size: const_page_size(ADMIN_TABLE_PAGE_SIZE),
        }
    }

    /// Cursor for the product grid.
    #[must_use]
    pub const fn catalog() -> Self {
        Self {
            page: 1,
            page_size: const_page_size(CATALOG_PAGE_SIZE),
        }
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Page count for a list of `len` items.
    #[must_use]
    pub const fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    /// Slice `items` at the current page.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> Page<'a, T> {
        // page_size is non-zero, so paginate cannot fail here.
        paginate(items, self.page_size.get(), self.page).unwrap_or(Page {
            visible: &[],
            total_pages: self.total_pages(items.len()),
        })
    }

    /// Whether a later page exists for `len` items.
    #[must_use]
    pub const fn has_next(&self, len: usize) -> bool {
        self.page < self.total_pages(len)
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Advance one page; returns whether the cursor moved.
    pub const fn next(&mut self, len: usize) -> bool {
        if self.has_next(len) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; returns whether the cursor moved.
    pub const fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped into range for `len` items.
    pub fn go_to(&mut self, page: usize, len: usize) {
        self.page = page;
        self.clamp(len);
    }

    /// Pull the page back into `1..=total_pages` after the list changed length.
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.clamp(1, self.total_pages(len));
    }
}
