//! Offset pagination primitives shared across the console state core.
//!
//! The console paginates filtered record sets by 1-based page number and a
//! fixed page size. This crate owns the arithmetic so every consumer agrees
//! on the same envelope: a [`PageRequest`] validated at construction, and a
//! [`Page`] carrying one slice of items together with the total match count
//! from before slicing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors returned when constructing a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers are 1-based; zero is never a valid page.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// A zero page size would make every page empty and the page count
    /// undefined.
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// A validated request for one page of a collection.
///
/// # Examples
/// ```
/// use paging::PageRequest;
///
/// let request = PageRequest::new(2, 10).expect("valid request");
/// assert_eq!(request.offset(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Construct a request, rejecting zero pages and zero page sizes.
    pub fn new(page: u32, page_size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if page_size == 0 {
            return Err(PageRequestError::ZeroPageSize);
        }
        Ok(Self { page, page_size })
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }

    /// The same request repositioned on another page.
    pub fn at_page(self, page: u32) -> Result<Self, PageRequestError> {
        Self::new(page, self.page_size)
    }
}

/// One page of items plus the total count of matches before slicing.
///
/// `total` always describes the whole filtered collection, never the slice,
/// so `page_count` stays stable while the caller walks pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    total: usize,
    page: u32,
    page_size: u32,
}

impl<T> Page<T> {
    /// An empty page positioned at the requested page number.
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: request.page(),
            page_size: request.page_size(),
        }
    }

    /// Items on this page, in collection order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Total matches before slicing.
    pub fn total(&self) -> usize {
        self.total
    }

    /// 1-based page number this slice was cut for.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page size the slice was cut with.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of pages needed for `total` items.
    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.page_size)
    }

    /// True when no items survived slicing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Number of pages needed to hold `total` items at `page_size` per page.
///
/// Zero items yield zero pages; callers that need a landing page clamp with
/// [`clamped_page`] instead.
pub fn page_count(total: usize, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(page_size as usize);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Largest valid page for `total` items, never below 1.
///
/// # Examples
/// ```
/// use paging::clamped_page;
///
/// assert_eq!(clamped_page(5, 21, 10), 3);
/// assert_eq!(clamped_page(3, 0, 10), 1);
/// ```
pub fn clamped_page(page: u32, total: usize, page_size: u32) -> u32 {
    page.min(page_count(total, page_size).max(1)).max(1)
}

/// Cut one page out of an already filtered collection.
///
/// Out-of-range requests yield an empty page that still reports the full
/// `total`, so callers can recover by clamping the page number.
pub fn paginate<T: Clone>(matching: &[T], request: PageRequest) -> Page<T> {
    let total = matching.len();
    let start = request.offset().min(total);
    let end = start
        .saturating_add(request.page_size() as usize)
        .min(total);
    Page {
        items: matching.get(start..end).unwrap_or_default().to_vec(),
        total,
        page: request.page(),
        page_size: request.page_size(),
    }
}
