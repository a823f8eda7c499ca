//! Offset pagination primitives shared by Synapse listing endpoints.
//!
//! A [`PageRequest`] carries a validated 1-indexed page number and page size.
//! Adapters translate it into an offset for their storage engine and wrap
//! the matching slice in a [`Paginated`] envelope whose [`PageInfo`] reports
//! the total number of matches and the resulting page count.
//!
//! # Examples
//! ```
//! use pagination::{PageInfo, PageRequest};
//!
//! let request = PageRequest::new(3, 10)?;
//! assert_eq!(request.offset(), 20);
//!
//! let info = PageInfo::new(request, 23);
//! assert_eq!(info.pages, 3);
//! # Ok::<(), pagination::PageRequestError>(())
//! ```

use serde::{Deserialize, Serialize};

/// Page number used when the caller does not supply one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size accepted by [`PageRequest::new`].
pub const MAX_LIMIT: u32 = 100;

/// Reasons a page request is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Pages are 1-indexed.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// The page size exceeds [`MAX_LIMIT`].
    #[error("limit {limit} exceeds the maximum of {max}")]
    LimitTooLarge {
        /// Requested page size.
        limit: u32,
        /// Largest accepted page size.
        max: u32,
    },
}

/// Validated 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request, rejecting a zero page, a zero limit, or a limit above
    /// [`MAX_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] describing the first violated bound.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > MAX_LIMIT {
            return Err(PageRequestError::LimitTooLarge {
                limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    /// Build a request from optional query values, substituting
    /// [`DEFAULT_PAGE`] and [`DEFAULT_LIMIT`] for absent ones.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when a supplied value is out of bounds.
    pub const fn from_optional(
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(value) => value,
            None => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(value) => value,
            None => DEFAULT_LIMIT,
        };
        Self::new(page, limit)
    }

    /// The 1-indexed page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// The maximum number of items on the page.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Number of items preceding the first item of this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Position of a page within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// The 1-indexed page number that was requested.
    pub page: u32,
    /// The page size that was requested.
    pub limit: u32,
    /// Number of items matching the query across all pages.
    pub total: u64,
    /// Number of pages needed to hold `total` items.
    pub pages: u64,
}

impl PageInfo {
    /// Describe `request` against a result set of `total` items.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

/// A page of items plus its [`PageInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items on the requested page, in result order.
    pub items: Vec<T>,
    /// Position of the page within the full result set.
    pub info: PageInfo,
}

impl<T> Paginated<T> {
    /// Wrap `items` with page information derived from `request` and `total`.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            info: PageInfo::new(request, total),
        }
    }

    /// Transform every item while keeping the page information.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
