//! Fixed-size page slicing for post feeds.
//!
//! The requested page number arrives from an untrusted query parameter. It is never an error:
//! anything unparsable selects page 1 and out-of-range numbers clamp to the nearest valid page.

use std::num::IntErrorKind;

use serde::Serialize;

/// Page size used when none is configured.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// A 1-based page number as requested by the client, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(i64);

impl PageRequest {
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    pub fn first() -> Self {
        Self(1)
    }

    /// Parse a raw `?page=` value. Missing or non-numeric values select page 1; numbers too
    /// large for `i64` saturate so they still clamp to the nearest boundary page.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::first();
        };
        match raw.trim().parse::<i64>() {
            Ok(number) => Self(number),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Self(i64::MAX),
                IntErrorKind::NegOverflow => Self(i64::MIN),
                _ => Self::first(),
            },
        }
    }

    pub fn number(&self) -> i64 {
        self.0
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// The resolved slice of a collection: which page, and where it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub per_page: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Splits collections into pages of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    /// Create a paginator. A zero page size is treated as one.
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages for `total` items; an empty collection still has one (empty) page.
    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Resolve a requested page against a collection of `total` items.
    pub fn window(&self, total: u64, request: PageRequest) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = request.number().clamp(1, num_pages as i64) as u64;
        let offset = (number - 1) * self.per_page;
        let limit = self.per_page.min(total.saturating_sub(offset));

        PageWindow {
            number,
            num_pages,
            total,
            per_page: self.per_page,
            offset,
            limit,
        }
    }

    /// Paginate an already materialised, ordered collection.
    pub fn paginate<T>(&self, items: Vec<T>, request: PageRequest) -> Page<T> {
        let window = self.window(items.len() as u64, request);
        let page_items = items
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect();
        Page::new(page_items, window)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// One page of a feed plus what a caller needs to render "page X of Y" and navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total: window.total,
            per_page: window.per_page,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    /// 1-based index of the first item on this page, 0 for an empty page.
    pub fn start_index(&self) -> u64 {
        if self.items.is_empty() {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page.
    pub fn end_index(&self) -> u64 {
        if self.items.is_empty() {
            0
        } else {
            self.start_index() + self.items.len() as u64 - 1
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
        }
    }
}
