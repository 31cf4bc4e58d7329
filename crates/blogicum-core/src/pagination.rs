//! Page-number pagination for post listings.

use serde::Serialize;

/// Default number of posts per page.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// Resolves a raw `page` query value against a listing size.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u64,
}

/// The slice of a listing a page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages for `total` items. An empty listing still has one page.
    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Pick the page for a raw query value.
    ///
    /// Missing or non-numeric input yields the first page, `last` the final
    /// one, and numbers outside the valid range clamp to the nearest page.
    pub fn window(&self, raw: Option<&str>, total: u64) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = match raw.map(str::trim) {
            Some("last") => num_pages,
            Some(value) => match value.parse::<i64>() {
                Ok(n) if n < 1 => 1,
                Ok(n) => (n as u64).min(num_pages),
                Err(_) if is_unsigned_number(value) => num_pages,
                Err(_) => 1,
            },
            None => 1,
        };

        PageWindow {
            number,
            num_pages,
            total,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

/// Digits too many to fit an integer still name a page past the end.
fn is_unsigned_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// One page of results together with its position in the listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_number: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        let has_next = window.number < window.num_pages;
        let has_previous = window.number > 1;
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total: window.total,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(window.number + 1),
            previous_page_number: has_previous.then(|| window.number - 1),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
        }
    }
}
