//! Offset/limit pagination convention shared by every paged listing.
//!
//! Both the book and audio endpoints funnel their query parameters into a
//! [`PageRequest`] and hand slices back as a [`PageResponse`]; the derived
//! flags are always recomputed here, never trusted from caller input.

use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A parsed sort specification: which field, and which way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Parse a combined spec of the form `field` or `field,desc`.
    ///
    /// The trailing token matches `desc` case-insensitively; any other
    /// trailing token means ascending. A blank field yields no sort.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(2, ',');
        let field = parts.next().unwrap_or("").trim();
        if field.is_empty() {
            return None;
        }
        let direction = match parts.next() {
            Some(dir) if dir.trim().eq_ignore_ascii_case("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        Some(Self::new(field, direction))
    }
}

/// Normalized page request. Construction clamps the page number to at least
/// 1 and the page size into `[1, MAX_PAGE_SIZE]`.
#[derive(Debug, Clone)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
    sort: Option<SortSpec>,
    search_keyword: Option<String>,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1).min(u32::MAX as i64) as u32,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE as i64) as u32,
            sort: None,
            search_keyword: None,
        }
    }

    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    /// Attach a search keyword; blank keywords are treated as absent.
    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.search_keyword = keyword.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// SQL-style offset: `(page - 1) * page_size`.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.search_keyword.as_deref()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE as i64)
    }
}

/// One page of results plus the derived paging metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let page_size = request.page_size();
        let current_page = request.page();
        let total_pages = total_elements.div_ceil(page_size as u64) as u32;
        Self {
            first: current_page == 1,
            last: current_page >= total_pages,
            empty: content.is_empty(),
            content,
            current_page,
            page_size,
            total_elements,
            total_pages,
        }
    }

    /// Convert the content elements while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            content: self.content.into_iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}
