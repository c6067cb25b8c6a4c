//! # Paged Results
//!
//! [`PageRequest`] describes a window over an ordered result set and [`Page`]
//! carries that window back together with the total number of matches.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskRepositoryError};
use crate::query_builder::sort::SortKeys;

/// Zero-based offset, positive page size and optional caller sort keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    offset: u64,
    page_size: u32,
    #[serde(default)]
    sort: SortKeys,
}

impl PageRequest {
    /// Validate a raw offset/size pair.
    ///
    /// A negative offset or a page size outside `1..=u32::MAX` is rejected
    /// with [`TaskRepositoryError::InvalidArgument`].
    pub fn new(offset: i64, page_size: i64) -> Result<Self> {
        if offset < 0 {
            return Err(TaskRepositoryError::invalid_argument(format!(
                "page offset must not be negative, got {offset}"
            )));
        }
        if page_size <= 0 {
            return Err(TaskRepositoryError::invalid_argument(format!(
                "page size must be positive, got {page_size}"
            )));
        }
        let page_size = u32::try_from(page_size).map_err(|_| {
            TaskRepositoryError::invalid_argument(format!("page size {page_size} is too large"))
        })?;

        Ok(Self {
            offset: offset as u64,
            page_size,
            sort: SortKeys::default(),
        })
    }

    /// Request the zero-based `page_number`-th page of `page_size` elements
    pub fn of_page(page_number: u32, page_size: u32) -> Result<Self> {
        Self::new(
            i64::from(page_number) * i64::from(page_size),
            i64::from(page_size),
        )
    }

    /// First page of `page_size` elements
    pub fn first(page_size: u32) -> Result<Self> {
        Self::new(0, i64::from(page_size))
    }

    pub fn with_sort(mut self, sort: SortKeys) -> Self {
        self.sort = sort;
        self
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort(&self) -> &SortKeys {
        &self.sort
    }

    /// Zero-based page number this offset falls on
    pub fn page_number(&self) -> u64 {
        self.offset / u64::from(self.page_size)
    }

    /// The request for the page directly after this one
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset + u64::from(self.page_size),
            page_size: self.page_size,
            sort: self.sort.clone(),
        }
    }

    /// Cut this request's window out of an already ordered slice
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(items.len());
        let end = start.saturating_add(self.page_size as usize).min(items.len());
        items[start..end].to_vec()
    }
}

/// One window of an ordered result set plus the total number of matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    content: Vec<T>,
    offset: u64,
    page_size: u32,
    total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            offset: request.offset(),
            page_size: request.page_size(),
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Size of this slice, at most `page_size`
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    /// Total number of matches, independent of the slice
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next(&self) -> bool {
        self.offset + u64::from(self.page_size) < self.total_elements
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            offset: self.offset,
            page_size: self.page_size,
            total_elements: self.total_elements,
        }
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}
