//! Offset/limit pagination types for repository queries

use serde::{Deserialize, Serialize};

/// Window into an ordered query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of rows to skip
    pub offset: u32,
    /// Maximum number of rows to return
    pub limit: u32,
}

impl PageRequest {
    /// Create a new page request
    ///
    /// # Examples
    ///
    /// ```
    /// use core_catalog::repositories::PageRequest;
    ///
    /// let request = PageRequest::new(8, 4);
    /// assert_eq!(request.offset, 8);
    /// assert_eq!(request.limit, 4);
    /// assert_eq!(request.end(), 12);
    /// ```
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// First `limit` rows.
    pub fn first(limit: u32) -> Self {
        Self::new(0, limit)
    }

    /// Offset one past the last requested row.
    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.limit)
    }

    /// The window directly after this one, `limit` rows wide.
    pub fn following(&self, limit: u32) -> Self {
        Self::new(self.end(), limit)
    }

    pub(crate) fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub(crate) fn sql_offset(&self) -> i64 {
        i64::from(self.offset)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(50)
    }
}

/// Rows of one window plus the total row count of the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows matching the query across all windows
    pub total: u64,
    /// Offset of the first item
    pub offset: u32,
}

impl<T> Page<T> {
    /// # Examples
    ///
    /// ```
    /// use core_catalog::repositories::{Page, PageRequest};
    ///
    /// let page = Page::new(vec![1, 2, 3, 4], 10, PageRequest::first(4));
    /// assert!(page.has_more());
    /// assert_eq!(page.next_offset(), 4);
    /// ```
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            offset: request.offset,
        }
    }

    /// Offset right after the last item of this page.
    pub fn next_offset(&self) -> u32 {
        self.offset
            .saturating_add(u32::try_from(self.items.len()).unwrap_or(u32::MAX))
    }

    /// Whether rows exist past this page.
    pub fn has_more(&self) -> bool {
        u64::from(self.next_offset()) < self.total
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_default() {
        let request = PageRequest::default();
        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, 50);
    }

    #[test]
    fn test_following_window() {
        let first = PageRequest::first(4);
        let next = first.following(2);
        assert_eq!(next, PageRequest::new(4, 2));
        assert_eq!(next.end(), 6);
    }

    #[test]
    fn test_end_saturates() {
        let request = PageRequest::new(u32::MAX - 1, 10);
        assert_eq!(request.end(), u32::MAX);
    }

    #[test]
    fn test_last_page_has_no_more() {
        let page = Page::new(vec!['a', 'b'], 6, PageRequest::new(4, 4));
        assert_eq!(page.next_offset(), 6);
        assert!(!page.has_more());
    }

    #[test]
    fn test_empty_page() {
        let page: Page<u8> = Page::new(Vec::new(), 0, PageRequest::default());
        assert!(!page.has_more());
        assert_eq!(page.next_offset(), 0);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], 25, PageRequest::new(3, 3));
        let mapped = page.map(|x| x * 2);

        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.total, 25);
        assert_eq!(mapped.offset, 3);
    }
}
