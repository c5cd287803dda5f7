//! Cursors, page windows and result pages.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CatalogError;
use crate::item::Item;

/// Opaque pagination position: a zero-based page index.
///
/// An absent cursor means "first page".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(u32);

impl Cursor {
    /// Create a cursor for a page index.
    pub fn new(page: u32) -> Self {
        Self(page)
    }

    /// Get the page index.
    pub fn page(&self) -> u32 {
        self.0
    }

    /// Cursor of the following page.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page:{}", self.0)
    }
}

/// Page sizes for the first page and every page after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSizes {
    /// Items on the first page.
    pub initial: usize,
    /// Items on each "load more" page.
    pub subsequent: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            initial: 6,
            subsequent: 4,
        }
    }
}

impl PageSizes {
    /// Create page sizes, rejecting zero.
    pub fn new(initial: usize, subsequent: usize) -> Result<Self, CatalogError> {
        let sizes = Self {
            initial,
            subsequent,
        };
        sizes.validate()?;
        Ok(sizes)
    }

    /// Check that both sizes are at least 1.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.initial == 0 {
            return Err(CatalogError::InvalidPageSize("initial"));
        }
        if self.subsequent == 0 {
            return Err(CatalogError::InvalidPageSize("subsequent"));
        }
        Ok(())
    }

    /// Offset/limit window for a cursor.
    ///
    /// Pages are contiguous: page N>0 starts at `initial + subsequent * (N - 1)`.
    pub fn window(&self, cursor: Option<Cursor>) -> PageWindow {
        match cursor.map(|c| c.page()) {
            None | Some(0) => PageWindow {
                offset: 0,
                limit: self.initial,
            },
            Some(page) => PageWindow {
                offset: self.initial + self.subsequent * (page as usize - 1),
                limit: self.subsequent,
            },
        }
    }
}

/// An offset/limit window over a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    /// Exclusive end of the window.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }

    /// Slice a candidate set, clamped to its length.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = self.end().min(items.len());
        &items[start..end]
    }
}

/// One page of a query's candidate set.
///
/// `has_more()` is true iff a next cursor is present. The fields are private
/// so that the two can only be set together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    items: Vec<Item>,
    next_cursor: Option<Cursor>,
    has_more: bool,
    total: usize,
}

impl ResultPage {
    /// Build the page served for `window` out of a candidate set of `total` items.
    ///
    /// `cursor` is the cursor the page was requested with.
    pub fn from_window(
        items: Vec<Item>,
        window: PageWindow,
        total: usize,
        cursor: Option<Cursor>,
    ) -> Self {
        let end = window.end().min(total);
        let next_cursor = if end < total {
            Some(cursor.unwrap_or(Cursor(0)).next())
        } else {
            None
        };

        Self {
            items,
            has_more: next_cursor.is_some(),
            next_cursor,
            total,
        }
    }

    /// A terminal page with no successor.
    pub fn last(items: Vec<Item>, total: usize) -> Self {
        Self {
            items,
            next_cursor: None,
            has_more: false,
            total,
        }
    }

    /// Items on this page, in candidate order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Consume the page and return its items.
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Cursor of the next page, absent on the last page.
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.next_cursor
    }

    /// Whether another page follows.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Size of the whole candidate set.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_window() {
        let sizes = PageSizes::default();
        assert_eq!(sizes.window(None), PageWindow { offset: 0, limit: 6 });
        assert_eq!(sizes.window(Some(Cursor::new(0))), PageWindow { offset: 0, limit: 6 });
    }

    #[test]
    fn test_windows_are_contiguous() {
        let sizes = PageSizes::default();
        assert_eq!(sizes.window(Some(Cursor::new(1))), PageWindow { offset: 6, limit: 4 });
        assert_eq!(sizes.window(Some(Cursor::new(2))), PageWindow { offset: 10, limit: 4 });
        assert_eq!(sizes.window(Some(Cursor::new(5))), PageWindow { offset: 22, limit: 4 });

        let mut expected_offset = sizes.initial;
        for page in 1..20 {
            let window = sizes.window(Some(Cursor::new(page)));
            assert_eq!(window.offset, expected_offset);
            expected_offset = window.end();
        }
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            PageSizes::new(0, 4),
            Err(CatalogError::InvalidPageSize("initial"))
        ));
        assert!(matches!(
            PageSizes::new(6, 0),
            Err(CatalogError::InvalidPageSize("subsequent"))
        ));
        assert!(PageSizes::new(6, 4).is_ok());
    }

    #[test]
    fn test_window_slice_clamps() {
        let data: Vec<u32> = (0..8).collect();
        let window = PageWindow { offset: 6, limit: 4 };
        assert_eq!(window.slice(&data), &[6, 7]);

        let past_end = PageWindow { offset: 12, limit: 4 };
        assert!(past_end.slice(&data).is_empty());
    }

    #[test]
    fn test_page_has_more_iff_cursor() {
        let first = ResultPage::from_window(Vec::new(), PageWindow { offset: 0, limit: 6 }, 8, None);
        assert!(first.has_more());
        assert_eq!(first.next_cursor(), Some(Cursor::new(1)));

        let second = ResultPage::from_window(
            Vec::new(),
            PageWindow { offset: 6, limit: 4 },
            8,
            first.next_cursor(),
        );
        assert!(!second.has_more());
        assert_eq!(second.next_cursor(), None);
    }

    #[test]
    fn test_exact_fit_is_terminal() {
        let page = ResultPage::from_window(Vec::new(), PageWindow { offset: 0, limit: 6 }, 6, None);
        assert!(!page.has_more());
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn test_cursor_increments_from_previous() {
        let page = ResultPage::from_window(
            Vec::new(),
            PageWindow { offset: 10, limit: 4 },
            30,
            Some(Cursor::new(2)),
        );
        assert_eq!(page.next_cursor(), Some(Cursor::new(3)));
    }
}
