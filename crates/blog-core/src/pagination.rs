//! Pagination value types shared by page sources and feeds

use std::fmt::Debug;
use std::hash::Hash;

/// Items with a stable identity key, used to keep feeds free of duplicates
pub trait Identified {
    type Key: Eq + Hash + Clone + Debug + Send + Sync;

    fn key(&self) -> Self::Key;
}

/// One page as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total_items: u64,
    /// Page count, when the endpoint reports it
    pub total_pages: Option<u32>,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, total_items: u64, total_pages: Option<u32>) -> Self {
        Self {
            items,
            total_items,
            total_pages,
        }
    }

    /// Page count, preferring the server's figure and deriving it otherwise (floor 1)
    pub fn resolved_total_pages(&self, page_size: u32) -> u32 {
        self.total_pages
            .unwrap_or_else(|| total_pages_for(self.total_items, page_size))
            .max(1)
    }
}

/// `ceil(total_items / page_size)`, never less than 1
pub fn total_pages_for(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total_items.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}
