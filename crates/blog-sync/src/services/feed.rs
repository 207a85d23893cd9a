//! Paginated feed
//!
//! A paged view over a `PageSource`. Page-jump feeds (`MergeMode::Replace`) show exactly one
//! page at a time; load-more feeds (`MergeMode::Append`) accumulate pages in order.
//!
//! Every fetch carries the generation it was issued under. `go_to_page`, `reset` and
//! `refresh` start a new generation; a response arriving for an older one is dropped.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use blog_core::{total_pages_for, DomainError, Identified, PageResponse, PageSource};

use super::SyncResult;

/// How fetched pages merge into the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Items become exactly the fetched page
    Replace,
    /// Fetched pages are appended in order
    Append,
}

/// Snapshot of a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Last fetched page, 1-based
    pub page_number: u32,
    pub page_size: u32,
    pub total_items: u64,
    /// Never less than 1
    pub total_pages: u32,
}

impl<T> Page<T> {
    fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page_number: 1,
            page_size,
            total_items: 0,
            total_pages: 1,
        }
    }

    /// Whether a load-more would fetch another page
    pub fn has_more(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct FeedState<Q, T> {
    page: Page<T>,
    query: Q,
    /// Set once a fetch for the current query has settled
    totals_known: bool,
}

/// Paged collection with replace or append merging
pub struct PaginatedFeed<S: PageSource> {
    source: S,
    mode: MergeMode,
    page_size: u32,
    state: Mutex<FeedState<S::Query, S::Item>>,
    generation: AtomicU64,
    snapshots: watch::Sender<Page<S::Item>>,
}

impl<S: PageSource> PaginatedFeed<S> {
    /// Create an empty feed at page 1. A zero `page_size` is treated as 1.
    pub fn new(source: S, page_size: u32, mode: MergeMode) -> Self {
        let page_size = page_size.max(1);
        let (snapshots, _) = watch::channel(Page::empty(page_size));
        Self {
            source,
            mode,
            page_size,
            state: Mutex::new(FeedState {
                page: Page::empty(page_size),
                query: S::Query::default(),
                totals_known: false,
            }),
            generation: AtomicU64::new(0),
            snapshots,
        }
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Page<S::Item> {
        self.state.lock().page.clone()
    }

    /// Query the feed was last reset with
    pub fn query(&self) -> S::Query {
        self.state.lock().query.clone()
    }

    /// Watch snapshots as they are published
    pub fn subscribe(&self) -> watch::Receiver<Page<S::Item>> {
        self.snapshots.subscribe()
    }

    /// Find an item by key
    pub fn find(&self, key: &<S::Item as Identified>::Key) -> Option<S::Item> {
        self.state
            .lock()
            .page
            .items
            .iter()
            .find(|item| &item.key() == key)
            .cloned()
    }

    /// Jump to page `n` (page-jump feeds only).
    ///
    /// Rejects `n` outside `1..=total_pages` without fetching. When a newer jump is issued
    /// before this one settles, this call's response is dropped and the current snapshot
    /// is returned.
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn go_to_page(&self, n: u32) -> SyncResult<Page<S::Item>> {
        if self.mode != MergeMode::Replace {
            return Err(DomainError::WrongMergeMode {
                operation: "go_to_page",
            });
        }

        let (query, token) = {
            let state = self.state.lock();
            let total_pages = state.page.total_pages;
            if n < 1 || (state.totals_known && n > total_pages) {
                return Err(DomainError::InvalidPage {
                    requested: n,
                    total_pages,
                });
            }
            (state.query.clone(), self.next_generation())
        };

        self.fetch(token, &query, n, MergeMode::Replace).await
    }

    /// Fetch and append the next page (load-more feeds only).
    ///
    /// No-op once the last page is loaded. A failed fetch leaves the feed unchanged.
    #[instrument(skip(self))]
    pub async fn load_more(&self) -> SyncResult<Page<S::Item>> {
        if self.mode != MergeMode::Append {
            return Err(DomainError::WrongMergeMode {
                operation: "load_more",
            });
        }

        let (query, next, token) = {
            let state = self.state.lock();
            if state.page.page_number >= state.page.total_pages {
                return Ok(state.page.clone());
            }
            (
                state.query.clone(),
                state.page.page_number + 1,
                self.generation.load(Ordering::SeqCst),
            )
        };

        self.fetch(token, &query, next, MergeMode::Append).await
    }

    /// Clear the feed for a new query and fetch its first page
    #[instrument(skip(self))]
    pub async fn reset(&self, query: S::Query) -> SyncResult<Page<S::Item>> {
        let token = {
            let mut state = self.state.lock();
            let token = self.next_generation();
            *state = FeedState {
                page: Page::empty(self.page_size),
                query: query.clone(),
                totals_known: false,
            };
            self.snapshots.send_replace(state.page.clone());
            token
        };

        self.fetch(token, &query, 1, MergeMode::Replace).await
    }

    /// Re-fetch with the current query: the current page for page-jump feeds, everything
    /// from page 1 for load-more feeds
    pub async fn refresh(&self) -> SyncResult<Page<S::Item>> {
        match self.mode {
            MergeMode::Replace => {
                let (query, page, token) = {
                    let state = self.state.lock();
                    let page = if state.totals_known {
                        state.page.page_number
                    } else {
                        1
                    };
                    (state.query.clone(), page, self.next_generation())
                };
                self.fetch(token, &query, page, MergeMode::Replace).await
            }
            MergeMode::Append => self.reset(self.query()).await,
        }
    }

    /// Replace the item with the same key in place, or insert it at the front.
    ///
    /// Returns `true` when an existing item was replaced.
    pub fn upsert_item(&self, item: S::Item) -> bool {
        let key = item.key();
        let mut state = self.state.lock();
        let position = state.page.items.iter().position(|existing| existing.key() == key);
        let replaced = match position {
            Some(index) => {
                state.page.items[index] = item;
                true
            }
            None => {
                state.page.items.insert(0, item);
                state.page.total_items += 1;
                if self.mode == MergeMode::Replace {
                    state.page.items.truncate(self.page_size as usize);
                }
                self.recount(&mut state.page);
                false
            }
        };
        self.snapshots.send_replace(state.page.clone());
        replaced
    }

    /// Remove an item by key, decrementing `total_items`
    pub fn remove_item(&self, key: &<S::Item as Identified>::Key) -> Option<S::Item> {
        let mut state = self.state.lock();
        let index = state.page.items.iter().position(|item| &item.key() == key)?;
        let removed = state.page.items.remove(index);
        state.page.total_items = state.page.total_items.saturating_sub(1);
        self.recount(&mut state.page);
        self.snapshots.send_replace(state.page.clone());
        Some(removed)
    }

    /// Re-derive `total_pages` after a local change to `total_items`
    fn recount(&self, page: &mut Page<S::Item>) {
        page.total_pages = total_pages_for(page.total_items, self.page_size);
        page.page_number = page.page_number.min(page.total_pages);
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn fetch(
        &self,
        token: u64,
        query: &S::Query,
        page_number: u32,
        merge: MergeMode,
    ) -> SyncResult<Page<S::Item>> {
        let result = self.source.fetch_page(query, page_number, self.page_size).await;

        let mut state = self.state.lock();
        if self.generation.load(Ordering::SeqCst) != token {
            debug!(page = page_number, "Superseded page response dropped");
            return Ok(state.page.clone());
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(page = page_number, error = %err, "Page fetch failed");
                return Err(err);
            }
        };

        self.merge(&mut state, response, page_number, merge);
        state.totals_known = true;
        self.snapshots.send_replace(state.page.clone());
        Ok(state.page.clone())
    }

    fn merge(
        &self,
        state: &mut FeedState<S::Query, S::Item>,
        response: PageResponse<S::Item>,
        page_number: u32,
        merge: MergeMode,
    ) {
        let total_pages = response.resolved_total_pages(self.page_size);
        let mut fetched = response.items;
        if fetched.len() > self.page_size as usize {
            warn!(
                page = page_number,
                received = fetched.len(),
                page_size = self.page_size,
                "Page larger than requested, truncating"
            );
            fetched.truncate(self.page_size as usize);
        }

        let page = &mut state.page;
        match merge {
            MergeMode::Replace => {
                let mut seen = HashSet::new();
                fetched.retain(|item| seen.insert(item.key()));
                page.items = fetched;
            }
            MergeMode::Append => {
                let mut seen: HashSet<_> = page.items.iter().map(Identified::key).collect();
                page.items
                    .extend(fetched.into_iter().filter(|item| seen.insert(item.key())));
            }
        }
        page.total_items = response.total_items;
        page.total_pages = total_pages;
        page.page_number = page_number.min(total_pages);
    }
}
