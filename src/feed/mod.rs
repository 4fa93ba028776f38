//! Paginated remote list loader
//!
//! [`FeedLoader`] owns the list of items fetched from the listing endpoint and
//! the per-item auxiliary maps. Views call [`FeedLoader::load`] on mount,
//! [`FeedLoader::refresh`] on pull-to-refresh and [`FeedLoader::fetch_more`]
//! when the end of the list is reached, then render [`FeedLoader::snapshot`].
//!
//! Failures never escape as `Err`: they are stored in the snapshot's `error`
//! and the caller retries by invoking `refresh` or `fetch_more` again.

mod state;

pub use state::{AuxMaps, FeedSnapshot, LoadState};

use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::{self, FeedApi};
use crate::auth::CredentialStore;
use crate::error::FeedError;
use crate::models::{ItemId, Page};

use state::FeedState;

/// What a loader operation ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A page was merged into the list
    Loaded {
        /// Number of items in the merged page
        added: usize,
    },
    /// The fetch failed; the reason is in the snapshot
    Failed,
    /// Nothing was requested (no next page, pagination already in flight, or closed)
    Skipped,
    /// The response arrived after a newer load/refresh or after `close`, and was dropped
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reload {
    Initial,
    Refresh,
}

/// Claim on the pagination slot; releasing it on drop covers success,
/// failure and a dropped future alike.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Clears `loading`/`refreshing` when a `load`/`refresh` ends, including when
/// its future is dropped. Only the current generation may clear the flags.
struct ReloadFlags<'a> {
    state: &'a Mutex<FeedState>,
    generation: u64,
}

impl Drop for ReloadFlags<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation == self.generation {
            state.loading = false;
            state.refreshing = false;
        }
    }
}

/// Loads a paginated feed and keeps it in memory
pub struct FeedLoader<A, C> {
    api: A,
    credentials: C,
    token_key: String,
    feed_url: Url,
    state: Mutex<FeedState>,
    fetching_more: AtomicBool,
}

impl<A: FeedApi, C: CredentialStore> FeedLoader<A, C> {
    /// Create an empty loader for `feed_url`, reading the bearer token from
    /// `credentials` under `token_key`
    pub fn new(api: A, credentials: C, feed_url: Url, token_key: impl Into<String>) -> Self {
        Self {
            api,
            credentials,
            token_key: token_key.into(),
            feed_url,
            state: Mutex::new(FeedState::default()),
            fetching_more: AtomicBool::new(false),
        }
    }

    /// First-page URL
    pub const fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    /// Fetch the first page, replacing the list
    pub async fn load(&self) -> Outcome {
        self.reload(Reload::Initial).await
    }

    /// Re-fetch the first page, replacing the list. Clears the previous error.
    pub async fn refresh(&self) -> Outcome {
        self.reload(Reload::Refresh).await
    }

    async fn reload(&self, kind: Reload) -> Outcome {
        let generation = {
            let mut state = self.state();
            if state.closed {
                return Outcome::Skipped;
            }
            state.generation += 1;
            state.loading = kind == Reload::Initial;
            state.refreshing = kind == Reload::Refresh;
            if kind == Reload::Refresh {
                state.error = None;
            }
            state.generation
        };
        let _flags = ReloadFlags {
            state: &self.state,
            generation,
        };
        tracing::debug!("{kind:?} #{generation}: fetching {}", self.feed_url);

        let result = self.fetch(&self.feed_url).await;

        let mut state = self.state();
        if state.closed {
            tracing::debug!("{kind:?} #{generation}: loader closed, dropping response");
            return Outcome::Discarded;
        }
        if state.generation != generation {
            tracing::debug!("{kind:?} #{generation}: superseded, dropping response");
            return Outcome::Discarded;
        }

        state.loading = false;
        state.refreshing = false;
        match result {
            Ok(page) => {
                let added = state.replace(page);
                state.error = None;
                tracing::debug!("{kind:?} #{generation}: {added} items, more: {}", state.has_more());
                Outcome::Loaded { added }
            }
            Err(e) => {
                tracing::warn!("Feed {kind:?} failed: {e}");
                state.error = Some(e);
                Outcome::Failed
            }
        }
    }

    /// Fetch the next page and append it.
    ///
    /// No-op when there is no next page or another `fetch_more` is still
    /// running. On failure the list and cursor stay as they were, so calling
    /// again retries the same page.
    pub async fn fetch_more(&self) -> Outcome {
        let next = {
            let state = self.state();
            if state.closed {
                return Outcome::Skipped;
            }
            state.next.clone()
        };
        let Some(next) = next else {
            tracing::trace!("fetch_more: no next page");
            return Outcome::Skipped;
        };

        let Some(_in_flight) = InFlight::acquire(&self.fetching_more) else {
            tracing::debug!("fetch_more: already in flight");
            return Outcome::Skipped;
        };

        let result = match api::resolve_next(&self.feed_url, &next) {
            Ok(url) => {
                tracing::debug!("fetch_more: fetching {url}");
                self.fetch(&url).await
            }
            Err(e) => Err(e),
        };

        let mut state = self.state();
        if state.closed {
            tracing::debug!("fetch_more: loader closed, dropping response");
            return Outcome::Discarded;
        }
        match result {
            Ok(page) => {
                let added = state.append(page);
                state.error = None;
                tracing::debug!("fetch_more: {added} items, more: {}", state.has_more());
                Outcome::Loaded { added }
            }
            Err(e) => {
                tracing::warn!("Feed fetch_more failed: {e}");
                state.error = Some(e);
                Outcome::Failed
            }
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state();
        FeedSnapshot {
            items: state.items.clone(),
            loading: state.loading,
            refreshing: state.refreshing,
            loading_more: self.fetching_more.load(Ordering::Acquire),
            has_more: state.has_more(),
            error: state.error.clone(),
            likes: state.aux.likes.clone(),
            following: state.aux.following.clone(),
        }
    }

    /// Whether another page is available
    pub fn has_more(&self) -> bool {
        self.state().has_more()
    }

    /// Number of loaded items
    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    /// Whether no items are loaded
    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// Current error, if any
    pub fn error(&self) -> Option<FeedError> {
        self.state().error.clone()
    }

    /// Like count for an item
    pub fn likes(&self, id: &ItemId) -> Option<u64> {
        self.state().aux.likes.get(id).copied()
    }

    /// Follow flag for an item
    pub fn is_following(&self, id: &ItemId) -> Option<bool> {
        self.state().aux.following.get(id).copied()
    }

    /// Overwrite the like count for an item
    pub fn set_likes(&self, id: ItemId, likes: u64) {
        self.state().aux.likes.insert(id, likes);
    }

    /// Bump the like count for an item, returning the new count
    pub fn like(&self, id: &ItemId) -> u64 {
        let mut state = self.state();
        let count = state.aux.likes.entry(id.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Drop the like count for an item by one, returning the new count
    pub fn unlike(&self, id: &ItemId) -> u64 {
        let mut state = self.state();
        let count = state.aux.likes.entry(id.clone()).or_insert(0);
        *count = count.saturating_sub(1);
        *count
    }

    /// Set the follow flag for an item
    pub fn set_following(&self, id: ItemId, following: bool) {
        self.state().aux.following.insert(id, following);
    }

    /// Flip the follow flag for an item, returning the new value
    pub fn toggle_following(&self, id: &ItemId) -> bool {
        let mut state = self.state();
        let flag = state.aux.following.entry(id.clone()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Edit the auxiliary maps directly
    pub fn update_aux<R>(&self, f: impl FnOnce(&mut AuxMaps) -> R) -> R {
        f(&mut self.state().aux)
    }

    /// Tear down: later calls are skipped and in-flight responses are dropped
    pub fn close(&self) {
        self.state().close();
    }

    /// Whether `close` has not been called
    pub fn is_active(&self) -> bool {
        !self.state().closed
    }

    async fn fetch(&self, url: &Url) -> Result<Page, FeedError> {
        let token = self.token()?;
        self.api.fetch_page(url, &token).await
    }

    fn token(&self) -> Result<String, FeedError> {
        match self.credentials.get(&self.token_key) {
            Ok(Some(token)) if !token.is_empty() => Ok(token),
            Ok(_) => Err(FeedError::Authentication(format!(
                "no credential stored under {:?}",
                self.token_key
            ))),
            Err(e) => Err(FeedError::Authentication(format!(
                "credential store unavailable: {e:#}"
            ))),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
