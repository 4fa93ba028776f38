//! Loader state: the item list, auxiliary per-item maps, cursor and flags

use std::collections::HashMap;

use crate::error::FeedError;
use crate::models::{Item, ItemId, Page};

/// What the loader is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing in flight
    #[default]
    Idle,
    /// First page being fetched by `load`
    LoadingInitial,
    /// Next page being fetched by `fetch_more`
    LoadingMore,
    /// First page being re-fetched by `refresh`
    Refreshing,
}

impl LoadState {
    /// Get the display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingInitial => "loading",
            Self::LoadingMore => "loading more",
            Self::Refreshing => "refreshing",
        }
    }
}

/// Per-item UI state kept beside the list, keyed by item id.
///
/// Seeding only adds entries for unknown ids, so values the user changed
/// survive later page loads. Entries are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxMaps {
    /// Like count per item
    pub likes: HashMap<ItemId, u64>,
    /// Follow flag per item
    pub following: HashMap<ItemId, bool>,
}

impl AuxMaps {
    /// Add default entries for items not seen before
    pub fn seed<'a>(&mut self, items: impl IntoIterator<Item = &'a Item>) {
        for item in items {
            self.likes
                .entry(item.id.clone())
                .or_insert_with(|| item.like_count());
            self.following
                .entry(item.id.clone())
                .or_insert_with(|| item.following());
        }
    }
}

/// Mutable state shared by the loader operations
#[derive(Debug, Default)]
pub(crate) struct FeedState {
    pub items: Vec<Item>,
    pub aux: AuxMaps,
    pub next: Option<String>,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<FeedError>,
    /// Id of the most recent `load`/`refresh`; older responses are dropped
    pub generation: u64,
    /// Set by `close`; completions must not write once this is true
    pub closed: bool,
}

impl FeedState {
    /// Drop everything loaded and refuse further writes
    pub fn close(&mut self) {
        *self = Self {
            generation: self.generation,
            closed: true,
            ..Self::default()
        };
    }

    /// Replace the list with the first page
    pub fn replace(&mut self, page: Page) -> usize {
        self.aux.seed(&page.results);
        self.next = page.next.filter(|n| !n.is_empty());
        self.items = page.results;
        self.items.len()
    }

    /// Append a following page
    pub fn append(&mut self, page: Page) -> usize {
        let added = page.results.len();
        self.aux.seed(&page.results);
        self.next = page.next.filter(|n| !n.is_empty());
        self.items.extend(page.results);
        added
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// Point-in-time copy of everything a view needs to render the feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    /// Items in server order
    pub items: Vec<Item>,
    /// `load` in flight
    pub loading: bool,
    /// `refresh` in flight
    pub refreshing: bool,
    /// `fetch_more` in flight
    pub loading_more: bool,
    /// Another page is available
    pub has_more: bool,
    /// Last failure, cleared by the next successful fetch or by `refresh`
    pub error: Option<FeedError>,
    /// Like counts
    pub likes: HashMap<ItemId, u64>,
    /// Follow flags
    pub following: HashMap<ItemId, bool>,
}

impl FeedSnapshot {
    /// Combined activity, refresh taking precedence
    pub const fn load_state(&self) -> LoadState {
        if self.refreshing {
            LoadState::Refreshing
        } else if self.loading {
            LoadState::LoadingInitial
        } else if self.loading_more {
            LoadState::LoadingMore
        } else {
            LoadState::Idle
        }
    }

    /// Human-readable error reason
    pub fn error_reason(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Ids in list order
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_keeps_existing_entries() {
        let mut aux = AuxMaps::default();
        aux.seed(&[Item::new(1, 5)]);
        aux.likes.insert(ItemId::Int(1), 6);
        aux.following.insert(ItemId::Int(1), true);

        aux.seed(&[Item::new(1, 5), Item::new(2, 3)]);

        assert_eq!(aux.likes[&ItemId::Int(1)], 6);
        assert!(aux.following[&ItemId::Int(1)]);
        assert_eq!(aux.likes[&ItemId::Int(2)], 3);
        assert!(!aux.following[&ItemId::Int(2)]);
    }

    #[test]
    fn test_replace_then_append() {
        let mut state = FeedState::default();

        state.replace(Page::new(vec![Item::new(1, 0), Item::new(2, 0)], Some("p2")));
        assert!(state.has_more());

        let added = state.append(Page::new(vec![Item::new(2, 0)], None));
        assert_eq!(added, 1);
        assert!(!state.has_more());

        // duplicates are kept as delivered
        let ids: Vec<_> = state.items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![ItemId::Int(1), ItemId::Int(2), ItemId::Int(2)]);

        state.replace(Page::new(vec![Item::new(3, 0)], Some("")));
        assert_eq!(state.items.len(), 1);
        assert!(!state.has_more());
        assert_eq!(state.aux.likes.len(), 3);
    }

    #[test]
    fn test_close_clears_but_keeps_generation() {
        let mut state = FeedState::default();
        state.replace(Page::new(vec![Item::new(1, 4)], Some("p2")));
        state.generation = 3;
        state.refreshing = true;

        state.close();

        assert!(state.closed);
        assert_eq!(state.generation, 3);
        assert!(state.items.is_empty());
        assert!(state.aux.likes.is_empty());
        assert!(!state.refreshing);
        assert!(!state.has_more());
    }

    #[test]
    fn test_load_state_precedence() {
        let mut snap = FeedSnapshot::default();
        assert_eq!(snap.load_state(), LoadState::Idle);

        snap.loading_more = true;
        assert_eq!(snap.load_state(), LoadState::LoadingMore);

        snap.refreshing = true;
        assert_eq!(snap.load_state(), LoadState::Refreshing);
        assert_eq!(snap.load_state().name(), "refreshing");
    }
}
