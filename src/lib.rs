//! # reelfeed
//!
//! Paginated feed loading for a social reels client.
//!
//! ## Overview
//!
//! reelfeed fetches a feed of items (posts, reels) from a REST listing
//! endpoint that answers `{ "results": [...], "next": <url|null> }`, keeps the
//! items in memory, and tracks everything a view needs: loading and refreshing
//! flags, whether another page exists, the last error, and per-item like
//! counts and follow flags that survive later page loads.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FeedLoader                           │
//! │   load / refresh / fetch_more  →  snapshot for the view     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │       API       │ │      Auth       │ │     Models      │
//! │                 │ │                 │ │                 │
//! │ • FeedApi trait │ │ • Token lookup  │ │ • Item / ItemId │
//! │ • reqwest impl  │ │ • Encrypted file│ │ • Page          │
//! │ • Next-page URL │ │ • In-memory     │ │ • FeedError     │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] — Listing endpoint client
//! - [`auth`] — Bearer token storage
//! - [`config`] — Configuration management
//! - [`error`] — Error taxonomy stored by the loader
//! - [`feed`] — The paginated loader and its state
//! - [`models`] — Data models (Item, Page)
//! - [`paths`] — Data directory layout
//!
//! ## Example
//!
//! ```no_run
//! use reelfeed::{Config, FeedLoader, HttpFeedClient, auth::EncryptedFileStore};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let loader = FeedLoader::new(
//!     HttpFeedClient::from_config(&config)?,
//!     EncryptedFileStore::open()?,
//!     config.feed_url()?,
//!     config.token_key.clone(),
//! );
//!
//! loader.load().await;
//! while loader.has_more() {
//!     loader.fetch_more().await;
//! }
//! println!("{} items", loader.snapshot().items.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod paths;

// Re-export main types for convenience
pub use api::{FeedApi, HttpFeedClient};
pub use config::Config;
pub use error::FeedError;
pub use feed::{FeedLoader, FeedSnapshot, LoadState, Outcome};
pub use models::{Item, ItemId, Page};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
