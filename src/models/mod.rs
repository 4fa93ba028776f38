//! Data models for the feed

mod item;
mod page;

pub use item::{Item, ItemId};
pub use page::Page;
