//! Feed item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Item identifier as sent by the backend (integer primary key or string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Numeric id
    Int(i64),
    /// String id (slug, UUID, ...)
    Str(String),
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for ItemId {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => write!(f, "{id}"),
        }
    }
}

/// A feed element (e.g. a reel). Identity is `id`; unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique key
    pub id: ItemId,
    /// Like count (missing or `null` means 0)
    #[serde(default)]
    pub likes: Option<u64>,
    /// Whether the current user follows the item's author
    #[serde(default)]
    pub is_following: Option<bool>,
    /// Caption text
    #[serde(default)]
    pub caption: Option<String>,
    /// When the item was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Remaining fields, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Create a bare item with a like count
    pub fn new(id: impl Into<ItemId>, likes: u64) -> Self {
        Self {
            id: id.into(),
            likes: Some(likes),
            is_following: None,
            caption: None,
            created_at: None,
            extra: Map::new(),
        }
    }

    /// Like count with the default applied
    pub fn like_count(&self) -> u64 {
        self.likes.unwrap_or(0)
    }

    /// Follow flag with the default applied
    pub fn following(&self) -> bool {
        self.is_following.unwrap_or(false)
    }

    /// Single-line caption preview (for list display)
    pub fn preview(&self, max_len: usize) -> String {
        let caption = self.caption.as_deref().unwrap_or_default().replace('\n', " ");
        if caption.chars().count() <= max_len {
            caption
        } else {
            let cut: String = caption.chars().take(max_len.saturating_sub(3)).collect();
            format!("{cut}...")
        }
    }

    /// Relative age (e.g. "5m", "2h", "3d"); empty when the backend sent no timestamp
    pub fn relative_time(&self) -> String {
        let Some(created_at) = self.created_at else {
            return String::new();
        };
        let duration = Utc::now().signed_duration_since(created_at);

        if duration.num_seconds() < 60 {
            format!("{}s", duration.num_seconds().max(0))
        } else if duration.num_minutes() < 60 {
            format!("{}m", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h", duration.num_hours())
        } else if duration.num_days() < 7 {
            format!("{}d", duration.num_days())
        } else {
            created_at.format("%b %d").to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_and_extra_fields() {
        let item: Item = serde_json::from_value(json!({
            "id": 7,
            "likes": null,
            "video": "https://cdn.example/7.mp4",
            "user": { "username": "ana" }
        }))
        .unwrap();

        assert_eq!(item.id, ItemId::Int(7));
        assert_eq!(item.like_count(), 0);
        assert!(!item.following());
        assert_eq!(item.extra["video"], "https://cdn.example/7.mp4");
        assert_eq!(item.extra["user"]["username"], "ana");
    }

    #[test]
    fn test_string_id() {
        let item: Item = serde_json::from_value(json!({ "id": "abc", "likes": 3 })).unwrap();
        assert_eq!(item.id, ItemId::from("abc"));
        assert_eq!(item.id.to_string(), "abc");
        assert_eq!(item.like_count(), 3);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let mut item = Item::new(1, 0);
        item.caption = Some("héllo wörld\nsecond line".to_string());
        assert_eq!(item.preview(100), "héllo wörld second line");
        assert_eq!(item.preview(8), "héllo...");
    }

    #[test]
    fn test_relative_time() {
        let mut item = Item::new(1, 0);
        assert_eq!(item.relative_time(), "");

        item.created_at = Some(Utc::now() - chrono::Duration::hours(2));
        assert_eq!(item.relative_time(), "2h");
    }
}
