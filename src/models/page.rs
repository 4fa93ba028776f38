//! One page of the paginated listing endpoint

use serde::{Deserialize, Serialize};

use super::Item;

/// A page as returned by the listing endpoint: `{ "results": [...], "next": ... }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Items in server order
    #[serde(default)]
    pub results: Vec<Item>,
    /// Locator of the next page (`null` or absent on the last page)
    #[serde(default)]
    pub next: Option<String>,
}

impl Page {
    /// Create a page from items and an optional next-page locator
    pub fn new(results: Vec<Item>, next: Option<&str>) -> Self {
        Self {
            results,
            next: next.map(str::to_string),
        }
    }

    /// Whether the server advertised another page
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_page_with_next() {
        let page: Page = serde_json::from_value(json!({
            "count": 2,
            "results": [{ "id": 1, "likes": 5 }],
            "next": "http://localhost/api/reels/?page=2"
        }))
        .unwrap();

        assert_eq!(page.results.len(), 1);
        assert!(page.has_next());
    }

    #[test]
    fn test_null_and_missing_fields() {
        let page: Page = serde_json::from_value(json!({ "next": null })).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_next());

        let page: Page = serde_json::from_value(json!({ "results": [], "next": "" })).unwrap();
        assert!(!page.has_next());
    }
}
