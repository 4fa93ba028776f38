//! API access for the paginated listing endpoint

pub mod http;

use reqwest::Url;

use crate::error::FeedError;
use crate::models::Page;

pub use http::HttpFeedClient;

/// Fetches one page of the feed
#[allow(async_fn_in_trait)]
pub trait FeedApi {
    /// `GET url` with `Authorization: Bearer <token>`
    async fn fetch_page(&self, url: &Url, token: &str) -> Result<Page, FeedError>;
}

impl<A: FeedApi + ?Sized> FeedApi for &A {
    async fn fetch_page(&self, url: &Url, token: &str) -> Result<Page, FeedError> {
        (**self).fetch_page(url, token).await
    }
}

/// Resolve a server-supplied next-page locator against the feed URL.
///
/// Absolute URLs are used as-is; relative references (`page2`, `?page=2`)
/// are joined onto `base`.
pub fn resolve_next(base: &Url, next: &str) -> Result<Url, FeedError> {
    base.join(next)
        .map_err(|e| FeedError::Decode(format!("bad next page URL {next:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_next() {
        let base = Url::parse("http://localhost:8000/api/reels/?page_size=10").unwrap();

        assert_eq!(
            resolve_next(&base, "https://cdn.example/api/reels/?page=2")
                .unwrap()
                .as_str(),
            "https://cdn.example/api/reels/?page=2"
        );
        assert_eq!(
            resolve_next(&base, "page2").unwrap().as_str(),
            "http://localhost:8000/api/reels/page2"
        );
        assert_eq!(
            resolve_next(&base, "?page=2").unwrap().as_str(),
            "http://localhost:8000/api/reels/?page=2"
        );
    }

    #[test]
    fn test_resolve_next_rejects_garbage() {
        let base = Url::parse("http://localhost:8000/api/reels/").unwrap();
        assert!(matches!(
            resolve_next(&base, "http://[::1"),
            Err(FeedError::Decode(_))
        ));
    }
}
