//! Errors surfaced by the feed loader

use thiserror::Error;

/// Why a fetch failed. Stored in the loader state rather than propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// No bearer credential could be obtained
    #[error("Not signed in: {0}")]
    Authentication(String),

    /// The server answered with a non-2xx status
    #[error("Server returned HTTP {status}")]
    Http {
        /// Response status code
        status: u16,
    },

    /// The request could not complete (connect, TLS, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The response or the next-page locator could not be understood
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl FeedError {
    /// Whether this is an authentication failure
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// HTTP status, if the server answered
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            FeedError::Http { status: 503 }.to_string(),
            "Server returned HTTP 503"
        );
        assert_eq!(
            FeedError::Authentication("no token stored".into()).to_string(),
            "Not signed in: no token stored"
        );
    }

    #[test]
    fn test_accessors() {
        assert!(FeedError::Authentication(String::new()).is_auth());
        assert_eq!(FeedError::Http { status: 404 }.status(), Some(404));
        assert_eq!(FeedError::Network("reset".into()).status(), None);
    }
}
