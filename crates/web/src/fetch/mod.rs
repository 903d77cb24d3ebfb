//! Client for the remote dog API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS via `reqwest` 0.13
//! - The remote API is the source of truth; nothing is synced locally
//! - Authentication is a cookie set by `/auth/login` and replayed on every call
//!
//! # Endpoints
//!
//! | Call | Method | Returns |
//! |---|---|---|
//! | `/auth/login` | POST `{name, email}` | session cookie |
//! | `/auth/logout` | POST | - |
//! | `/dogs/search` | GET | one page of ids plus the total |
//! | `/dogs` | POST ids | dog records |
//! | `/dogs/breeds` | GET | breed names |
//! | `/dogs/match` | POST ids | one matched id |
//!
//! # Example
//!
//! ```rust,ignore
//! use dogfinder_web::fetch::FetchClient;
//!
//! let client = FetchClient::new(&config.api);
//! let session = client.login(&credentials).await?;
//!
//! let page = client.search(&session, &filters.search_request(PAGE_SIZE)).await?;
//! let dogs = client.dogs(&session, &page.result_ids).await?;
//! ```

mod client;
pub mod types;

pub use client::FetchClient;
pub use types::{ApiSession, MatchResponse, SearchResponse};

use dogfinder_core::QueryError;
use thiserror::Error;

/// Errors that can occur when talking to the dog API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The API rejected the session cookie (HTTP 401).
    #[error("401 Unauthorized")]
    Unauthorized,

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Login succeeded but no session cookie came back.
    #[error("Login response did not set a session cookie")]
    MissingSessionCookie,
}

impl FetchError {
    /// Whether the API rejected the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<FetchError> for QueryError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Unauthorized => Self::Unauthorized,
            other => Self::Failed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_query_error() {
        assert!(FetchError::Unauthorized.is_unauthorized());
        assert_eq!(
            QueryError::from(FetchError::Unauthorized),
            QueryError::Unauthorized
        );
    }

    #[test]
    fn test_status_maps_to_failed_with_message() {
        let err = FetchError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_unauthorized());
        assert_eq!(
            QueryError::from(err),
            QueryError::Failed("HTTP 500: boom".to_string())
        );
    }
}
