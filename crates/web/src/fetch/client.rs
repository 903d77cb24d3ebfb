//! Dog API client implementation.

use std::sync::Arc;
use std::time::Duration;

use dogfinder_core::{Credentials, Dog, DogId, SearchRequest};
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::FetchError;
use super::types::{ApiSession, MatchResponse, SearchResponse};
use crate::config::FetchApiConfig;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// How much of an error body ends up in logs and messages.
const ERROR_BODY_LOG_CHARS: usize = 500;
const ERROR_BODY_MESSAGE_CHARS: usize = 200;

// =============================================================================
// FetchClient
// =============================================================================

/// Client for the remote dog API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct FetchClient {
    inner: Arc<FetchClientInner>,
}

struct FetchClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl FetchClient {
    /// Create a new dog API client.
    #[must_use]
    pub fn new(config: &FetchApiConfig) -> Self {
        Self {
            inner: Arc::new(FetchClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Log in and capture the session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the login or sets no cookie.
    #[instrument(skip(self, credentials), fields(name = %credentials.name))]
    pub async fn login(&self, credentials: &Credentials) -> Result<ApiSession, FetchError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/login"))
            .json(credentials)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let response = check_status(response).await?;

        let session =
            ApiSession::from_headers(response.headers()).ok_or(FetchError::MissingSessionCookie)?;
        debug!("Logged in to dog API");
        Ok(session)
    }

    /// End the remote session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    #[instrument(skip(self, session))]
    pub async fn logout(&self, session: &ApiSession) -> Result<(), FetchError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/logout"))
            .header(COOKIE, session.cookie())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Search for one page of dog ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the response is malformed.
    #[instrument(
        skip(self, session, request),
        fields(from = request.from, size = request.size, sort = %request.sort)
    )]
    pub async fn search(
        &self,
        session: &ApiSession,
        request: &SearchRequest,
    ) -> Result<SearchResponse, FetchError> {
        let url = Url::parse_with_params(&self.endpoint("/dogs/search"), request.query_pairs())?;
        let response = self
            .inner
            .client
            .get(url)
            .header(COOKIE, session.cookie())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let page: SearchResponse = read_json(check_status(response).await?).await?;
        debug!(total = page.total, ids = page.result_ids.len(), "Search page loaded");
        Ok(page)
    }

    /// Fetch full records for `ids`, in the order the API returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the response is malformed.
    #[instrument(skip(self, session, ids), fields(count = ids.len()))]
    pub async fn dogs(&self, session: &ApiSession, ids: &[DogId]) -> Result<Vec<Dog>, FetchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .inner
            .client
            .post(self.endpoint("/dogs"))
            .header(COOKIE, session.cookie())
            .json(ids)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        read_json(check_status(response).await?).await
    }

    /// Fetch every breed name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the response is malformed.
    #[instrument(skip(self, session))]
    pub async fn breeds(&self, session: &ApiSession) -> Result<Vec<String>, FetchError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("/dogs/breeds"))
            .header(COOKIE, session.cookie())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        read_json(check_status(response).await?).await
    }

    /// Ask the API to pick one dog from `ids`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the response is malformed.
    #[instrument(skip(self, session, ids), fields(count = ids.len()))]
    pub async fn match_dog(&self, session: &ApiSession, ids: &[DogId]) -> Result<DogId, FetchError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/dogs/match"))
            .header(COOKIE, session.cookie())
            .json(ids)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let matched: MatchResponse = read_json(check_status(response).await?).await?;
        debug!(id = %matched.matched, "Match found");
        Ok(matched.matched)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map non-success statuses to errors.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        debug!("Dog API rejected session");
        return Err(FetchError::Unauthorized);
    }

    // Get response body as text for better error diagnostics
    let body = response.text().await.unwrap_or_default();
    tracing::error!(
        status = %status,
        body = %truncate(&body, ERROR_BODY_LOG_CHARS),
        "Dog API returned non-success status"
    );
    Err(FetchError::Status {
        status: status.as_u16(),
        message: truncate(&body, ERROR_BODY_MESSAGE_CHARS),
    })
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FetchError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(&text, ERROR_BODY_LOG_CHARS),
            "Failed to parse dog API response"
        );
        FetchError::Parse(e)
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = FetchClient::new(&FetchApiConfig {
            base_url: "https://api.example/".to_string(),
            image_origin: "https://img.example".to_string(),
        });
        assert_eq!(client.endpoint("/dogs/search"), "https://api.example/dogs/search");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
