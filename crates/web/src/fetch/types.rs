//! Wire types for the dog API.

use dogfinder_core::DogId;
use reqwest::header::{HeaderMap, SET_COOKIE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Response of `GET /dogs/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub result_ids: Vec<DogId>,
    pub total: u32,
    /// Relative URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// Relative URL of the previous page, if any.
    #[serde(default)]
    pub prev: Option<String>,
}

/// Response of `POST /dogs/match`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResponse {
    #[serde(rename = "match")]
    pub matched: DogId,
}

/// Authenticated session with the dog API.
///
/// Holds the `Cookie` header value captured from the login response. The
/// value is a bearer credential; `Debug` never prints it.
#[derive(Debug, Clone)]
pub struct ApiSession {
    cookie: SecretString,
}

impl ApiSession {
    /// Wrap a previously captured `Cookie` header value.
    #[must_use]
    pub fn from_cookie(cookie: impl Into<String>) -> Self {
        Self {
            cookie: SecretString::from(cookie.into()),
        }
    }

    /// Collect the `name=value` pairs of every `Set-Cookie` header.
    ///
    /// Returns `None` if the response set no cookies.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let pairs: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .map(str::trim)
            .filter(|pair| pair.contains('='))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(Self::from_cookie(pairs.join("; ")))
        }
    }

    /// The `Cookie` header value to send.
    #[must_use]
    pub fn cookie(&self) -> &str {
        self.cookie.expose_secret()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn test_search_response_shape() {
        let json = r#"{"resultIds":["a","b"],"total":30,"next":"/dogs/search?size=2&from=2"}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.result_ids, vec![DogId::from("a"), DogId::from("b")]);
        assert_eq!(response.total, 30);
        assert!(response.next.is_some());
        assert!(response.prev.is_none());
    }

    #[test]
    fn test_match_response_shape() {
        let response: MatchResponse = serde_json::from_str(r#"{"match":"xyz"}"#).unwrap();
        assert_eq!(response.matched, DogId::from("xyz"));
    }

    #[test]
    fn test_session_from_set_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("fetch-access-token=abc123; Path=/; HttpOnly; Secure"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("other=1; Path=/"));

        let session = ApiSession::from_headers(&headers).unwrap();
        assert_eq!(session.cookie(), "fetch-access-token=abc123; other=1");
    }

    #[test]
    fn test_session_requires_a_cookie() {
        assert!(ApiSession::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_session_debug_redacts_cookie() {
        let session = ApiSession::from_cookie("fetch-access-token=topsecret");
        assert!(!format!("{session:?}").contains("topsecret"));
    }
}
