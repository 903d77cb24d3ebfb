//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;

use crate::config::WebConfig;
use crate::fetch::FetchClient;
use crate::middleware::content_security_policy;
use crate::services::{SearchCoordinator, ViewRegistry};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("image origin is not a valid header value: {0}")]
    InvalidImageOrigin(#[from] InvalidHeaderValue),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    search: SearchCoordinator,
    views: ViewRegistry,
    csp: HeaderValue,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured image origin cannot appear in a
    /// `Content-Security-Policy` header.
    pub fn new(config: WebConfig) -> Result<Self, StateError> {
        let client = FetchClient::new(&config.api);
        let search = SearchCoordinator::new(client, &config.cache);
        let csp = HeaderValue::from_str(&content_security_policy(
            &config.api.image_origin,
            config.is_secure(),
        ))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                search,
                views: ViewRegistry::new(),
                csp,
            }),
        })
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the search coordinator.
    #[must_use]
    pub fn search(&self) -> &SearchCoordinator {
        &self.inner.search
    }

    /// Get a reference to the dog API client.
    #[must_use]
    pub fn api(&self) -> &FetchClient {
        self.inner.search.client()
    }

    /// Get a reference to the per-browser view registry.
    #[must_use]
    pub fn views(&self) -> &ViewRegistry {
        &self.inner.views
    }

    #[must_use]
    pub fn content_security_policy(&self) -> &HeaderValue {
        &self.inner.csp
    }
}
