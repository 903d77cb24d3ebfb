//! Session-related types.
//!
//! Types stored in the session for login state and one-shot notices.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fetch::ApiSession;

/// Session-stored visitor identity.
///
/// Implements `Debug` manually to redact the API cookie.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Name given at login.
    pub name: String,
    /// Email given at login.
    pub email: String,
    /// Id of this login's search state, minted fresh at every login.
    pub client_id: Uuid,
    /// `Cookie` header value for the dog API.
    api_cookie: String,
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("client_id", &self.client_id)
            .field("api_cookie", &"[REDACTED]")
            .finish()
    }
}

impl CurrentUser {
    #[must_use]
    pub fn new(name: String, email: String, session: &ApiSession) -> Self {
        Self {
            name,
            email,
            client_id: Uuid::new_v4(),
            api_cookie: session.cookie().to_string(),
        }
    }

    /// The dog API session for this visitor.
    #[must_use]
    pub fn api_session(&self) -> ApiSession {
        ApiSession::from_cookie(self.api_cookie.clone())
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

impl NoticeLevel {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in visitor.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the persisted favorites object.
    pub const FAVORITES: &str = "dogFavorites";

    /// Key for the pending one-shot notice.
    pub const NOTICE: &str = "notice";
}
