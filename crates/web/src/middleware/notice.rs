//! One-shot notices carried across a redirect.
//!
//! A handler stores a [`Notice`] before redirecting; the next page that
//! renders takes it out of the session and shows it once.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{Notice, session_keys};

/// Extractor that removes and returns the pending notice, if any.
pub struct TakeNotice(pub Option<Notice>);

impl<S> FromRequestParts<S> for TakeNotice
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = match parts.extensions.get::<Session>() {
            Some(session) => session
                .remove::<Notice>(session_keys::NOTICE)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(notice))
    }
}

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_notice(
    session: &Session,
    notice: Notice,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::NOTICE, notice).await
}
