//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Home page
//! GET  /health            - Health check
//!
//! # Auth
//! GET  /login             - Login page
//! POST /login             - Login action
//! POST /logout            - Logout action
//!
//! # Search (requires login)
//! GET  /search            - Results for ?page&breed&sortBy&sort
//! POST /search/filters    - Merge filter changes, redirect to the new URL
//!
//! # Favorites (requires login)
//! POST /favorites/toggle  - Add or remove one dog
//! POST /favorites/clear   - Remove every favorite
//!
//! # Match (requires login)
//! POST /match             - Pick one dog from the favorites
//! ```

pub mod auth;
pub mod favorites;
pub mod home;
pub mod matching;
pub mod search;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use dogfinder_core::Filters;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user};
use crate::middleware::{clear_current_user, set_notice};
use crate::models::{CurrentUser, Notice};
use crate::state::AppState;

/// Notice shown after the dog API rejects a session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(favorites::toggle))
        .route("/clear", post(favorites::clear))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/search", get(search::index))
        .route("/search/filters", post(search::apply_filters))
        .nest("/favorites", favorites_routes())
        .route("/match", post(matching::find_match))
}

/// URL of the search page for `filters`.
#[must_use]
pub fn search_url(filters: &Filters) -> String {
    format!("/search?{}", filters.to_query())
}

/// Redirect back to the search page a form was posted from.
///
/// The posted query is re-parsed, so only a canonical search URL is ever
/// produced.
#[must_use]
pub fn back_to_search(raw_query: &str) -> Response {
    Redirect::to(&search_url(&Filters::from_query(raw_query))).into_response()
}

/// Forget the visitor's login after the dog API rejected it, and send them to
/// the login page with a notice. Favorites are kept.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn session_expired(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> Result<Response> {
    tracing::info!(client_id = %user.client_id, "Dog API session rejected");
    state.views().remove(&user.client_id);
    clear_current_user(session).await?;
    clear_sentry_user();
    set_notice(session, Notice::error(SESSION_EXPIRED_MESSAGE)).await?;
    Ok(Redirect::to("/login").into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn test_back_to_search_canonicalizes() {
        let response = back_to_search("breed=Pug&sort=desc&evil=//example.com");
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/search?page=1&breed=Pug&sortBy=breed&sort=desc")
        );
    }

    #[test]
    fn test_search_url_default() {
        assert_eq!(
            search_url(&Filters::default()),
            "/search?page=1&breed=All+breeds&sortBy=breed&sort=asc"
        );
    }
}
