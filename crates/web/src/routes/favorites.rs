//! Favorites route handlers.
//!
//! Every change goes through the visitor's reducer; the effect it returns
//! decides what happens to the stored copy.

use axum::{
    Form,
    extract::State,
    response::Response,
};
use dogfinder_core::{Action, DogId, Effect, Favorites};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAuth, set_notice};
use crate::models::Notice;
use crate::services::{FavoritesStorage, ViewHandle, lock_view};
use crate::state::AppState;

use super::search::load_view;

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub id: String,
    /// Query string of the page to return to.
    #[serde(default)]
    pub query: String,
}

/// Clear form data.
#[derive(Debug, Deserialize)]
pub struct ClearForm {
    #[serde(default)]
    pub query: String,
}

/// Message shown when a favorite cannot be added.
fn full_message(favorites: &Favorites) -> String {
    favorites.policy().cap.map_or_else(
        || "Your favorites are full.".to_string(),
        |cap| format!("You can favorite at most {cap} dogs. Remove one to add another."),
    )
}

/// Perform the storage effect a favorites action asked for.
///
/// The set is read from the view at save time, so a concurrent change that
/// landed after this action is persisted too.
async fn apply(
    state: &AppState,
    session: &Session,
    view: &ViewHandle,
    effect: Effect,
) -> Result<()> {
    let storage = FavoritesStorage::new(session, state.config().policy.favorites);
    match effect {
        Effect::PersistFavorites => {
            let latest = lock_view(view).favorites().clone();
            storage.save(&latest).await?;
        }
        Effect::RemovePersistedFavorites => storage.remove().await?,
        Effect::FavoritesFull => {
            let message = full_message(lock_view(view).favorites());
            set_notice(session, Notice::error(message)).await?;
        }
        Effect::None | Effect::StaleDiscarded => {}
    }
    Ok(())
}

/// Add or remove one dog.
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Result<Response> {
    let id = form.id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("missing dog id".to_string()));
    }

    let view = load_view(&state, &session, &user).await?;
    let effect = lock_view(&view).dispatch(Action::ToggleFavorite(DogId::from(id)));

    add_breadcrumb("favorites", "Toggled favorite", Some(&[("dog_id", id)][..]));
    apply(&state, &session, &view, effect).await?;

    Ok(super::back_to_search(&form.query))
}

/// Remove every favorite.
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ClearForm>,
) -> Result<Response> {
    let view = load_view(&state, &session, &user).await?;
    let effect = lock_view(&view).dispatch(Action::ClearFavorites);

    add_breadcrumb("favorites", "Cleared favorites", None);
    apply(&state, &session, &view, effect).await?;

    Ok(super::back_to_search(&form.query))
}
