//! Match route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use dogfinder_core::Filters;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, set_notice};
use crate::models::Notice;
use crate::services::{MatchError, lock_view};
use crate::state::AppState;

use super::search::{DogCard, load_view};

/// Match form data.
#[derive(Debug, Deserialize)]
pub struct MatchForm {
    /// Query string of the search page the request came from.
    #[serde(default)]
    pub query: String,
}

/// Match result template.
#[derive(Template, WebTemplate)]
#[template(path = "search/match.html")]
pub struct MatchTemplate {
    pub user_name: String,
    pub dog: DogCard,
    pub back_href: String,
}

/// Ask the dog API to pick one of the visitor's favorites.
///
/// Failures become a notice on the search page; an empty favorites set is
/// refused without calling the API.
pub async fn find_match(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<MatchForm>,
) -> Result<Response> {
    let view = load_view(&state, &session, &user).await?;
    let favorites = lock_view(&view).favorites().clone();

    match state
        .search()
        .request_match(&user.api_session(), &favorites)
        .await
    {
        Ok(dog) => {
            add_breadcrumb("match", "Found a match", Some(&[("dog_id", dog.id.as_str())][..]));
            let back_href = super::search_url(&Filters::from_query(&form.query));
            Ok(MatchTemplate {
                user_name: user.name,
                dog: DogCard {
                    favorite: favorites.contains(&dog.id),
                    id: dog.id.into_inner(),
                    name: dog.name,
                    age: dog.age,
                    zip_code: dog.zip_code,
                    breed: dog.breed,
                    img: dog.img,
                },
                back_href,
            }
            .into_response())
        }
        Err(e) if e.is_unauthorized() && state.config().policy.redirect_on_unauthorized => {
            super::session_expired(&state, &session, &user).await
        }
        Err(e) => {
            if !matches!(e, MatchError::NoFavorites) {
                tracing::warn!(error = %e, "Match request failed");
            }
            set_notice(&session, Notice::error(match_failure_message(&e))).await?;
            Ok(super::back_to_search(&form.query))
        }
    }
}

fn match_failure_message(err: &MatchError) -> String {
    match err {
        MatchError::NoFavorites => err.to_string(),
        MatchError::NotFound(_) | MatchError::Fetch(_) => {
            format!("Could not find a match: {err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fetch::FetchError;

    use super::*;

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            match_failure_message(&MatchError::NoFavorites),
            "Add at least one favorite to find a match."
        );
        assert_eq!(
            match_failure_message(&MatchError::Fetch(FetchError::Status {
                status: 500,
                message: "down".to_string(),
            })),
            "Could not find a match: HTTP 500: down"
        );
    }
}
