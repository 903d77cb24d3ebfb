//! Search page route handlers.
//!
//! The query string is re-read on every request; the page never renders
//! filters from anywhere else. Filter controls post to `/search/filters`,
//! which merges the change onto the current query and redirects.

use std::num::NonZeroU32;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{RawQuery, State},
    response::{IntoResponse, Redirect, Response},
};
use dogfinder_core::{
    ALL_BREEDS, Action, Breed, DogPage, FavoriteDog, FilterUpdate, Filters, QueryError,
    SearchView, SortDirection, SortField,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, TakeNotice};
use crate::models::{CurrentUser, Notice};
use crate::services::{FavoritesStorage, ViewHandle, lock_view};
use crate::state::AppState;

/// Page links shown on each side of the current page.
const PAGE_LINK_RADIUS: u32 = 2;

// =============================================================================
// Form Types
// =============================================================================

/// Filter change posted by the breed, sort and direction controls.
///
/// Empty fields mean "unchanged".
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    /// Query string of the page the form was posted from.
    #[serde(default)]
    pub query: String,
    pub breed: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub page: Option<String>,
}

impl FilterForm {
    fn update(&self) -> FilterUpdate {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }
        FilterUpdate {
            breed: present(&self.breed).map(Breed::parse),
            sort: present(&self.sort).and_then(SortDirection::parse),
            sort_by: present(&self.sort_by).and_then(SortField::parse),
            page: present(&self.page).and_then(|p| p.trim().parse::<NonZeroU32>().ok()),
        }
    }
}

// =============================================================================
// View Types
// =============================================================================

/// An `<option>` of a filter control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// One dog card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogCard {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
    pub img: String,
    pub favorite: bool,
}

impl From<FavoriteDog> for DogCard {
    fn from(entry: FavoriteDog) -> Self {
        let FavoriteDog { dog, favorite } = entry;
        Self {
            id: dog.id.into_inner(),
            name: dog.name,
            age: dog.age,
            zip_code: dog.zip_code,
            breed: dog.breed,
            img: dog.img,
            favorite,
        }
    }
}

/// A numbered page link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Pager below the results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub pages: Vec<PageLink>,
}

impl Pagination {
    /// Links around `filters.page` for a result set of `total_pages` pages.
    #[must_use]
    pub fn build(filters: &Filters, total_pages: u32) -> Self {
        let current = filters.page.get();
        let href = |page: u32| {
            NonZeroU32::new(page).map(|page| super::search_url(&filters.with_page(page)))
        };

        if total_pages == 0 {
            return Self {
                prev: if current > 1 { href(current - 1) } else { None },
                ..Self::default()
            };
        }

        let first = current.saturating_sub(PAGE_LINK_RADIUS).max(1);
        let last = current.saturating_add(PAGE_LINK_RADIUS).min(total_pages);
        let pages = (first..=last)
            .filter_map(|number| {
                href(number).map(|href| PageLink {
                    number,
                    href,
                    current: number == current,
                })
            })
            .collect();

        Self {
            prev: if current > 1 { href(current - 1) } else { None },
            next: if current < total_pages {
                href(current + 1)
            } else {
                None
            },
            pages,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prev.is_none() && self.next.is_none() && self.pages.len() <= 1
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search/index.html")]
pub struct SearchTemplate {
    pub user_name: String,
    pub notice: Option<Notice>,
    /// Canonical query of this page, posted back by every form.
    pub query: String,
    pub breed_options: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
    /// Direction the toggle switches to.
    pub next_sort: &'static str,
    pub sort_label: &'static str,
    pub dogs: Vec<DogCard>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub pagination: Pagination,
    pub favorites: FavoritesSummary,
}

/// Favorites panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesSummary {
    pub count: usize,
    pub full: bool,
    pub message: String,
}

impl FavoritesSummary {
    #[must_use]
    pub fn new(count: usize, full: bool) -> Self {
        let noun = if count == 1 { "dog" } else { "dogs" };
        let message = if full {
            format!("You favorited the maximum count of {count} {noun}")
        } else {
            format!("You favorited {count} {noun}")
        };
        Self {
            count,
            full,
            message,
        }
    }
}

impl SearchTemplate {
    /// Build the page for `filters` (parsed from this request's URL) from a
    /// state snapshot.
    fn new(user: &CurrentUser, notice: Option<Notice>, filters: &Filters, view: SearchView) -> Self {
        let mut breed_options = vec![SelectOption {
            value: ALL_BREEDS.to_string(),
            label: ALL_BREEDS.to_string(),
            selected: filters.breed == Breed::All,
        }];
        breed_options.extend(view.breeds.iter().map(|breed| SelectOption {
            value: breed.clone(),
            label: breed.clone(),
            selected: filters.breed.as_filter() == Some(breed.as_str()),
        }));

        let sort_options = SortField::ALL
            .iter()
            .map(|field| SelectOption {
                value: field.as_str().to_string(),
                label: field.label().to_string(),
                selected: *field == filters.sort_by,
            })
            .collect();

        let sort_label = match filters.sort {
            SortDirection::Asc => "Ascending",
            SortDirection::Desc => "Descending",
        };

        Self {
            user_name: user.name.clone(),
            notice,
            query: filters.to_query(),
            breed_options,
            sort_options,
            next_sort: filters.sort.reversed().as_str(),
            sort_label,
            pagination: Pagination::build(filters, view.total_pages),
            favorites: FavoritesSummary::new(view.favorites_count, view.favorites_full),
            is_loading: view.is_loading || view.is_stale,
            error: view.error,
            dogs: view.dogs.into_iter().map(DogCard::from).collect(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// The visitor's view, created from stored favorites on first use.
///
/// # Errors
///
/// Returns an error if the stored favorites cannot be read.
pub async fn load_view(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> Result<ViewHandle> {
    if let Some(view) = state.views().get(&user.client_id) {
        return Ok(view);
    }
    let favorites = FavoritesStorage::new(session, state.config().policy.favorites)
        .load()
        .await?;
    Ok(state.views().get_or_create(user.client_id, || favorites))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display search results for the filters in the URL.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    TakeNotice(notice): TakeNotice,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let filters = Filters::from_query(query.as_deref().unwrap_or_default());
    let view = load_view(&state, &session, &user).await?;

    let refresh = state
        .search()
        .refresh(&user.api_session(), user.client_id, &view, filters.clone())
        .await;

    if refresh.unauthorized && state.config().policy.redirect_on_unauthorized {
        return super::session_expired(&state, &session, &user).await;
    }

    let snapshot = settled_view(&view, &filters, refresh.outcome);
    Ok(SearchTemplate::new(&user, notice, &filters, snapshot).into_response())
}

/// Snapshot of `view` showing the page settled for `filters`.
///
/// The visitor may have navigated elsewhere while this request was loading;
/// the response still shows its own tuple's results, with the shared
/// favorites and breeds.
fn settled_view(
    view: &ViewHandle,
    filters: &Filters,
    outcome: std::result::Result<DogPage, QueryError>,
) -> SearchView {
    let mut own = lock_view(view).clone();
    own.dispatch(Action::Navigate(filters.clone()));
    own.dispatch(Action::PageSettled {
        filters: filters.clone(),
        outcome,
    });
    own.view()
}

/// Merge a filter change onto the posted query and redirect to the result.
///
/// The page goes back to 1 whenever breed, sort field or direction changes.
pub async fn apply_filters(
    RequireAuth(_user): RequireAuth,
    Form(form): Form<FilterForm>,
) -> Response {
    let current = Filters::from_query(&form.query);
    let next = current.navigate(form.update());
    Redirect::to(&super::search_url(&next)).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_filter_form_ignores_empty_fields() {
        let form = FilterForm {
            query: "page=4&breed=Pug".to_string(),
            breed: Some(String::new()),
            sort: Some("desc".to_string()),
            sort_by: None,
            page: Some("nope".to_string()),
        };
        let update = form.update();
        assert_eq!(update.breed, None);
        assert_eq!(update.sort, Some(SortDirection::Desc));
        assert_eq!(update.page, None);
    }

    #[test]
    fn test_filter_form_breed_change_resets_page() {
        let form = FilterForm {
            query: "page=4&breed=Pug".to_string(),
            breed: Some("Akita".to_string()),
            ..FilterForm::default()
        };
        let next = Filters::from_query(&form.query).navigate(form.update());
        assert_eq!(next.page.get(), 1);
        assert_eq!(next.breed, Breed::Named("Akita".to_string()));
    }

    #[test]
    fn test_pagination_window() {
        let filters = Filters::default().with_page(page(5));
        let pager = Pagination::build(&filters, 20);

        let numbers: Vec<u32> = pager.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![3, 4, 5, 6, 7]);
        assert!(pager.pages.iter().any(|p| p.current && p.number == 5));
        assert_eq!(
            pager.prev.as_deref(),
            Some("/search?page=4&breed=All+breeds&sortBy=breed&sort=asc")
        );
        assert_eq!(
            pager.next.as_deref(),
            Some("/search?page=6&breed=All+breeds&sortBy=breed&sort=asc")
        );
    }

    #[test]
    fn test_pagination_edges() {
        let pager = Pagination::build(&Filters::default(), 2);
        assert!(pager.prev.is_none());
        assert!(pager.next.is_some());
        assert_eq!(pager.pages.len(), 2);

        let pager = Pagination::build(&Filters::default().with_page(page(2)), 2);
        assert!(pager.next.is_none());

        let pager = Pagination::build(&Filters::default(), 1);
        assert!(pager.is_empty());
    }

    #[test]
    fn test_pagination_past_end_links_back() {
        let pager = Pagination::build(&Filters::default().with_page(page(900)), 0);
        assert!(pager.pages.is_empty());
        assert!(pager.prev.is_some());
        assert!(pager.next.is_none());
    }

    #[test]
    fn test_settled_view_shows_own_results_after_newer_navigation() {
        let view: ViewHandle = std::sync::Arc::new(std::sync::Mutex::new(
            dogfinder_core::SearchState::default(),
        ));
        let older = Filters::from_query("breed=Akita");
        let newer = Filters::from_query("breed=Poodle");
        let dog = |breed: &str| dogfinder_core::Dog {
            id: breed.into(),
            img: String::new(),
            name: breed.to_string(),
            age: 1,
            zip_code: "00000".to_string(),
            breed: breed.to_string(),
        };

        {
            let mut state = lock_view(&view);
            state.dispatch(Action::Navigate(older.clone()));
            state.dispatch(Action::Navigate(newer.clone()));
            state.dispatch(Action::PageSettled {
                filters: newer.clone(),
                outcome: Ok(DogPage {
                    dogs: vec![dog("Poodle")],
                    total: 1,
                    total_pages: 1,
                }),
            });
        }

        let own = settled_view(
            &view,
            &older,
            Ok(DogPage {
                dogs: vec![dog("Akita")],
                total: 1,
                total_pages: 1,
            }),
        );
        assert_eq!(own.filters, older);
        assert!(!own.is_loading);
        assert_eq!(own.dogs.len(), 1);
        assert_eq!(own.dogs[0].dog.breed, "Akita");

        // The shared view still belongs to the newer navigation
        let shared = lock_view(&view).view();
        assert_eq!(shared.filters, newer);
        assert_eq!(shared.dogs[0].dog.breed, "Poodle");
    }

    #[test]
    fn test_settled_view_keeps_error_for_own_filters() {
        let view: ViewHandle = std::sync::Arc::new(std::sync::Mutex::new(
            dogfinder_core::SearchState::default(),
        ));
        let filters = Filters::from_query("breed=Akita");
        let own = settled_view(&view, &filters, Err(QueryError::Failed("down".to_string())));
        assert!(own.is_error);
        assert_eq!(own.error.as_deref(), Some("down"));
        assert!(own.dogs.is_empty());
    }

    #[test]
    fn test_favorites_summary_message() {
        assert_eq!(FavoritesSummary::new(1, false).message, "You favorited 1 dog");
        assert_eq!(FavoritesSummary::new(3, false).message, "You favorited 3 dogs");
        assert_eq!(
            FavoritesSummary::new(100, true).message,
            "You favorited the maximum count of 100 dogs"
        );
    }
}
