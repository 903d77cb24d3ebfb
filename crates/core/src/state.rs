//! Search and favorites state with a guarded reducer.
//!
//! All changes go through [`SearchState::dispatch`], which matches exhaustively
//! on [`Action`] and returns the storage [`Effect`] the caller must perform.
//!
//! # Staleness guard
//!
//! Every [`Action::Navigate`] records the filter tuple the visitor asked for
//! last. A [`Action::PageSettled`] carrying any other tuple is dropped, so the
//! most recently requested tuple wins regardless of arrival order:
//!
//! ```text
//! Navigate(A) -> Navigate(B) -> PageSettled(B) -> PageSettled(A)   (A discarded)
//! ```

use serde::Serialize;

use crate::favorites::{Favorites, FavoritesPolicy, Toggle};
use crate::types::{Dog, DogId, Filters};

/// One settled page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DogPage {
    pub dogs: Vec<Dog>,
    /// Total number of matching dogs across all pages.
    pub total: u32,
    pub total_pages: u32,
}

/// Why a page could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The remote API rejected the session.
    #[error("401 Unauthorized")]
    Unauthorized,
    /// Any other remote or network failure.
    #[error("{0}")]
    Failed(String),
}

/// Lifecycle of the page query: `Idle -> Loading -> {Success | Error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Derived remote-fetch state for the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub status: QueryStatus,
    /// Tuple the `dogs` below belong to.
    pub filters: Option<Filters>,
    pub dogs: Vec<Dog>,
    pub total_pages: u32,
    pub error: Option<QueryError>,
}

/// Every state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The visitor navigated to a new filter tuple.
    Navigate(Filters),
    /// A page load for `filters` finished.
    PageSettled {
        filters: Filters,
        outcome: Result<DogPage, QueryError>,
    },
    BreedsLoaded(Vec<String>),
    ToggleFavorite(DogId),
    ClearFavorites,
    /// Replace favorites wholesale, e.g. after reading them from storage.
    ReplaceFavorites(Favorites),
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The action described a superseded filter tuple and was ignored.
    StaleDiscarded,
    /// Favorites changed; write them to storage.
    PersistFavorites,
    /// Favorites were cleared; delete the stored entry.
    RemovePersistedFavorites,
    /// A favorite could not be added because the set is full.
    FavoritesFull,
}

/// State owned by one visitor's search session.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    favorites: Favorites,
    breeds: Vec<String>,
    desired: Option<Filters>,
    query: QueryState,
}

impl SearchState {
    #[must_use]
    pub fn new(favorites: Favorites) -> Self {
        Self {
            favorites,
            ..Self::default()
        }
    }

    /// Empty state with the given favorites policy.
    #[must_use]
    pub fn with_policy(policy: FavoritesPolicy) -> Self {
        Self::new(Favorites::new(policy))
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) -> Effect {
        match action {
            Action::Navigate(filters) => {
                self.desired = Some(filters);
                self.query.status = QueryStatus::Loading;
                Effect::None
            }
            Action::PageSettled { filters, outcome } => {
                if self.desired.as_ref() != Some(&filters) {
                    return Effect::StaleDiscarded;
                }
                match outcome {
                    Ok(page) => {
                        self.query = QueryState {
                            status: QueryStatus::Success,
                            filters: Some(filters),
                            dogs: page.dogs,
                            total_pages: page.total_pages,
                            error: None,
                        };
                    }
                    Err(error) => {
                        self.query = QueryState {
                            status: QueryStatus::Error,
                            filters: Some(filters),
                            dogs: Vec::new(),
                            total_pages: 0,
                            error: Some(error),
                        };
                    }
                }
                Effect::None
            }
            Action::BreedsLoaded(breeds) => {
                self.breeds = breeds;
                Effect::None
            }
            Action::ToggleFavorite(id) => match self.favorites.toggle(id) {
                Toggle::Added | Toggle::Removed => Effect::PersistFavorites,
                Toggle::AtCapacity => Effect::FavoritesFull,
            },
            Action::ClearFavorites => {
                self.favorites.clear();
                Effect::RemovePersistedFavorites
            }
            Action::ReplaceFavorites(favorites) => {
                self.favorites = favorites;
                Effect::None
            }
        }
    }

    #[must_use]
    pub const fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    #[must_use]
    pub fn breeds(&self) -> &[String] {
        &self.breeds
    }

    /// The most recently requested filter tuple.
    #[must_use]
    pub const fn desired(&self) -> Option<&Filters> {
        self.desired.as_ref()
    }

    #[must_use]
    pub const fn query(&self) -> &QueryState {
        &self.query
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> SearchView {
        let filters = self.desired.clone().unwrap_or_default();
        let dogs = self
            .query
            .dogs
            .iter()
            .map(|dog| FavoriteDog {
                favorite: self.favorites.contains(&dog.id),
                dog: dog.clone(),
            })
            .collect();

        SearchView {
            is_loading: self.query.status == QueryStatus::Loading,
            is_error: self.query.status == QueryStatus::Error,
            is_stale: self.query.filters.as_ref() != Some(&filters),
            status: self.query.status,
            filters,
            dogs,
            total_pages: self.query.total_pages,
            error: self.query.error.as_ref().map(ToString::to_string),
            breeds: self.breeds.clone(),
            favorites_count: self.favorites.len(),
            favorites_full: self.favorites.is_full(),
        }
    }
}

/// A dog paired with its favorite flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteDog {
    pub dog: Dog,
    pub favorite: bool,
}

/// Unified view model handed to templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    /// Filters as last requested (always equal to the URL of the last render).
    pub filters: Filters,
    pub status: QueryStatus,
    pub is_loading: bool,
    pub is_error: bool,
    /// The dogs shown belong to an earlier tuple than `filters`.
    pub is_stale: bool,
    pub dogs: Vec<FavoriteDog>,
    pub total_pages: u32,
    pub error: Option<String>,
    pub breeds: Vec<String>,
    pub favorites_count: usize,
    pub favorites_full: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::types::{Breed, SortDirection, SortField};

    fn dog(id: &str, breed: &str) -> Dog {
        Dog {
            id: DogId::from(id),
            img: format!("https://img.example/{id}.jpg"),
            name: format!("Dog {id}"),
            age: 3,
            zip_code: "10001".to_string(),
            breed: breed.to_string(),
        }
    }

    fn filters(breed: &str) -> Filters {
        Filters {
            breed: Breed::parse(breed),
            ..Filters::default()
        }
    }

    fn page_of(dogs: Vec<Dog>) -> DogPage {
        let total = u32::try_from(dogs.len()).unwrap();
        DogPage {
            dogs,
            total,
            total_pages: 1,
        }
    }

    #[test]
    fn test_navigate_then_settle() {
        let mut state = SearchState::default();
        let a = filters("Poodle");

        assert_eq!(state.dispatch(Action::Navigate(a.clone())), Effect::None);
        assert!(state.view().is_loading);

        let effect = state.dispatch(Action::PageSettled {
            filters: a.clone(),
            outcome: Ok(page_of(vec![dog("1", "Poodle")])),
        });
        assert_eq!(effect, Effect::None);

        let view = state.view();
        assert_eq!(view.status, QueryStatus::Success);
        assert_eq!(view.filters, a);
        assert!(!view.is_stale);
        assert_eq!(view.dogs.len(), 1);
    }

    #[test]
    fn test_late_response_for_superseded_filters_is_discarded() {
        let mut state = SearchState::default();
        let a = filters("Poodle");
        let b = filters("Pug");

        state.dispatch(Action::Navigate(a.clone()));
        state.dispatch(Action::Navigate(b.clone()));

        // B settles first, then A arrives late.
        state.dispatch(Action::PageSettled {
            filters: b.clone(),
            outcome: Ok(page_of(vec![dog("2", "Pug")])),
        });
        let effect = state.dispatch(Action::PageSettled {
            filters: a,
            outcome: Ok(page_of(vec![dog("1", "Poodle")])),
        });

        assert_eq!(effect, Effect::StaleDiscarded);
        let view = state.view();
        assert_eq!(view.filters, b);
        assert_eq!(view.dogs[0].dog.breed, "Pug");
    }

    #[test]
    fn test_stale_error_does_not_clobber_newer_success() {
        let mut state = SearchState::default();
        let a = filters("Poodle");
        let b = filters("Pug");

        state.dispatch(Action::Navigate(a.clone()));
        state.dispatch(Action::Navigate(b.clone()));
        state.dispatch(Action::PageSettled {
            filters: b,
            outcome: Ok(page_of(vec![dog("2", "Pug")])),
        });
        state.dispatch(Action::PageSettled {
            filters: a,
            outcome: Err(QueryError::Unauthorized),
        });

        assert_eq!(state.view().status, QueryStatus::Success);
    }

    #[test]
    fn test_previous_data_kept_while_loading() {
        let mut state = SearchState::default();
        let a = filters("Poodle");
        state.dispatch(Action::Navigate(a.clone()));
        state.dispatch(Action::PageSettled {
            filters: a,
            outcome: Ok(page_of(vec![dog("1", "Poodle")])),
        });

        let next = Filters::default().with_page(NonZeroU32::new(2).unwrap());
        state.dispatch(Action::Navigate(next));

        let view = state.view();
        assert!(view.is_loading);
        assert!(view.is_stale);
        assert_eq!(view.dogs.len(), 1);
    }

    #[test]
    fn test_error_outcome() {
        let mut state = SearchState::default();
        let a = Filters {
            sort: SortDirection::Desc,
            sort_by: SortField::Age,
            ..Filters::default()
        };
        state.dispatch(Action::Navigate(a.clone()));
        state.dispatch(Action::PageSettled {
            filters: a,
            outcome: Err(QueryError::Failed("500".to_string())),
        });

        let view = state.view();
        assert!(view.is_error);
        assert_eq!(view.error.as_deref(), Some("500"));
        assert!(view.dogs.is_empty());
    }

    #[test]
    fn test_toggle_and_clear_effects() {
        let mut state = SearchState::with_policy(FavoritesPolicy::capped(1));

        assert_eq!(
            state.dispatch(Action::ToggleFavorite(DogId::from("a"))),
            Effect::PersistFavorites
        );
        assert_eq!(
            state.dispatch(Action::ToggleFavorite(DogId::from("b"))),
            Effect::FavoritesFull
        );
        assert_eq!(state.favorites().len(), 1);

        assert_eq!(
            state.dispatch(Action::ClearFavorites),
            Effect::RemovePersistedFavorites
        );
        assert!(state.favorites().is_empty());
    }

    #[test]
    fn test_view_marks_favorites() {
        let mut state = SearchState::default();
        let a = filters("Poodle");
        state.dispatch(Action::ToggleFavorite(DogId::from("2")));
        state.dispatch(Action::Navigate(a.clone()));
        state.dispatch(Action::PageSettled {
            filters: a,
            outcome: Ok(page_of(vec![dog("1", "Poodle"), dog("2", "Poodle")])),
        });

        let flags: Vec<bool> = state.view().dogs.iter().map(|d| d.favorite).collect();
        assert_eq!(flags, vec![false, true]);
        assert_eq!(state.view().favorites_count, 1);
    }

    #[test]
    fn test_breeds_loaded() {
        let mut state = SearchState::default();
        state.dispatch(Action::BreedsLoaded(vec!["Akita".to_string()]));
        assert_eq!(state.breeds().to_vec(), vec!["Akita".to_string()]);
    }
}
