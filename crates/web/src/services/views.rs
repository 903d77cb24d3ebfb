//! Per-browser search state.
//!
//! Each logged-in browser owns one [`SearchState`], addressed by the client id
//! minted at login. Handles idle for an hour are evicted; the next request
//! rebuilds the state from persisted favorites.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dogfinder_core::{Favorites, SearchState};
use moka::sync::Cache;
use uuid::Uuid;

/// Shared handle to one browser's state.
pub type ViewHandle = Arc<Mutex<SearchState>>;

const VIEW_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const MAX_VIEWS: u64 = 10_000;

/// Lock a view, recovering the state if a previous holder panicked.
pub fn lock_view(view: &ViewHandle) -> MutexGuard<'_, SearchState> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry of live views keyed by client id.
#[derive(Clone)]
pub struct ViewRegistry {
    views: Cache<Uuid, ViewHandle>,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            views: Cache::builder()
                .max_capacity(MAX_VIEWS)
                .time_to_idle(VIEW_IDLE_TIMEOUT)
                .build(),
        }
    }

    /// The view for `owner`, created from `favorites` if absent.
    ///
    /// `favorites` is only consulted when the view is created.
    pub fn get_or_create(&self, owner: Uuid, favorites: impl FnOnce() -> Favorites) -> ViewHandle {
        self.views
            .get_with(owner, || Arc::new(Mutex::new(SearchState::new(favorites()))))
    }

    #[must_use]
    pub fn get(&self, owner: &Uuid) -> Option<ViewHandle> {
        self.views.get(owner)
    }

    /// Drop the view for `owner` (logout).
    pub fn remove(&self, owner: &Uuid) {
        self.views.invalidate(owner);
    }
}
