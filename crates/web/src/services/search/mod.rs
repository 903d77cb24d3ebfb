//! Search coordinator: turns a filter tuple into rendered results.
//!
//! A page load is two remote steps: an id search for the tuple, then
//! hydration of the returned ids into full records. The breed list is loaded
//! alongside it. Settled results go through the visitor's reducer, which drops
//! anything belonging to a superseded tuple.
//!
//! Pages are cached per visitor and tuple (30 seconds by default), breed lists
//! per visitor (10 minutes). Failures are never cached.

mod cache;

use std::sync::Arc;

use dogfinder_core::{
    Action, Dog, DogPage, Effect, Favorites, Filters, PAGE_SIZE, QueryError, total_pages,
};
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::fetch::{ApiSession, FetchClient, FetchError};
use crate::services::views::{ViewHandle, lock_view};

use cache::{CacheKey, CacheTtl, CacheValue};

/// Maximum cached entries across all visitors.
const CACHE_CAPACITY: u64 = 10_000;

/// Errors from [`SearchCoordinator::request_match`].
#[derive(Debug, Error)]
pub enum MatchError {
    /// There is nothing to match from.
    #[error("Add at least one favorite to find a match.")]
    NoFavorites,

    /// The API answered with an id it then could not hydrate.
    #[error("Matched dog {0} could not be loaded.")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl MatchError {
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Fetch(FetchError::Unauthorized))
    }
}

/// Result of [`SearchCoordinator::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    /// A remote call answered 401.
    pub unauthorized: bool,
    /// A newer navigation superseded this one before it settled.
    pub superseded: bool,
    /// How the page for this refresh's own filters settled, whether or not
    /// the shared view kept it.
    pub outcome: Result<DogPage, QueryError>,
}

/// Coordinates remote loads for search pages, breeds and matches.
#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<SearchCoordinatorInner>,
}

struct SearchCoordinatorInner {
    client: FetchClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl SearchCoordinator {
    /// Create a coordinator over `client` with the given cache lifetimes.
    #[must_use]
    pub fn new(client: FetchClient, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .expire_after(CacheTtl {
                page: config.page_ttl,
                breeds: config.breeds_ttl,
            })
            .build();

        Self {
            inner: Arc::new(SearchCoordinatorInner { client, cache }),
        }
    }

    /// The underlying API client.
    #[must_use]
    pub fn client(&self) -> &FetchClient {
        &self.inner.client
    }

    /// Load one page of dogs for `filters`.
    ///
    /// Hydration is skipped when the id search comes back empty, and a page
    /// lying entirely past the remote result window is answered with an empty
    /// page without any remote call.
    ///
    /// # Errors
    ///
    /// Returns the first failing remote step.
    #[instrument(skip(self, session), fields(owner = %owner, query = %filters.to_query()))]
    pub async fn load_page(
        &self,
        session: &ApiSession,
        owner: Uuid,
        filters: &Filters,
    ) -> Result<Arc<DogPage>, FetchError> {
        let cache_key = CacheKey::Page {
            owner,
            filters: filters.clone(),
        };

        // Check cache
        if let Some(CacheValue::Page(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for page");
            return Ok(page);
        }

        let request = filters.search_request(PAGE_SIZE);
        if request.is_out_of_window() {
            debug!("Page lies past the result window");
            return Ok(Arc::new(DogPage::default()));
        }

        let ids = self.inner.client.search(session, &request).await?;
        let dogs = self.inner.client.dogs(session, &ids.result_ids).await?;

        let page = Arc::new(DogPage {
            dogs,
            total: ids.total,
            total_pages: total_pages(ids.total, PAGE_SIZE),
        });

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Page(Arc::clone(&page)))
            .await;

        Ok(page)
    }

    /// Load the breed catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    #[instrument(skip(self, session), fields(owner = %owner))]
    pub async fn load_breeds(
        &self,
        session: &ApiSession,
        owner: Uuid,
    ) -> Result<Arc<[String]>, FetchError> {
        let cache_key = CacheKey::Breeds { owner };

        if let Some(CacheValue::Breeds(breeds)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for breeds");
            return Ok(breeds);
        }

        let breeds: Arc<[String]> = self.inner.client.breeds(session).await?.into();
        self.inner
            .cache
            .insert(cache_key, CacheValue::Breeds(Arc::clone(&breeds)))
            .await;

        Ok(breeds)
    }

    /// Navigate the visitor's view to `filters` and settle it.
    ///
    /// Runs the page load and the breed load concurrently, then feeds both
    /// outcomes through the reducer. A page result for a tuple the visitor has
    /// since navigated away from is discarded there.
    #[instrument(skip(self, session, view), fields(owner = %owner, query = %filters.to_query()))]
    pub async fn refresh(
        &self,
        session: &ApiSession,
        owner: Uuid,
        view: &ViewHandle,
        filters: Filters,
    ) -> Refresh {
        lock_view(view).dispatch(Action::Navigate(filters.clone()));

        let (page, breeds) = tokio::join!(
            self.load_page(session, owner, &filters),
            self.load_breeds(session, owner),
        );

        let mut unauthorized = false;
        let mut state = lock_view(view);

        match breeds {
            Ok(breeds) => {
                state.dispatch(Action::BreedsLoaded(breeds.to_vec()));
            }
            Err(err) => {
                unauthorized |= err.is_unauthorized();
                warn!(error = %err, "Failed to load breeds");
            }
        }

        let outcome = match page {
            Ok(page) => Ok(DogPage::clone(&page)),
            Err(err) => {
                unauthorized |= err.is_unauthorized();
                Err(QueryError::from(err))
            }
        };

        let effect = state.dispatch(Action::PageSettled {
            filters,
            outcome: outcome.clone(),
        });
        let superseded = effect == Effect::StaleDiscarded;
        if superseded {
            debug!("Discarded result for superseded filters");
        }

        Refresh {
            unauthorized,
            superseded,
            outcome,
        }
    }

    /// Ask for a match among `favorites` and load the matched dog.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NoFavorites`] without calling the API when the
    /// set is empty, or the first failing remote step.
    #[instrument(skip(self, session, favorites), fields(count = favorites.len()))]
    pub async fn request_match(
        &self,
        session: &ApiSession,
        favorites: &Favorites,
    ) -> Result<Dog, MatchError> {
        if favorites.is_empty() {
            return Err(MatchError::NoFavorites);
        }

        let id = self
            .inner
            .client
            .match_dog(session, &favorites.to_vec())
            .await?;
        let dogs = self
            .inner
            .client
            .dogs(session, std::slice::from_ref(&id))
            .await?;

        dogs.into_iter()
            .find(|dog| dog.id == id)
            .ok_or_else(|| MatchError::NotFound(id.into_inner()))
    }
}
