//! Cache types for remote search results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dogfinder_core::{DogPage, Filters};
use moka::Expiry;
use uuid::Uuid;

/// Cache key for pages and breed lists.
///
/// Entries are scoped to one visitor so that a revoked session is noticed on
/// the next miss instead of being hidden behind another visitor's results.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Page { owner: Uuid, filters: Filters },
    Breeds { owner: Uuid },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Page(Arc<DogPage>),
    Breeds(Arc<[String]>),
}

/// Per-kind time to live.
pub struct CacheTtl {
    pub page: Duration,
    pub breeds: Duration,
}

impl Expiry<CacheKey, CacheValue> for CacheTtl {
    fn expire_after_create(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        match key {
            CacheKey::Page { .. } => Some(self.page),
            CacheKey::Breeds { .. } => Some(self.breeds),
        }
    }
}
