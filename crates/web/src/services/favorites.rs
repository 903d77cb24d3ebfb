//! Persistent favorites storage.
//!
//! Favorites live in the browser's session under one key holding the JSON
//! object `{"<id>": true, ...}`. They survive reloads and re-logins within the
//! same browser session, and are removed on clear and logout.

use dogfinder_core::{Favorites, FavoritesPolicy};
use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;

/// Favorites persisted in a session.
pub struct FavoritesStorage<'a> {
    session: &'a Session,
    policy: FavoritesPolicy,
}

impl<'a> FavoritesStorage<'a> {
    #[must_use]
    pub const fn new(session: &'a Session, policy: FavoritesPolicy) -> Self {
        Self { session, policy }
    }

    /// Read the stored favorites, or an empty set if none are stored.
    ///
    /// A corrupt entry is logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(&self) -> Result<Favorites, tower_sessions::session::Error> {
        let stored: Option<String> = self.session.get(session_keys::FAVORITES).await?;
        let Some(json) = stored else {
            return Ok(Favorites::new(self.policy));
        };

        Ok(Favorites::from_json(&json, self.policy).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable stored favorites");
            Favorites::new(self.policy)
        }))
    }

    /// Overwrite the stored favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save(&self, favorites: &Favorites) -> Result<(), tower_sessions::session::Error> {
        self.session
            .insert(session_keys::FAVORITES, favorites.to_json())
            .await
    }

    /// Delete the stored entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn remove(&self) -> Result<(), tower_sessions::session::Error> {
        self.session
            .remove::<String>(session_keys::FAVORITES)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use dogfinder_core::DogId;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_load_empty_when_nothing_stored() {
        let session = session();
        let storage = FavoritesStorage::new(&session, FavoritesPolicy::default());
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let session = session();
        let storage = FavoritesStorage::new(&session, FavoritesPolicy::default());

        let mut favorites = Favorites::new(FavoritesPolicy::default());
        favorites.toggle(DogId::from("a"));
        favorites.toggle(DogId::from("b"));
        storage.save(&favorites).await.unwrap();

        let raw: Option<String> = session.get(session_keys::FAVORITES).await.unwrap();
        assert_eq!(raw.as_deref(), Some(r#"{"a":true,"b":true}"#));
        assert_eq!(storage.load().await.unwrap(), favorites);
    }

    #[tokio::test]
    async fn test_remove_deletes_entry() {
        let session = session();
        let storage = FavoritesStorage::new(&session, FavoritesPolicy::default());

        let mut favorites = Favorites::new(FavoritesPolicy::default());
        favorites.toggle(DogId::from("a"));
        storage.save(&favorites).await.unwrap();
        storage.remove().await.unwrap();

        let raw: Option<String> = session.get(session_keys::FAVORITES).await.unwrap();
        assert!(raw.is_none());
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_loads_empty() {
        let session = session();
        session
            .insert(session_keys::FAVORITES, "not json".to_string())
            .await
            .unwrap();

        let storage = FavoritesStorage::new(&session, FavoritesPolicy::default());
        assert!(storage.load().await.unwrap().is_empty());
    }
}
