//! The favorites set.
//!
//! Favorites are dog ids the visitor marked for matching. The set is capped
//! (100 by default) and persisted as a JSON object mapping each id to `true`:
//!
//! ```json
//! { "NXGFTIcBOvEgQ5OCx8A1": true, "OHGFTIcBOvEgQ5OCx8A3": true }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::DogId;

/// Default maximum number of favorites.
pub const DEFAULT_FAVORITES_CAP: usize = 100;

/// How many favorites a visitor may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesPolicy {
    /// `None` means unbounded.
    pub cap: Option<usize>,
}

impl Default for FavoritesPolicy {
    fn default() -> Self {
        Self {
            cap: Some(DEFAULT_FAVORITES_CAP),
        }
    }
}

impl FavoritesPolicy {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { cap: None }
    }

    #[must_use]
    pub const fn capped(cap: usize) -> Self {
        Self { cap: Some(cap) }
    }
}

/// Result of [`Favorites::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// The id was absent and the set is full; nothing changed.
    AtCapacity,
}

/// A capped set of favorite dog ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: BTreeSet<DogId>,
    policy: FavoritesPolicy,
}

impl Favorites {
    #[must_use]
    pub fn new(policy: FavoritesPolicy) -> Self {
        Self {
            ids: BTreeSet::new(),
            policy,
        }
    }

    /// Load favorites from their persisted JSON object.
    ///
    /// Entries whose value is not `true` are ignored. If the stored set is
    /// larger than the cap, only the first `cap` ids (in id order) are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a JSON object.
    pub fn from_json(json: &str, policy: FavoritesPolicy) -> Result<Self, serde_json::Error> {
        let stored: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let limit = policy.cap.unwrap_or(usize::MAX);
        let ids = stored
            .into_iter()
            .filter(|(_, value)| value.as_bool() == Some(true))
            .map(|(id, _)| DogId::from(id))
            .take(limit)
            .collect();
        Ok(Self { ids, policy })
    }

    /// The persisted JSON object for this set.
    #[must_use]
    pub fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .ids
            .iter()
            .map(|id| (id.to_string(), serde_json::Value::Bool(true)))
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    /// Flip membership of `id`.
    ///
    /// Removing is always allowed; adding is a no-op when the set is full.
    pub fn toggle(&mut self, id: DogId) -> Toggle {
        if self.ids.remove(&id) {
            return Toggle::Removed;
        }
        if self.is_full() {
            return Toggle::AtCapacity;
        }
        self.ids.insert(id);
        Toggle::Added
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &DogId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.policy.cap.is_some_and(|cap| self.ids.len() >= cap)
    }

    #[must_use]
    pub const fn policy(&self) -> FavoritesPolicy {
        self.policy
    }

    pub fn ids(&self) -> impl Iterator<Item = &DogId> {
        self.ids.iter()
    }

    /// Owned copy of the ids, as sent to `/dogs/match`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<DogId> {
        self.ids.iter().cloned().collect()
    }
}
