//! Business logic services.
//!
//! # Services
//!
//! - `search` - Page, breed and match loads against the dog API
//! - `views` - Per-browser search state registry
//! - `favorites` - Session-backed favorites persistence

pub mod favorites;
pub mod search;
pub mod views;

pub use favorites::FavoritesStorage;
pub use search::{MatchError, Refresh, SearchCoordinator};
pub use views::{ViewHandle, ViewRegistry, lock_view};
