//! Dogfinder Core - Shared types and search state.
//!
//! This crate provides the pieces of Dogfinder that do not touch the network:
//! - `web` - Server-rendered search and favorites site
//! - `integration-tests` - End-to-end tests against a fake dog API
//!
//! # Architecture
//!
//! The core crate contains only types, pure logic and the search reducer - no I/O,
//! no HTTP clients, no session storage. Callers perform the side effects the
//! reducer asks for.
//!
//! # Modules
//!
//! - [`types`] - Dog records, ids, login validation and the URL filter contract
//! - [`favorites`] - The capped favorites set and its persisted JSON shape
//! - [`state`] - Search/favorites state, actions and the guarded reducer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod favorites;
pub mod state;
pub mod types;

pub use favorites::{Favorites, FavoritesPolicy, Toggle};
pub use state::{
    Action, DogPage, Effect, FavoriteDog, QueryError, QueryState, QueryStatus, SearchState,
    SearchView,
};
pub use types::*;
