//! Core types for Dogfinder.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the web layer and the tests.

pub mod dog;
pub mod email;
pub mod filters;
pub mod login;
pub mod pagination;

pub use dog::{Dog, DogId};
pub use email::{Email, EmailError};
pub use filters::{ALL_BREEDS, Breed, FilterUpdate, Filters, SearchRequest, SortDirection, SortField};
pub use login::{Credentials, FieldErrors, LoginName, LoginNameError};
pub use pagination::{MAX_RESULT_WINDOW, PAGE_SIZE, total_pages};
