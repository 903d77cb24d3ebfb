//! Domain models for the web app.

pub mod session;

pub use session::{CurrentUser, Notice, NoticeLevel, keys as session_keys};
