//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Security headers (CSP, frame and referrer policy)

pub mod auth;
pub mod notice;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use notice::{TakeNotice, set_notice};
pub use request_id::request_id_middleware;
pub use security_headers::{content_security_policy, security_headers_middleware};
pub use session::create_session_layer;
