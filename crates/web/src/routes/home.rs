//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Name of the logged-in visitor, if any.
    pub user_name: Option<String>,
    /// Where the "start searching" link points.
    pub search_href: String,
}

/// Display the home page.
pub async fn home(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        user_name: user.map(|user| user.name),
        search_href: super::search_url(&dogfinder_core::Filters::default()),
    }
}
