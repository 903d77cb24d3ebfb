//! Authentication route handlers.
//!
//! Login validates the form locally, then exchanges name and email for a dog
//! API session cookie. Logout ends the remote session and discards everything
//! stored for the browser, favorites included.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use dogfinder_core::{Credentials, FieldErrors, Filters};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, TakeNotice, set_current_user};
use crate::models::{CurrentUser, Notice};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub notice: Option<Notice>,
    pub name: String,
    pub email: String,
    pub name_error: Option<String>,
    pub email_error: Option<String>,
}

impl LoginTemplate {
    fn new(notice: Option<Notice>, form: LoginForm, errors: FieldErrors) -> Self {
        Self {
            notice,
            name: form.name,
            email: form.email,
            name_error: errors.name,
            email_error: errors.email,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(TakeNotice(notice): TakeNotice) -> impl IntoResponse {
    LoginTemplate::new(notice, LoginForm::default(), FieldErrors::default())
}

/// Handle login form submission.
///
/// Invalid fields are reported inline and nothing is sent to the dog API.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let credentials = match Credentials::parse(&form.name, &form.email) {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page = LoginTemplate::new(None, form, errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let api_session = match state.api().login(&credentials).await {
        Ok(api_session) => api_session,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let page = LoginTemplate::new(
                Some(Notice::error("Login failed. Please try again.")),
                form,
                FieldErrors::default(),
            );
            return Ok((StatusCode::BAD_GATEWAY, page).into_response());
        }
    };

    let user = CurrentUser::new(
        credentials.name.to_string(),
        credentials.email.to_string(),
        &api_session,
    );
    set_current_user(&session, &user).await?;
    set_sentry_user(&user.name, &user.email);
    add_breadcrumb("auth", "Logged in", None);
    tracing::info!(client_id = %user.client_id, "Visitor logged in");

    Ok(Redirect::to(&super::search_url(&Filters::default())).into_response())
}

/// Handle logout.
///
/// The remote logout is best effort; the local session is always destroyed.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if let Some(user) = user {
        if let Err(e) = state.api().logout(&user.api_session()).await {
            tracing::warn!(error = %e, "Failed to end dog API session");
        }
        state.views().remove(&user.client_id);
    }

    // Destroys the login and the stored favorites together
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    Redirect::to("/login").into_response()
}
