//! Authentication route handlers for admin.
//!
//! Username and password login for active staff users.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::middleware::auth::LOGIN_PATH;
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Shown for any failed login, whichever check failed.
const LOGIN_FAILED: &str = "Please enter the correct username and password for a staff account. \
                            Note that both fields may be case-sensitive.";

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    username: String,
    error: Option<&'static str>,
}

/// Submitted login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

fn render_login(status: StatusCode, username: String, error: Option<&'static str>) -> Response {
    (status, LoginPageTemplate { username, error }).into_response()
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page(OptionalAdminAuth(admin): OptionalAdminAuth) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    render_login(StatusCode::OK, String::new(), None)
}

/// Check credentials and start a session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(username = %form.username))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let service = AdminAuthService::new(state.pool());

    match service.login(form.username.trim(), &form.password).await {
        Ok(admin) => {
            set_current_admin(&session, &admin)
                .await
                .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
            set_sentry_user(admin.id.as_i32(), &admin.username);
            tracing::info!(user_id = %admin.id, "Admin logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AdminAuthError::InvalidCredentials | AdminAuthError::NotStaff) => {
            tracing::warn!("Rejected admin login");
            Ok(render_login(
                StatusCode::UNAUTHORIZED,
                form.username,
                Some(LOGIN_FAILED),
            ))
        }
        Err(AdminAuthError::Repository(e)) => Err(e.into()),
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    clear_sentry_user();

    Redirect::to(LOGIN_PATH)
}
