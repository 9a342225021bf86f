//! Authentication extractors for admin.
//!
//! Every model screen takes a [`RequireAdminAuth`]; the login page uses
//! [`OptionalAdminAuth`] to skip the form for users who are already in.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentAdmin, session_keys};

/// Login page path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a logged-in staff user.
///
/// Redirects to the login page when nobody is logged in.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Rejection for [`RequireAdminAuth`].
pub enum AdminAuthRejection {
    /// No session or no logged-in admin.
    RedirectToLogin,
    /// The session layer is missing from the stack.
    MissingSession,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::MissingSession => {
                tracing::error!("Session layer not installed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

async fn session_admin(session: &Session) -> Option<CurrentAdmin> {
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::MissingSession)?;

        let admin = session_admin(session)
            .await
            .ok_or(AdminAuthRejection::RedirectToLogin)?;

        set_sentry_user(admin.id.as_i32(), &admin.username);
        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdminAuth`, this does not reject the request if the admin is not logged in.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session_admin(session).await,
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Reject non-superusers from superuser-only screens.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if `admin` is not a superuser.
pub fn ensure_superuser(admin: &CurrentAdmin, what: &str) -> Result<(), AppError> {
    if admin.is_superuser {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "only superusers can manage {what}"
        )))
    }
}

/// Helper to set the current admin in the session.
///
/// The session ID is cycled first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use eshop_core::UserId;
    use tower_sessions::MemoryStore;

    use super::*;

    fn admin(is_superuser: bool) -> CurrentAdmin {
        CurrentAdmin {
            id: UserId::new(1),
            username: "staff".to_owned(),
            is_superuser,
        }
    }

    #[test]
    fn test_ensure_superuser() {
        assert!(ensure_superuser(&admin(true), "users").is_ok());
        let err = ensure_superuser(&admin(false), "users").unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: only superusers can manage users");
    }

    #[tokio::test]
    async fn test_login_and_logout_round_trip() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        set_current_admin(&session, &admin(false)).await.unwrap();
        let stored = session_admin(&session).await.unwrap();
        assert_eq!(stored.username, "staff");

        clear_current_admin(&session).await.unwrap();
        assert!(session_admin(&session).await.is_none());
    }

    #[test]
    fn test_rejection_redirects_to_login() {
        let response = AdminAuthRejection::RedirectToLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], LOGIN_PATH);
    }
}
