//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /auth/login               - Login page
//! POST /auth/login               - Username + password login (staff only)
//! POST /auth/logout              - Logout
//!
//! GET  /                         - Dashboard: registered models and row counts
//!
//! # Per registered model (see `registry::REGISTERED`)
//! GET  /{model}                  - List
//! GET  /{model}/new              - Create form
//! POST /{model}                  - Create
//! GET  /{model}/{id}/edit        - Edit form
//! POST /{model}/{id}             - Update
//! GET  /{model}/{id}/delete      - Delete confirmation
//! POST /{model}/{id}/delete      - Delete (cascades)
//! ```
//!
//! `/health`, `/health/ready`, `/static` and `/media` are mounted in `main`.

pub mod auth;
pub mod dashboard;
pub mod models;

use axum::Router;
use tower_sessions::Session;

use crate::middleware::take_flashes;
use crate::models::CurrentAdmin;
use crate::registry::{self, REGISTERED};
use crate::state::AppState;

/// Logged-in user as shown in the page header.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub username: String,
    pub is_superuser: bool,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            username: admin.username.clone(),
            is_superuser: admin.is_superuser,
        }
    }
}

/// Sidebar link to a model's list screen.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub label: &'static str,
    pub url: String,
    pub active: bool,
}

/// Flash message ready for rendering.
#[derive(Debug, Clone)]
pub struct FlashView {
    pub class: &'static str,
    pub message: String,
}

/// Data every authenticated page passes to `base.html`.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub nav: Vec<NavItem>,
    pub flashes: Vec<FlashView>,
}

impl PageContext {
    /// Build the page chrome and consume pending flash messages.
    pub async fn load(admin: &CurrentAdmin, session: &Session, current_path: impl Into<String>) -> Self {
        let flashes = take_flashes(session)
            .await
            .into_iter()
            .map(|f| FlashView {
                class: f.level.as_str(),
                message: f.message,
            })
            .collect();
        Self::new(admin, current_path.into(), flashes)
    }

    fn new(admin: &CurrentAdmin, current_path: String, flashes: Vec<FlashView>) -> Self {
        let nav = REGISTERED
            .iter()
            .filter(|r| r.visible_to(admin.is_superuser))
            .map(|r| {
                let url = r.meta.url();
                NavItem {
                    label: r.meta.verbose_name_plural,
                    active: current_path == url || current_path.starts_with(&format!("{url}/")),
                    url,
                }
            })
            .collect();

        Self {
            admin_user: admin.into(),
            current_path,
            nav,
            flashes,
        }
    }
}

/// Build the admin router (everything except health, static and media).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(registry::routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use eshop_core::UserId;
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use crate::config::AdminConfig;

    use super::*;

    /// The full admin router over an in-memory session store. The pool never
    /// connects; these requests do not reach the database.
    fn app() -> Router {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/eshop_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_owned(),
            session_secret: SecretString::from("k".repeat(64)),
            media_root: PathBuf::from("media"),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/eshop_test")
            .unwrap();

        routes()
            .layer(SessionManagerLayer::new(MemoryStore::default()))
            .with_state(AppState::new(config, pool))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_model_screens_redirect_to_login() {
        for uri in ["/", "/product", "/category/new", "/user/1/edit", "/order/1/delete"] {
            let response = app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(
                response.headers().get(header::LOCATION).unwrap(),
                crate::middleware::auth::LOGIN_PATH
            );
        }
    }

    #[tokio::test]
    async fn test_login_page_renders() {
        let response = app().oneshot(get("/auth/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"name="username""#));
        assert!(html.contains(r#"action="/auth/login""#));
    }

    #[tokio::test]
    async fn test_unknown_model_is_not_routed() {
        let response = app().oneshot(get("/group")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn admin(is_superuser: bool) -> CurrentAdmin {
        CurrentAdmin {
            id: UserId::new(7),
            username: "staff".to_owned(),
            is_superuser,
        }
    }

    #[test]
    fn test_nav_hides_users_from_staff() {
        let page = PageContext::new(&admin(false), "/".to_owned(), Vec::new());
        assert!(page.nav.iter().all(|item| item.url != "/user"));
        assert_eq!(page.nav.len(), REGISTERED.len() - 1);

        let page = PageContext::new(&admin(true), "/".to_owned(), Vec::new());
        assert_eq!(page.nav.first().map(|i| i.label), Some("Users"));
    }

    #[test]
    fn test_nav_marks_active_model() {
        let page = PageContext::new(&admin(true), "/product/3/edit".to_owned(), Vec::new());
        let active: Vec<_> = page
            .nav
            .iter()
            .filter(|item| item.active)
            .map(|item| item.url.as_str())
            .collect();
        // `/productimages` shares a prefix but is a different model.
        assert_eq!(active, ["/product"]);
    }
}
