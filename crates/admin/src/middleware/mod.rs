//! HTTP middleware for admin.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry hub and HTTP transaction
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Security headers
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler through the extractors in
//! [`auth`], not by a guard layer.

pub mod auth;
pub mod session;

use axum::http::{HeaderName, HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, ensure_superuser, set_current_admin,
};
pub use session::{create_session_layer, push_flash, take_flashes};

/// Headers added to every response.
pub const SECURITY_HEADERS: [(HeaderName, &str); 4] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "same-origin"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'self'; img-src 'self' data:; style-src 'self'; script-src 'none'",
    ),
];

/// One `SetResponseHeaderLayer` per security header.
pub fn security_header_layers() -> impl Iterator<Item = SetResponseHeaderLayer<HeaderValue>> {
    SECURITY_HEADERS.into_iter().map(|(name, value)| {
        SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_security_headers_are_added() {
        let mut app = Router::new().route("/", get(|| async { "ok" }));
        for layer in security_header_layers() {
            app = app.layer(layer);
        }

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        for (name, value) in SECURITY_HEADERS {
            assert_eq!(response.headers().get(&name).unwrap(), value);
        }
    }
}
