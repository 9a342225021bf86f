//! Session middleware configuration for admin.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions with
//! strict cookie settings (SameSite=Strict, 24hr inactivity expiry, signed
//! with `ADMIN_SESSION_SECRET`), plus helpers for one-shot flash messages.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;
use crate::models::{Flash, session_keys};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "eshop_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// The session store or signing key could not be set up.
#[derive(Debug, Error)]
#[error("invalid session setting: {0}")]
pub struct SessionSetupError(String);

/// Create the session layer with `PostgreSQL` store.
///
/// The `admin.session` table is created by the admin migrations.
///
/// # Errors
///
/// Returns `SessionSetupError` if the store rejects the schema or table name,
/// or the secret is too short for a signing key.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, SessionSetupError> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .map_err(SessionSetupError)?
        .with_table_name("session")
        .map_err(SessionSetupError)?;
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())
        .map_err(|e| SessionSetupError(e.to_string()))?;

    Ok(SessionManagerLayer::new(store)
        .with_signed(key)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/"))
}

/// Queue a message for the next rendered page.
///
/// Failures are logged and otherwise ignored; a lost flash message must not
/// fail the request that produced it.
pub async fn push_flash(session: &Session, flash: Flash) {
    let mut pending: Vec<Flash> = session
        .get(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(flash);

    if let Err(e) = session.insert(session_keys::FLASH, pending).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return all pending flash messages.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(session_keys::FLASH).await {
        Ok(pending) => pending.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push_flash(&session, Flash::success("Saved")).await;
        push_flash(&session, Flash::error("Oops")).await;

        let flashes = take_flashes(&session).await;
        assert_eq!(flashes, [Flash::success("Saved"), Flash::error("Oops")]);
        assert!(take_flashes(&session).await.is_empty());
    }
}
