//! Dashboard route handler.

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::AppError, filters, middleware::RequireAdminAuth, registry, routes::PageContext,
    state::AppState,
};

/// One registered model on the dashboard.
#[derive(Debug, Clone)]
pub struct ModelCard {
    pub name: &'static str,
    pub url: String,
    pub add_url: String,
    pub count: i64,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub models: Vec<ModelCard>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Dashboard page handler.
#[instrument(skip(admin, state, session))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let models = registry::counts(state.pool(), admin.is_superuser)
        .await?
        .into_iter()
        .map(|c| ModelCard {
            name: c.meta.verbose_name_plural,
            url: c.meta.url(),
            add_url: format!("{}/new", c.meta.url()),
            count: c.count,
        })
        .collect();

    let template = DashboardTemplate {
        page: PageContext::load(&admin, &session, "/").await,
        models,
    };

    Ok(Html(template.render()?))
}
