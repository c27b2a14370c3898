//! Article route handlers.
//!
//! Read-only catalog access; no authentication required for browsing.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use tamarind_core::ArticleId;

use crate::error::Result;
use crate::models::Article;
use crate::state::AppState;

/// List the catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Article>>> {
    let articles = state.catalog().list().await?;
    Ok(Json(articles))
}

/// One article by ID.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
) -> Result<Json<Article>> {
    let article = state.catalog().lookup(id).await?;
    Ok(Json(article))
}
