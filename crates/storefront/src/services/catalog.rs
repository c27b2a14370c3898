//! Catalog lookups with a read-through cache.
//!
//! Articles change rarely and are read on every cart mutation, so lookups
//! go through a small moka cache with a short TTL.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use tamarind_core::ArticleId;

use crate::db::{ArticleRepository, RepositoryError};
use crate::models::Article;

/// How many articles the lookup cache may hold.
const CACHE_CAPACITY: u64 = 1_024;

/// How long a cached article stays valid.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No article with the given ID.
    #[error("no article with id {0}")]
    NotFound(ArticleId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Read-only catalog access for the storefront.
#[derive(Clone)]
pub struct ArticleCatalog {
    pool: PgPool,
    cache: Cache<ArticleId, Article>,
}

impl ArticleCatalog {
    /// Create a catalog backed by the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self { pool, cache }
    }

    /// Look up one article by ID, serving repeated hits from cache.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no such article exists.
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn lookup(&self, id: ArticleId) -> Result<Article, CatalogError> {
        if let Some(hit) = self.cache.get(&id).await {
            return Ok(hit);
        }

        let article = ArticleRepository::new(&self.pool)
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        self.cache.insert(id, article.clone()).await;
        Ok(article)
    }

    /// List the whole catalog, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Article>, CatalogError> {
        Ok(ArticleRepository::new(&self.pool).list().await?)
    }
}
