//! Article repository for catalog lookups.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::ArticleId;

use super::RepositoryError;
use crate::models::Article;

/// Raw article row as stored in the database.
#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    name: String,
    price: Decimal,
    in_stock: bool,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self::new(ArticleId::new(row.id), row.name, row.price, row.in_stock)
    }
}

/// Repository for read-only article access.
pub struct ArticleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ArticleRepository<'a> {
    /// Create a new article repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an article by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>, RepositoryError> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r"
            SELECT id, name, price, in_stock
            FROM article
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Article::from))
    }

    /// List all articles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Article>, RepositoryError> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r"
            SELECT id, name, price, in_stock
            FROM article
            ORDER BY id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }
}
