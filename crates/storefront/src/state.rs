//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::cart::CartScopes;
use crate::services::catalog::ArticleCatalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: ArticleCatalog,
    carts: CartScopes,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = ArticleCatalog::new(pool.clone());
        let carts = CartScopes::new(config.session_idle_timeout());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                carts,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the article catalog.
    #[must_use]
    pub fn catalog(&self) -> &ArticleCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the cart scope registry.
    #[must_use]
    pub fn carts(&self) -> &CartScopes {
        &self.inner.carts
    }
}
