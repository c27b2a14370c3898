//! Cart scope registry.
//!
//! Each shopping session owns at most one cart scope: an explicit
//! begin/end lifecycle around the in-memory [`Cart`], identified by a UUID
//! stored in the session. The registry evicts scopes that sit idle longer
//! than the configured timeout, which is the same policy the session layer
//! applies to its cookie.
//!
//! Every scope guards its cart with a `Mutex`, so two requests racing on the
//! same session (e.g. a network retry of an add) serialize instead of
//! double-applying. Different sessions never share a scope.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use tamarind_core::ArticleId;

use super::{Cart, CartError};
use crate::models::Article;

/// Upper bound on concurrently live cart scopes.
const MAX_LIVE_SCOPES: u64 = 100_000;

/// Result of removing a line through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Cart contents after the removal (empty if the scope ended).
    pub cart: Cart,
    /// Whether the removal emptied the cart and tore the scope down.
    pub scope_ended: bool,
}

/// Registry of live cart scopes.
#[derive(Clone)]
pub struct CartScopes {
    scopes: Cache<Uuid, Arc<Mutex<Cart>>>,
    idle_timeout: Duration,
}

impl CartScopes {
    /// Create a registry whose scopes expire after `idle_timeout` without
    /// activity.
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        let scopes = Cache::builder()
            .max_capacity(MAX_LIVE_SCOPES)
            .time_to_idle(idle_timeout)
            .build();

        Self {
            scopes,
            idle_timeout,
        }
    }

    /// The configured idle timeout.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Begin a fresh, empty scope and return its ID.
    pub async fn begin(&self) -> Uuid {
        self.begin_with_handle().await.0
    }

    async fn begin_with_handle(&self) -> (Uuid, Arc<Mutex<Cart>>) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Cart::new()));
        self.scopes.insert(id, handle.clone()).await;
        tracing::debug!(scope = %id, "cart scope started");
        (id, handle)
    }

    /// End a scope, discarding its cart.
    pub async fn end(&self, scope_id: Uuid) {
        self.scopes.invalidate(&scope_id).await;
        tracing::debug!(scope = %scope_id, "cart scope ended");
    }

    /// Whether a scope is still live.
    pub async fn is_live(&self, scope_id: Uuid) -> bool {
        self.scopes.contains_key(&scope_id)
    }

    /// The mutex handle for a live scope's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoActiveCart` if the scope ended or expired.
    pub async fn handle(&self, scope_id: Uuid) -> Result<Arc<Mutex<Cart>>, CartError> {
        self.scopes
            .get(&scope_id)
            .await
            .ok_or(CartError::NoActiveCart)
    }

    /// Add one unit of an article, beginning a fresh scope if the session has
    /// none (or its old one expired).
    ///
    /// Returns the scope ID (possibly new) and a snapshot of the cart after
    /// the add.
    pub async fn add_article(&self, scope_id: Option<Uuid>, article: Article) -> (Uuid, Cart) {
        let (scope_id, handle) = self.resolve_or_begin(scope_id).await;

        let mut cart = handle.lock().await;
        cart.add(article);
        (scope_id, cart.clone())
    }

    /// Resolve a live scope, or begin a fresh one when the ID is absent or
    /// expired.
    async fn resolve_or_begin(&self, scope_id: Option<Uuid>) -> (Uuid, Arc<Mutex<Cart>>) {
        if let Some(id) = scope_id
            && let Some(handle) = self.scopes.get(&id).await
        {
            return (id, handle);
        }

        self.begin_with_handle().await
    }

    /// Set the quantity of a line in the session's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoActiveCart` if no scope is live, plus any error
    /// from [`Cart::set_quantity`].
    pub async fn set_quantity(
        &self,
        scope_id: Option<Uuid>,
        article_id: ArticleId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        let handle = self.handle(scope_id.ok_or(CartError::NoActiveCart)?).await?;
        let mut cart = handle.lock().await;
        cart.set_quantity(article_id, quantity)?;
        Ok(cart.clone())
    }

    /// Remove a line from the session's cart.
    ///
    /// An empty cart has no reason to keep session resources alive, so when
    /// the last line goes the whole scope is ended; the next add starts from
    /// a fresh cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoActiveCart` if no scope is live.
    pub async fn remove_article(
        &self,
        scope_id: Option<Uuid>,
        article_id: ArticleId,
    ) -> Result<RemoveOutcome, CartError> {
        let scope_id = scope_id.ok_or(CartError::NoActiveCart)?;
        let handle = self.handle(scope_id).await?;

        let (cart, emptied) = {
            let mut cart = handle.lock().await;
            cart.remove(article_id);
            (cart.clone(), cart.is_empty())
        };

        if emptied {
            self.end(scope_id).await;
        }

        Ok(RemoveOutcome {
            cart,
            scope_ended: emptied,
        })
    }

    /// A snapshot of the session's cart, if a scope is live.
    pub async fn snapshot(&self, scope_id: Option<Uuid>) -> Option<Cart> {
        let handle = self.handle(scope_id?).await.ok()?;
        let cart = handle.lock().await;
        Some(cart.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn article(id: i64, name: &str) -> Article {
        Article::new(ArticleId::new(id), name.to_owned(), Decimal::TEN, true)
    }

    fn scopes() -> CartScopes {
        CartScopes::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_add_begins_a_scope_on_demand() {
        let scopes = scopes();
        let (id, cart) = scopes.add_article(None, article(1, "Tisch")).await;

        assert!(scopes.is_live(id).await);
        assert_eq!(cart.lines().len(), 1);

        // a second add reuses the same scope and merges the line
        let (same_id, cart) = scopes.add_article(Some(id), article(1, "Tisch")).await;
        assert_eq!(same_id, id);
        assert_eq!(cart.lines().first().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_removing_the_last_line_ends_the_scope() {
        let scopes = scopes();
        let (id, _) = scopes.add_article(None, article(1, "Tisch")).await;

        let outcome = scopes
            .remove_article(Some(id), ArticleId::new(1))
            .await
            .unwrap();
        assert!(outcome.scope_ended);
        assert!(outcome.cart.is_empty());
        assert!(!scopes.is_live(id).await);

        // a later add starts over with a fresh scope and an empty cart
        let (fresh_id, cart) = scopes.add_article(Some(id), article(2, "Stuhl")).await;
        assert_ne!(fresh_id, id);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_quantity(), 1);
    }

    #[tokio::test]
    async fn test_removing_one_of_many_lines_keeps_the_scope() {
        let scopes = scopes();
        let (id, _) = scopes.add_article(None, article(1, "Tisch")).await;
        scopes.add_article(Some(id), article(2, "Stuhl")).await;

        let outcome = scopes
            .remove_article(Some(id), ArticleId::new(1))
            .await
            .unwrap();
        assert!(!outcome.scope_ended);
        assert!(scopes.is_live(id).await);
        assert_eq!(outcome.cart.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_without_a_scope_are_rejected() {
        let scopes = scopes();

        let err = scopes
            .set_quantity(None, ArticleId::new(1), 3)
            .await
            .unwrap_err();
        assert_eq!(err, CartError::NoActiveCart);

        let err = scopes
            .remove_article(Some(Uuid::new_v4()), ArticleId::new(1))
            .await
            .unwrap_err();
        assert_eq!(err, CartError::NoActiveCart);

        assert!(scopes.snapshot(None).await.is_none());
    }

    #[tokio::test]
    async fn test_set_quantity_goes_through_the_scope() {
        let scopes = scopes();
        let (id, _) = scopes.add_article(None, article(1, "Tisch")).await;

        let cart = scopes
            .set_quantity(Some(id), ArticleId::new(1), 0)
            .await
            .unwrap();
        assert_eq!(cart.lines().first().unwrap().quantity, 0);

        let err = scopes
            .set_quantity(Some(id), ArticleId::new(1), -1)
            .await
            .unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity(-1));
    }
}
