//! Order assembly: turning a validated cart into a persisted order.
//!
//! The workflow is deliberately strict about its side effects:
//!
//! 1. snapshot the cart's non-zero lines (pure),
//! 2. validate (an all-zero or missing cart fails here, cart untouched),
//! 3. check ownership of the target customer identity,
//! 4. end the cart scope, exactly once, before the persistence attempt, so
//!    a failed persist cannot leave a resubmittable cart behind,
//! 5. persist order + customer association as one transaction, with an
//!    optimistic version check on the customer row.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::RepositoryError;
use crate::db::customers::CustomerRepository;
use crate::models::{Order, OrderLine, Principal};
use crate::services::authz::{self, AuthzError};
use crate::services::cart::{Cart, CartScopes};

/// Errors from order assembly.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The session has no live cart scope to order from.
    #[error("no active cart")]
    NoActiveCart,

    /// Every line in the cart has quantity 0.
    #[error("cart has no lines with quantity > 0")]
    EmptyCart,

    /// The caller does not own the target customer identity.
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// The customer record vanished between login and checkout. A
    /// data-integrity failure, not a user error; never retried silently.
    #[error("no customer record for {0:?}")]
    CustomerGone(String),

    /// Another writer updated the customer aggregate first; the caller may
    /// retry once with freshly loaded state.
    #[error("customer record was modified concurrently")]
    Conflict,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Snapshot a cart's orderable lines.
///
/// Lines with quantity 0 are skipped; the result holds frozen copies with no
/// reference back into the cart.
#[must_use]
pub fn snapshot_lines(cart: &Cart) -> Vec<OrderLine> {
    cart.lines()
        .iter()
        .filter(|line| line.quantity > 0)
        .map(|line| OrderLine {
            article_id: line.article.id,
            article_name: line.article.name.clone(),
            unit_price: line.article.price.amount,
            quantity: line.quantity,
        })
        .collect()
}

/// Sum of `unit_price * quantity` across the given lines.
#[must_use]
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(OrderLine::line_total).sum()
}

/// Order assembly service.
pub struct OrderService<'a> {
    customers: CustomerRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
        }
    }

    /// Assemble and persist an order from the session's cart.
    ///
    /// `username` names the customer the order is placed for; the principal
    /// must own that identity (or hold a staff role).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NoActiveCart` / `OrderError::EmptyCart` when
    /// there is nothing orderable (the cart, if any, is left untouched).
    /// Returns `OrderError::Forbidden` when the ownership check fails.
    /// Returns `OrderError::CustomerGone` when no customer row matches.
    /// Returns `OrderError::Conflict` when the customer aggregate changed
    /// concurrently.
    pub async fn place_order(
        &self,
        carts: &CartScopes,
        scope_id: Option<Uuid>,
        principal: &Principal,
        username: &str,
    ) -> Result<Order, OrderError> {
        let scope_id = scope_id.ok_or(OrderError::NoActiveCart)?;
        let handle = carts
            .handle(scope_id)
            .await
            .map_err(|_| OrderError::NoActiveCart)?;

        let lines = {
            let cart = handle.lock().await;
            snapshot_lines(&cart)
        };
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        authz::require_same_user(principal, username)?;

        // Point of no return for the cart: validation passed, so the scope
        // ends here no matter how persistence goes.
        carts.end(scope_id).await;

        // The relationship is bidirectional, so the aggregate is loaded with
        // its existing orders before the new one is attached.
        let customer = self
            .customers
            .get_with_orders(username)
            .await?
            .ok_or_else(|| OrderError::CustomerGone(username.to_owned()))?;

        let total = order_total(&lines);
        let order = self
            .customers
            .create_order(&customer, &lines, total)
            .await
            .map_err(|e| match e {
                RepositoryError::StaleVersion => OrderError::Conflict,
                RepositoryError::NotFound => OrderError::CustomerGone(username.to_owned()),
                other => OrderError::Repository(other),
            })?;

        tracing::info!(
            order = %order.id,
            customer = %order.customer_id,
            lines = order.lines.len(),
            %total,
            "order placed"
        );

        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tamarind_core::ArticleId;

    use crate::models::Article;

    fn article(id: i64, name: &str, cents: i64) -> Article {
        Article::new(
            ArticleId::new(id),
            name.to_owned(),
            Decimal::new(cents, 2),
            true,
        )
    }

    #[test]
    fn test_snapshot_skips_zero_quantity_lines() {
        let mut cart = Cart::new();
        cart.add(article(1, "Tisch", 10900));
        cart.add(article(2, "Stuhl", 4900));
        cart.set_quantity(ArticleId::new(1), 0).unwrap();

        let lines = snapshot_lines(&cart);
        assert_eq!(lines.len(), 1);
        let line = lines.first().unwrap();
        assert_eq!(line.article_id, ArticleId::new(2));
        assert_eq!(line.article_name, "Stuhl");
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_snapshot_never_yields_nonpositive_quantities() {
        let mut cart = Cart::new();
        for id in 1..=5 {
            cart.add(article(id, "x", 100));
        }
        cart.set_quantity(ArticleId::new(2), 0).unwrap();
        cart.set_quantity(ArticleId::new(4), 0).unwrap();

        assert!(snapshot_lines(&cart).iter().all(|l| l.quantity > 0));
    }

    #[test]
    fn test_snapshot_of_all_zero_cart_is_empty() {
        let mut cart = Cart::new();
        cart.add(article(1, "Tisch", 10900));
        cart.set_quantity(ArticleId::new(1), 0).unwrap();

        assert!(snapshot_lines(&cart).is_empty());
    }

    #[test]
    fn test_order_total_sums_line_totals() {
        let mut cart = Cart::new();
        cart.add(article(1, "Tisch", 10900));
        cart.add(article(2, "Stuhl", 4900));
        cart.add(article(2, "Stuhl", 4900));

        let lines = snapshot_lines(&cart);
        // 109.00 + 2 * 49.00
        assert_eq!(order_total(&lines), Decimal::new(20700, 2));
    }

    #[test]
    fn test_snapshot_is_detached_from_the_cart() {
        let mut cart = Cart::new();
        cart.add(article(1, "Tisch", 10900));
        let lines = snapshot_lines(&cart);

        cart.set_quantity(ArticleId::new(1), 7).unwrap();
        assert_eq!(lines.first().unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_checkout_scenario_through_the_scope_registry() {
        use std::time::Duration;

        let scopes = CartScopes::new(Duration::from_secs(60));

        // add A, add A again, add B
        let (scope_id, cart) = scopes.add_article(None, article(1, "Tisch", 10900)).await;
        assert_eq!(cart.lines().len(), 1);
        let (_, cart) = scopes
            .add_article(Some(scope_id), article(1, "Tisch", 10900))
            .await;
        assert_eq!(cart.lines().first().unwrap().quantity, 2);
        let (_, cart) = scopes
            .add_article(Some(scope_id), article(2, "Stuhl", 4900))
            .await;
        assert_eq!(cart.lines().len(), 2);

        // zero out A; the order snapshot holds exactly one line, for B
        let cart = scopes
            .set_quantity(Some(scope_id), ArticleId::new(1), 0)
            .await
            .unwrap();
        let lines = snapshot_lines(&cart);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().article_id, ArticleId::new(2));

        // what place_order does after validation: the scope ends, once
        scopes.end(scope_id).await;
        assert!(!scopes.is_live(scope_id).await);
    }

    #[tokio::test]
    async fn test_all_zero_cart_fails_validation_and_keeps_the_scope() {
        use std::time::Duration;

        let scopes = CartScopes::new(Duration::from_secs(60));
        let (scope_id, _) = scopes.add_article(None, article(1, "Tisch", 10900)).await;
        scopes
            .set_quantity(Some(scope_id), ArticleId::new(1), 0)
            .await
            .unwrap();

        // place_order bails out before touching the scope in this case
        let cart = scopes.snapshot(Some(scope_id)).await.unwrap();
        assert!(snapshot_lines(&cart).is_empty());
        assert!(scopes.is_live(scope_id).await);
    }

    #[tokio::test]
    async fn test_place_order_fails_fast_without_touching_the_database() {
        use std::collections::BTreeSet;
        use std::time::Duration;

        use tamarind_core::Role;

        // A lazy pool never opens a connection; every path below must fail
        // before the first query runs.
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let service = OrderService::new(&pool);
        let scopes = CartScopes::new(Duration::from_secs(60));
        let shopper = Principal::new("102", BTreeSet::from([Role::Customer]));

        // no scope at all
        let err = service
            .place_order(&scopes, None, &shopper, "102")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NoActiveCart));

        // all-zero cart: validation fails, no order, scope stays alive
        let (scope_id, _) = scopes.add_article(None, article(1, "Tisch", 10900)).await;
        scopes
            .set_quantity(Some(scope_id), ArticleId::new(1), 0)
            .await
            .unwrap();
        let err = service
            .place_order(&scopes, Some(scope_id), &shopper, "102")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
        assert!(scopes.is_live(scope_id).await);

        // someone else's identity: denied, scope stays alive
        scopes
            .set_quantity(Some(scope_id), ArticleId::new(1), 2)
            .await
            .unwrap();
        let err = service
            .place_order(&scopes, Some(scope_id), &shopper, "105")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Forbidden(_)));
        assert!(scopes.is_live(scope_id).await);
    }
}
