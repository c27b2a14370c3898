//! Order repository for reading persisted orders.
//!
//! Order *creation* lives in [`super::customers::CustomerRepository`] because
//! attaching an order is a mutation of the customer aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::{ArticleId, CustomerId, OrderId};

use super::RepositoryError;
use crate::models::{Order, OrderLine};

/// Raw order row as stored in the database.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    pub id: i64,
    pub customer_id: i64,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

/// Raw order line row as stored in the database.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderLineRow {
    pub order_id: i64,
    pub article_id: i64,
    pub article_name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
}

impl OrderLineRow {
    pub(crate) fn into_line(self) -> Result<OrderLine, RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order {} has a line with quantity {}",
                self.order_id, self.quantity
            ))
        })?;
        Ok(OrderLine {
            article_id: ArticleId::new(self.article_id),
            article_name: self.article_name,
            unit_price: self.unit_price,
            quantity,
        })
    }
}

/// Assemble domain orders from their rows plus the matching line rows.
pub(crate) fn assemble_orders(
    orders: Vec<OrderRow>,
    lines: Vec<OrderLineRow>,
) -> Result<Vec<Order>, RepositoryError> {
    let mut assembled: Vec<Order> = orders
        .into_iter()
        .map(|row| Order {
            id: OrderId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            lines: Vec::new(),
            total: row.total,
            created_at: row.created_at,
            version: row.version,
        })
        .collect();

    for line_row in lines {
        let order_id = OrderId::new(line_row.order_id);
        let line = line_row.into_line()?;
        if let Some(order) = assembled.iter_mut().find(|o| o.id == order_id) {
            order.lines.push(line);
        }
    }

    Ok(assembled)
}

/// Repository for order reads.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order with its lines by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored line is invalid.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, total, created_at, version
            FROM shop_order
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT order_id, article_id, article_name, unit_price, quantity
            FROM order_line
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let mut orders = assemble_orders(vec![row], lines)?;
        Ok(orders.pop())
    }

    /// List a customer's orders, newest first, with lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored line is invalid.
    pub async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, total, created_at, version
            FROM shop_order
            WHERE customer_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT l.order_id, l.article_id, l.article_name, l.unit_price, l.quantity
            FROM order_line l
            JOIN shop_order o ON o.id = l.order_id
            WHERE o.customer_id = $1
            ORDER BY l.id
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        assemble_orders(orders, lines)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_row(id: i64) -> OrderRow {
        OrderRow {
            id,
            customer_id: 102,
            total: Decimal::ZERO,
            created_at: Utc::now(),
            version: 0,
        }
    }

    #[test]
    fn test_assemble_orders_groups_lines_by_order() {
        let lines = vec![
            OrderLineRow {
                order_id: 1,
                article_id: 500,
                article_name: "Tisch".into(),
                unit_price: Decimal::new(10900, 2),
                quantity: 1,
            },
            OrderLineRow {
                order_id: 2,
                article_id: 501,
                article_name: "Stuhl".into(),
                unit_price: Decimal::new(4900, 2),
                quantity: 4,
            },
            OrderLineRow {
                order_id: 1,
                article_id: 501,
                article_name: "Stuhl".into(),
                unit_price: Decimal::new(4900, 2),
                quantity: 2,
            },
        ];

        let orders = assemble_orders(vec![order_row(1), order_row(2)], lines).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders.first().unwrap().lines.len(), 2);
        assert_eq!(orders.get(1).unwrap().lines.len(), 1);
    }

    #[test]
    fn test_assemble_orders_rejects_negative_quantity() {
        let lines = vec![OrderLineRow {
            order_id: 1,
            article_id: 500,
            article_name: "Tisch".into(),
            unit_price: Decimal::ONE,
            quantity: -3,
        }];

        let result = assemble_orders(vec![order_row(1)], lines);
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }
}
