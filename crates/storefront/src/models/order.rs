//! Order domain types.
//!
//! An order is a frozen snapshot taken from a cart at checkout. Nothing in
//! this service mutates an order after creation; version-checked updates
//! belong to downstream fulfillment systems.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::{ArticleId, CustomerId, OrderId};

/// A persisted order (domain type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Customer the order belongs to.
    pub customer_id: CustomerId,
    /// Frozen line snapshots; every quantity is > 0.
    pub lines: Vec<OrderLine>,
    /// Sum of `unit_price * quantity` across all lines.
    pub total: Decimal,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Optimistic-locking version of the order row.
    pub version: i32,
}

/// One frozen article+quantity snapshot inside an [`Order`].
///
/// Copies the article's identity, name, and unit price at order-creation
/// time so later catalog changes cannot rewrite order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Article this line was snapshotted from.
    pub article_id: ArticleId,
    /// Article display name at order time.
    pub article_name: String,
    /// Unit price at order time.
    pub unit_price: Decimal,
    /// Ordered quantity, always > 0.
    pub quantity: u32,
}

impl OrderLine {
    /// The line total (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
