//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tamarind_core::{CustomerId, Email};

use super::order::Order;

/// A registered customer (domain type).
///
/// The customer owns its orders; the relationship is bidirectional in the
/// database, so `orders` must be populated before a new order is attached.
/// Repositories return `orders` empty unless the caller asked for the
/// eagerly-loaded aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Login name; also the identity the ownership guard compares against.
    pub username: String,
    /// Contact email address.
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optimistic-locking version of the customer row.
    pub version: i32,
    /// The customer's orders, present only on the eagerly-loaded aggregate.
    #[serde(default)]
    pub orders: Vec<Order>,
    /// When the customer registered.
    pub created_at: DateTime<Utc>,
}
