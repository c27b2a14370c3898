//! Article domain type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::{ArticleId, CurrencyCode, Price};

/// A catalog article (domain type).
///
/// Read-only from the storefront's perspective; the catalog owns the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Unique article ID.
    pub id: ArticleId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Whether the article is currently available for ordering.
    pub in_stock: bool,
}

impl Article {
    /// Convenience constructor used by repositories and tests.
    #[must_use]
    pub const fn new(id: ArticleId, name: String, amount: Decimal, in_stock: bool) -> Self {
        Self {
            id,
            name,
            price: Price::new(amount, CurrencyCode::EUR),
            in_stock,
        }
    }
}
