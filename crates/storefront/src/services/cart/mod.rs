//! Session-scoped shopping cart.
//!
//! A [`Cart`] is plain in-memory state: an ordered list of article lines,
//! never persisted. It lives inside a cart scope managed by
//! [`scope::CartScopes`]; the scope ends when the cart empties or an order
//! is assembled from it.

pub mod scope;

pub use scope::CartScopes;

use serde::{Deserialize, Serialize};

use tamarind_core::ArticleId;

use crate::models::Article;

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// Quantity outside the valid range; negative values are rejected, not
    /// clamped.
    #[error("invalid quantity {0}: must be a non-negative integer")]
    InvalidQuantity(i64),

    /// No line references the given article.
    #[error("no cart line for article {0}")]
    UnknownLine(ArticleId),

    /// The session has no live cart scope.
    #[error("no active cart")]
    NoActiveCart,
}

/// One article+quantity pairing inside a [`Cart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The article this line holds.
    pub article: Article,
    /// Current quantity; 0 means kept but excluded from any order.
    pub quantity: u32,
}

/// An in-progress cart: an ordered sequence of lines, at most one per
/// article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The cart's lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Add one unit of an article.
    ///
    /// If a line for the article already exists its quantity is incremented;
    /// otherwise a new line with quantity 1 is appended. Carts are small, so
    /// the linear scan is fine.
    pub fn add(&mut self, article: Article) {
        if let Some(line) = self.line_mut(article.id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }

        self.lines.push(CartLine {
            article,
            quantity: 1,
        });
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of 0 keeps the line; removal is always explicit via
    /// [`Cart::remove`].
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for negative (or absurdly large)
    /// values and `CartError::UnknownLine` if no line holds the article.
    pub fn set_quantity(&mut self, article_id: ArticleId, quantity: i64) -> Result<(), CartError> {
        let quantity = u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))?;

        let line = self
            .line_mut(article_id)
            .ok_or(CartError::UnknownLine(article_id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove the line for an article.
    ///
    /// Returns whether a line was actually removed; removing an absent line
    /// is a no-op. Scope teardown on the now-empty cart is the registry's
    /// job, not this type's.
    pub fn remove(&mut self, article_id: ArticleId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.article.id != article_id);
        self.lines.len() < before
    }

    fn line_mut(&mut self, article_id: ArticleId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.article.id == article_id)
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

    #[test]
    fn test_add_merges_repeated_articles() {
        let mut cart = Cart::new();
        cart.add(article(1, "Tisch"));
        cart.add(article(1, "Tisch"));
        cart.add(article(2, "Stuhl"));
        cart.add(article(1, "Tisch"));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines().first().unwrap().quantity, 3);
        assert_eq!(cart.lines().get(1).unwrap().quantity, 1);
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_one_line_per_distinct_article() {
        let mut cart = Cart::new();
        for id in [1, 2, 1, 3, 2, 1] {
            cart.add(article(id, "x"));
        }
        let mut seen: Vec<ArticleId> = cart.lines().iter().map(|l| l.article.id).collect();
        seen.dedup();
        assert_eq!(seen.len(), cart.lines().len());
    }

    #[test]
    fn test_set_quantity_zero_keeps_the_line() {
        let mut cart = Cart::new();
        cart.add(article(1, "Tisch"));
        cart.set_quantity(ArticleId::new(1), 0).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().unwrap().quantity, 0);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_set_quantity_rejects_negative_without_clamping() {
        let mut cart = Cart::new();
        cart.add(article(1, "Tisch"));

        let err = cart.set_quantity(ArticleId::new(1), -2).unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity(-2));
        // the line is untouched
        assert_eq!(cart.lines().first().unwrap().quantity, 1);
    }

    #[test]
    fn test_set_quantity_on_unknown_line_fails() {
        let mut cart = Cart::new();
        let err = cart.set_quantity(ArticleId::new(9), 5).unwrap_err();
        assert_eq!(err, CartError::UnknownLine(ArticleId::new(9)));
    }

    #[test]
    fn test_remove_deletes_only_the_named_line() {
        let mut cart = Cart::new();
        cart.add(article(1, "Tisch"));
        cart.add(article(2, "Stuhl"));

        assert!(cart.remove(ArticleId::new(1)));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().unwrap().article.id, ArticleId::new(2));

        // removing again is a no-op
        assert!(!cart.remove(ArticleId::new(1)));
    }
}
