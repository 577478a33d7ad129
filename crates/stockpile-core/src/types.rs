//! # Domain Types
//!
//! The single managed entity and its identifier.
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Product Identity                                │
//! │                                                                         │
//! │  Caller builds         Remote confirms          Local store assigns     │
//! │  ──────────────        ───────────────          ───────────────────     │
//! │  id: None         ──►  id: None | Some(n)  ──►  id: Some(n)             │
//! │                                                                         │
//! │  Once the local store has assigned an id it never changes.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Identifier assigned by the local store on first persistence.
pub type ProductId = i64;

/// A product held in stock.
///
/// Domain fields are not validated here; whatever the remote source or the
/// caller supplies is stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Local identifier, `None` until first persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,

    /// Display name.
    pub name: String,

    /// Unit price in cents (smallest currency unit).
    #[serde(default)]
    pub price_cents: i64,

    /// Units on hand.
    #[serde(default)]
    pub quantity: i64,
}

impl Product {
    /// Creates a product that has not been persisted yet.
    pub fn new(name: impl Into<String>, price_cents: i64, quantity: i64) -> Self {
        Product {
            id: None,
            name: name.into(),
            price_cents,
            quantity,
        }
    }

    /// Returns a copy carrying the given identifier.
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    /// True once the local store has assigned an identifier.
    #[inline]
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// Compares domain fields only, ignoring the identifier.
    pub fn same_fields_as(&self, other: &Product) -> bool {
        self.name == other.name
            && self.price_cents == other.price_cents
            && self.quantity == other.quantity
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_has_no_id() {
        let product = Product::new("Pen", 150, 10);
        assert_eq!(product.id, None);
        assert!(!product.has_id());
    }

    #[test]
    fn test_same_fields_ignores_id() {
        let a = Product::new("Ink", 300, 3).with_id(2);
        let b = Product::new("Ink", 300, 3);
        assert!(a.same_fields_as(&b));
        assert_ne!(a, b);

        let c = Product::new("Ink", 300, 4);
        assert!(!a.same_fields_as(&c));
    }

    #[test]
    fn test_json_omits_missing_id() {
        let json = serde_json::to_string(&Product::new("Pen", 150, 10)).unwrap();
        assert_eq!(json, r#"{"name":"Pen","price_cents":150,"quantity":10}"#);
    }

    #[test]
    fn test_json_defaults_missing_numbers() {
        let product: Product = serde_json::from_str(r#"{"id":7,"name":"Clip"}"#).unwrap();
        assert_eq!(product, Product::new("Clip", 0, 0).with_id(7));
    }
}
