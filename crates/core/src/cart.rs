//! The visitor's shopping cart.
//!
//! The cart lives in the visitor's session under [`Cart::SESSION_KEY`] and is
//! stored verbatim as JSON. Every mutation keeps each line's quantity within
//! `1..=stock` (a line without a known stock is only bounded below), so a
//! cart read back from the session never needs re-validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::promo::{PricedProduct, PromoTerms};
use crate::types::ProductId;

/// Errors from cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product has no stock left.
    #[error("{0} is out of stock")]
    OutOfStock(String),
    /// A zero quantity was requested when adding.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    /// No line matches the given key.
    #[error("cart line not found: {0}")]
    LineNotFound(String),
}

/// One product/size/colour combination in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "_id")]
    pub product_id: ProductId,
    pub name: String,
    /// Base price; the charged price is resolved through the promo terms.
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(flatten)]
    pub promo: PromoTerms,
}

impl CartLine {
    /// Stable key for the line, used by the cart forms.
    #[must_use]
    pub fn line_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.product_id,
            self.size.as_deref().unwrap_or(""),
            self.color.as_deref().unwrap_or("")
        )
    }

    fn same_variant(&self, other: &Self) -> bool {
        self.product_id == other.product_id && self.size == other.size && self.color == other.color
    }

    fn clamp(&self, quantity: u32) -> u32 {
        let upper = self.stock.unwrap_or(u32::MAX).max(1);
        quantity.clamp(1, upper)
    }

    /// Resolved unit price times quantity.
    #[must_use]
    pub fn line_total(&self, now: DateTime<Utc>) -> Decimal {
        self.resolve_price(now).display_price * Decimal::from(self.quantity)
    }
}

impl PricedProduct for CartLine {
    fn base_price(&self) -> Decimal {
        self.price
    }

    fn promo_terms(&self) -> &PromoTerms {
        &self.promo
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Session key the cart is persisted under.
    pub const SESSION_KEY: &'static str = "jc_closet_cart";

    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `line.quantity` units of a product variant.
    ///
    /// An existing line for the same product, size and colour is topped up
    /// and refreshed with the incoming price, promo terms and stock. The
    /// resulting quantity is clamped to the stock. Returns the line's new
    /// quantity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a zero quantity and `OutOfStock` when
    /// the product's stock is zero.
    pub fn add(&mut self, line: CartLine) -> Result<u32, CartError> {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if line.stock == Some(0) {
            return Err(CartError::OutOfStock(line.name));
        }

        if let Some(existing) = self.lines.iter_mut().find(|l| l.same_variant(&line)) {
            let requested = existing.quantity.saturating_add(line.quantity);
            existing.price = line.price;
            existing.promo = line.promo;
            existing.stock = line.stock;
            existing.name = line.name;
            existing.image = line.image;
            existing.quantity = existing.clamp(requested);
            return Ok(existing.quantity);
        }

        let mut line = line;
        line.quantity = line.clamp(line.quantity);
        let quantity = line.quantity;
        self.lines.push(line);
        Ok(quantity)
    }

    /// Set the quantity of the line with `key`.
    ///
    /// Zero removes the line and returns `None`; any other value is clamped
    /// to `1..=stock` and the stored quantity is returned.
    ///
    /// # Errors
    ///
    /// Returns `LineNotFound` when no line has that key.
    pub fn set_quantity(&mut self, key: &str, quantity: u32) -> Result<Option<u32>, CartError> {
        if quantity == 0 {
            return if self.remove(key) {
                Ok(None)
            } else {
                Err(CartError::LineNotFound(key.to_string()))
            };
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_key() == key)
            .ok_or_else(|| CartError::LineNotFound(key.to_string()))?;
        line.quantity = line.clamp(quantity);
        Ok(Some(line.quantity))
    }

    /// Remove the line with `key`. Returns whether a line was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.line_key() != key);
        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Sum of resolved line totals at `now`.
    #[must_use]
    pub fn subtotal(&self, now: DateTime<Utc>) -> Decimal {
        self.lines.iter().map(|l| l.line_total(now)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::promo::PromoType;

    fn line(id: &str, quantity: u32, stock: Option<u32>) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Perfume {id}"),
            price: Decimal::from(2500),
            quantity,
            image: None,
            size: Some("50ml".to_string()),
            color: None,
            stock,
            promo: PromoTerms::default(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_add_merges_same_variant() {
        let mut cart = Cart::new();
        cart.add(line("p1", 1, Some(10))).unwrap();
        let quantity = cart.add(line("p1", 2, Some(10))).unwrap();

        assert_eq!(quantity, 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_keeps_variants_apart() {
        let mut cart = Cart::new();
        cart.add(line("p1", 1, None)).unwrap();
        let mut other_size = line("p1", 1, None);
        other_size.size = Some("100ml".to_string());
        cart.add(other_size).unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_ne!(cart.lines()[0].line_key(), cart.lines()[1].line_key());
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(line("p1", 5, Some(3))).unwrap(), 3);
        assert_eq!(cart.add(line("p1", 5, Some(3))).unwrap(), 3);
    }

    #[test]
    fn test_add_out_of_stock_and_zero_quantity() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(line("p1", 1, Some(0))),
            Err(CartError::OutOfStock("Perfume p1".to_string()))
        );
        assert_eq!(cart.add(line("p1", 0, None)), Err(CartError::InvalidQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_clamps_and_removes() {
        let mut cart = Cart::new();
        cart.add(line("p1", 1, Some(4))).unwrap();
        let key = cart.lines()[0].line_key();

        assert_eq!(cart.set_quantity(&key, 9).unwrap(), Some(4));
        assert_eq!(cart.set_quantity(&key, 2).unwrap(), Some(2));
        assert_eq!(cart.set_quantity(&key, 0).unwrap(), None);
        assert!(cart.is_empty());
        assert_eq!(
            cart.set_quantity(&key, 1),
            Err(CartError::LineNotFound(key))
        );
    }

    #[test]
    fn test_subtotal_uses_promo_prices() {
        let mut cart = Cart::new();
        let mut promo_line = line("p1", 2, None);
        promo_line.promo = PromoTerms {
            promo_enabled: true,
            promo_type: Some(PromoType::Discount),
            promo_value: Some(Decimal::from(20)),
            promo_start: Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()),
            promo_end: Some(Utc.with_ymd_and_hms(2026, 5, 31, 0, 0, 0).unwrap()),
        };
        cart.add(promo_line).unwrap();
        cart.add(line("p2", 1, None)).unwrap();

        // 2 x 2000 + 1 x 2500
        assert_eq!(cart.subtotal(now()), Decimal::from(6500));
    }

    #[test]
    fn test_session_json_shape() {
        let mut cart = Cart::new();
        cart.add(line("p1", 1, Some(2))).unwrap();
        let json = serde_json::to_value(&cart).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["_id"], "p1");
        assert_eq!(json[0]["promoEnabled"], false);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
