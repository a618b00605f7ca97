//! Order and customer types.

use chrono::{DateTime, Utc};
use jc_closet_core::{CustomerId, OrderId, OrderStatus, PaymentStatus, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Orders
// =============================================================================

/// Customer details attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "productId", alias = "_id")]
    pub product_id: ProductId,
    pub name: String,
    /// Unit price charged.
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer: OrderCustomer,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Order number if the backend assigned one, else the id.
    #[must_use]
    pub fn display_number(&self) -> &str {
        self.order_number.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }
}

/// Checkout payload for `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer: OrderCustomer,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Backend reply to `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    #[serde(rename = "_id", alias = "id", alias = "orderId")]
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    /// Hosted payment page to send the shopper to, if any.
    #[serde(default)]
    pub payment_url: Option<String>,
}

/// Filters for the admin order list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

// =============================================================================
// Customers
// =============================================================================

/// A customer aggregate from the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: CustomerId,
    #[serde(default)]
    pub name: String,
    /// As stored by the backend; not re-validated here.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub orders_count: u32,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters for the admin customer list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_backend_json() {
        let json = r#"{
            "_id": "ord_1",
            "orderNumber": "JC-1042",
            "customer": {"name": "Wanjiru", "email": "wanjiru@example.com"},
            "items": [
                {"productId": "p1", "name": "Oud Royale", "price": 9999, "quantity": 2},
                {"productId": "p2", "name": "Rose Mist", "price": "2500.50", "quantity": 1}
            ],
            "total": "22498.50",
            "status": "processing",
            "paymentStatus": "paid"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.display_number(), "JC-1042");
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.items[0].line_total(), Decimal::from(19998));
    }

    #[test]
    fn test_receipt_accepts_order_id_alias() {
        let receipt: OrderReceipt =
            serde_json::from_str(r#"{"orderId": "ord_9", "paymentUrl": "https://pay.example.com/x"}"#)
                .unwrap();
        assert_eq!(receipt.id.as_str(), "ord_9");
        assert!(receipt.payment_url.is_some());
    }

    #[test]
    fn test_customer_defaults() {
        let customer: Customer =
            serde_json::from_str(r#"{"_id": "c1", "email": "amina@example.com", "ordersCount": 3}"#)
                .unwrap();
        assert_eq!(customer.orders_count, 3);
        assert_eq!(customer.total_spent, Decimal::ZERO);
        assert!(customer.phone.is_none());
    }
}
