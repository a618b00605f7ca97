//! Display rows for admin templates.
//!
//! Money, dates and statuses are formatted once here so the templates only
//! print strings.

use chrono::{DateTime, Utc};
use jc_closet_client::models::{Customer, Order, OrderItem, Page, Perfume};
use jc_closet_core::{AppointmentStatus, CurrencyCode, OrderStatus, PricedProduct, Price, PromoTerms};
use rust_decimal::Decimal;

use super::CurrentAdmin;

/// Products at or below this stock level are flagged.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

pub(crate) fn money(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

pub(crate) fn date(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%-d %b %Y").to_string())
}

fn date_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "-".to_string(),
        |at| at.format("%-d %b %Y, %H:%M").to_string(),
    )
}

/// Admin user view for the layout header.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub role: String,
    pub notifications: bool,
}

impl AdminUserView {
    #[must_use]
    pub fn new(admin: &CurrentAdmin, notifications: bool) -> Self {
        Self {
            name: admin.display_name().to_string(),
            role: admin.role.clone(),
            notifications,
        }
    }
}

/// `<option>` for a status dropdown.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl StatusOption {
    #[must_use]
    pub fn orders(current: Option<OrderStatus>) -> Vec<Self> {
        OrderStatus::SETTABLE
            .iter()
            .map(|status| Self {
                value: status.as_str(),
                label: status.label(),
                selected: current == Some(*status),
            })
            .collect()
    }

    #[must_use]
    pub fn appointments(current: AppointmentStatus) -> Vec<Self> {
        AppointmentStatus::SETTABLE
            .iter()
            .map(|status| Self {
                value: status.as_str(),
                label: status.label(),
                selected: current == *status,
            })
            .collect()
    }
}

/// Pagination links that keep the current filters.
#[derive(Debug, Clone)]
pub struct PageLinks {
    pub page: u32,
    pub pages: u32,
    pub total: u64,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    #[must_use]
    pub fn new<T>(page: &Page<T>, path: &str, params: &[(&str, &str)]) -> Self {
        let link = |number: u32| {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
                query.append_pair(key, value);
            }
            query.append_pair("page", &number.to_string());
            format!("{path}?{}", query.finish())
        };

        Self {
            page: page.page,
            pages: page.pages,
            total: page.total,
            previous: page.has_previous().then(|| link(page.page - 1)),
            next: page.has_next().then(|| link(page.page + 1)),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// CSS modifier for an order status badge.
#[must_use]
pub const fn status_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "badge-warning",
        OrderStatus::Processing | OrderStatus::Shipped => "badge-info",
        OrderStatus::Delivered => "badge-success",
        OrderStatus::Cancelled => "badge-danger",
        OrderStatus::Unknown => "badge-muted",
    }
}

#[must_use]
pub const fn appointment_class(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "badge-warning",
        AppointmentStatus::Confirmed => "badge-info",
        AppointmentStatus::Completed => "badge-success",
        AppointmentStatus::Cancelled => "badge-danger",
        AppointmentStatus::Unknown => "badge-muted",
    }
}

/// One row of the orders table.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub number: String,
    pub customer: String,
    pub email: String,
    pub items: u32,
    pub total: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub payment: &'static str,
    pub placed: String,
}

impl OrderRow {
    #[must_use]
    pub fn new(order: &Order, currency: CurrencyCode) -> Self {
        let customer = if order.customer.name.trim().is_empty() {
            "Guest".to_string()
        } else {
            order.customer.name.clone()
        };
        Self {
            id: order.id.to_string(),
            number: order.display_number().to_string(),
            customer,
            email: order.customer.email.clone(),
            items: order.item_count(),
            total: money(order.total, currency),
            status: order.status.label(),
            status_class: status_class(order.status),
            payment: order.payment_status.label(),
            placed: date(order.created_at),
        }
    }
}

/// Line on the order detail page.
#[derive(Debug, Clone)]
pub struct OrderItemRow {
    pub name: String,
    /// Size and colour, e.g. `50ml / Gold`.
    pub variant: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl OrderItemRow {
    fn new(item: &OrderItem, currency: CurrencyCode) -> Self {
        let variant: Vec<&str> = [item.size.as_deref(), item.color.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        Self {
            name: item.name.clone(),
            variant: (!variant.is_empty()).then(|| variant.join(" / ")),
            quantity: item.quantity,
            price: money(item.price, currency),
            line_total: money(item.line_total(), currency),
        }
    }
}

/// Order detail page.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub row: OrderRow,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub notes: Option<String>,
    pub placed_at: String,
    pub items: Vec<OrderItemRow>,
}

impl OrderDetail {
    #[must_use]
    pub fn new(order: &Order, currency: CurrencyCode) -> Self {
        Self {
            row: OrderRow::new(order, currency),
            phone: order.customer.phone.clone(),
            address: order.customer.address.clone(),
            city: order.customer.city.clone(),
            notes: order.notes.clone(),
            placed_at: date_time(order.created_at),
            items: order
                .items
                .iter()
                .map(|item| OrderItemRow::new(item, currency))
                .collect(),
        }
    }
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub orders: u32,
    pub spent: String,
    pub joined: String,
}

impl CustomerRow {
    #[must_use]
    pub fn new(customer: &Customer, currency: CurrencyCode) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            orders: customer.orders_count,
            spent: money(customer.total_spent, currency),
            joined: date(customer.created_at),
        }
    }
}

// =============================================================================
// Products and promotions
// =============================================================================

/// Where a product's promotion stands at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoState {
    Off,
    Live,
    Scheduled,
    Ended,
}

impl PromoState {
    #[must_use]
    pub fn of(terms: &PromoTerms, now: DateTime<Utc>) -> Self {
        if !terms.promo_enabled {
            return Self::Off;
        }
        if terms.is_live(now) {
            return Self::Live;
        }
        match terms.promo_start {
            Some(start) if start > now => Self::Scheduled,
            _ => Self::Ended,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "No promotion",
            Self::Live => "Live",
            Self::Scheduled => "Scheduled",
            Self::Ended => "Ended",
        }
    }

    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Off => "badge-muted",
            Self::Live => "badge-success",
            Self::Scheduled => "badge-info",
            Self::Ended => "badge-warning",
        }
    }
}

/// One row of the products table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub price: String,
    /// What shoppers pay right now.
    pub display_price: String,
    pub promo_label: Option<String>,
    pub promo_state: &'static str,
    pub promo_class: &'static str,
    pub stock: Option<u32>,
    pub low_stock: bool,
}

impl ProductRow {
    #[must_use]
    pub fn new(perfume: &Perfume, now: DateTime<Utc>, currency: CurrencyCode) -> Self {
        let resolved = perfume.resolve_price(now);
        let state = PromoState::of(&perfume.promo, now);
        Self {
            id: perfume.id.to_string(),
            name: perfume.name.clone(),
            brand: perfume.brand.clone(),
            price: money(perfume.price, currency),
            display_price: money(resolved.display_price, currency),
            promo_label: resolved.promo_label,
            promo_state: state.label(),
            promo_class: state.class(),
            stock: perfume.stock,
            low_stock: perfume.stock.is_some_and(|s| s <= LOW_STOCK_THRESHOLD),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use jc_closet_client::models::OrderCustomer;
    use jc_closet_core::{OrderId, PaymentStatus, ProductId, PromoType};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn order() -> Order {
        Order {
            id: OrderId::new("ord_1"),
            order_number: None,
            customer: OrderCustomer {
                name: "  ".to_string(),
                email: "amina@example.com".to_string(),
                ..OrderCustomer::default()
            },
            items: vec![OrderItem {
                product_id: ProductId::new("p1"),
                name: "Oud Royale".to_string(),
                price: Decimal::from(12_500),
                quantity: 2,
                size: Some("50ml".to_string()),
                color: Some("Gold".to_string()),
                image: None,
            }],
            total: Decimal::from(25_000),
            status: OrderStatus::Shipped,
            payment_status: PaymentStatus::Paid,
            notes: None,
            created_at: Some(now()),
        }
    }

    #[test]
    fn test_order_row() {
        let row = OrderRow::new(&order(), CurrencyCode::KES);
        assert_eq!(row.number, "ord_1");
        assert_eq!(row.customer, "Guest");
        assert_eq!(row.items, 2);
        assert_eq!(row.total, "KSh 25,000");
        assert_eq!(row.status_class, "badge-info");
        assert_eq!(row.placed, "17 Oct 2026");
    }

    #[test]
    fn test_order_detail_variant() {
        let detail = OrderDetail::new(&order(), CurrencyCode::KES);
        let item = detail.items.first().unwrap();
        assert_eq!(item.variant.as_deref(), Some("50ml / Gold"));
        assert_eq!(item.line_total, "KSh 25,000");
    }

    #[test]
    fn test_promo_state() {
        let mut terms = PromoTerms {
            promo_enabled: true,
            promo_type: Some(PromoType::Discount),
            promo_value: Some(Decimal::from(10)),
            promo_start: Some(now() - Duration::days(1)),
            promo_end: Some(now() + Duration::days(1)),
        };
        assert_eq!(PromoState::of(&terms, now()), PromoState::Live);

        terms.promo_start = Some(now() + Duration::hours(1));
        assert_eq!(PromoState::of(&terms, now()), PromoState::Scheduled);

        terms.promo_start = Some(now() - Duration::days(3));
        terms.promo_end = Some(now() - Duration::days(2));
        assert_eq!(PromoState::of(&terms, now()), PromoState::Ended);

        terms.promo_enabled = false;
        assert_eq!(PromoState::of(&terms, now()), PromoState::Off);
    }

    #[test]
    fn test_status_options_mark_current() {
        let options = StatusOption::orders(Some(OrderStatus::Delivered));
        let selected: Vec<&str> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, vec!["delivered"]);
    }

    #[test]
    fn test_page_links_keep_filters() {
        let page: Page<Order> = Page {
            items: Vec::new(),
            total: 60,
            page: 2,
            pages: 3,
        };
        let links = PageLinks::new(&page, "/orders", &[("status", "pending"), ("q", "")]);
        assert_eq!(links.previous.as_deref(), Some("/orders?status=pending&page=1"));
        assert_eq!(links.next.as_deref(), Some("/orders?status=pending&page=3"));
    }
}
