//! Checkout hand-off.
//!
//! The order is created at the backend with prices resolved at submission
//! time. On success the cart is cleared and the shopper is sent to the
//! payment page the backend returned, or to the local confirmation page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use jc_closet_client::ApiError;
use jc_closet_client::models::{NewOrder, Order, OrderCustomer, OrderItem};
use jc_closet_core::{Cart, CurrencyCode, Email, OrderId, PricedProduct, Price};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::AnalyticsConfig;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::CartView;
use crate::models::session::{load_cart, placed_order, remember_order, save_cart};
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub notes: String,
}

fn optional(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl CheckoutForm {
    /// Validate the shopper's details.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first problem.
    pub fn customer(&self) -> std::result::Result<OrderCustomer, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please enter your name.".to_string());
        }
        let email =
            Email::parse(&self.email).map_err(|_| "Please enter a valid email address.".to_string())?;
        let phone = optional(&self.phone).ok_or_else(|| "Please enter a phone number.".to_string())?;
        let address =
            optional(&self.address).ok_or_else(|| "Please enter a delivery address.".to_string())?;

        Ok(OrderCustomer {
            name: name.to_string(),
            email: email.into_inner(),
            phone: Some(phone),
            address: Some(address),
            city: optional(&self.city),
        })
    }
}

/// Build the order payload from the cart, pricing every line at `now`.
#[must_use]
pub fn build_order(
    cart: &Cart,
    customer: OrderCustomer,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> NewOrder {
    let items = cart
        .lines()
        .iter()
        .map(|line| OrderItem {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.resolve_price(now).display_price,
            quantity: line.quantity,
            size: line.size.clone(),
            color: line.color.clone(),
            image: line.image.clone(),
        })
        .collect();

    NewOrder {
        customer,
        items,
        total: cart.subtotal(now),
        notes,
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub form: CheckoutForm,
    pub error: Option<String>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Confirmation line.
pub struct ConfirmedItem {
    pub name: String,
    pub quantity: u32,
    pub line_total: String,
}

/// What the confirmation page shows of a placed order.
pub struct OrderSummary {
    pub customer_name: Option<String>,
    pub items: Vec<ConfirmedItem>,
    pub total: String,
}

impl OrderSummary {
    fn new(order: &Order, currency: CurrencyCode) -> Self {
        Self {
            customer_name: optional(&order.customer.name),
            items: order
                .items
                .iter()
                .map(|i| ConfirmedItem {
                    name: i.name.clone(),
                    quantity: i.quantity,
                    line_total: Price::new(i.line_total(), currency).display(),
                })
                .collect(),
            total: Price::new(order.total, currency).display(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CompleteTemplate {
    pub order_number: String,
    /// `None` when the order could not be read back.
    pub summary: Option<OrderSummary>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Checkout form. An empty cart goes back to the cart page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutTemplate {
        cart: CartView::new(&cart, Utc::now(), state.config().currency),
        form: CheckoutForm::default(),
        error: None,
        analytics: state.config().analytics.clone(),
        nonce,
    }
    .into_response()
}

/// Create the order and hand off.
///
/// Validation problems (ours or the backend's) re-render the form with the
/// shopper's input kept.
///
/// # Errors
///
/// Returns an error if the session store fails after the order was placed.
#[instrument(skip(state, session, nonce, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let now = Utc::now();
    let currency = state.config().currency;
    let rerender = |error: String, form: CheckoutForm, cart: &Cart| {
        CheckoutTemplate {
            cart: CartView::new(cart, now, currency),
            form,
            error: Some(error),
            analytics: state.config().analytics.clone(),
            nonce: nonce.clone(),
        }
        .into_response()
    };

    let customer = match form.customer() {
        Ok(customer) => customer,
        Err(message) => return Ok(rerender(message, form, &cart)),
    };

    let order = build_order(&cart, customer, optional(&form.notes), now);
    add_breadcrumb(
        "checkout",
        "Submitting order",
        &[("items", &order.items.len().to_string())],
    );

    let receipt = match state.api().scope(&session).create_order(&order).await {
        Ok(receipt) => receipt,
        Err(ApiError::Validation(message)) => return Ok(rerender(message, form, &cart)),
        Err(e) => {
            tracing::error!(error = %e, "Order creation failed");
            return Ok(rerender(
                "We couldn't place your order. Your cart is saved; please try again.".to_string(),
                form,
                &cart,
            ));
        }
    };

    tracing::info!(order_id = %receipt.id, "Order placed");
    cart.clear();
    save_cart(&session, &cart).await?;
    remember_order(&session, &receipt.id).await?;

    let target = receipt
        .payment_url
        .filter(|url| url.starts_with("https://"))
        .unwrap_or_else(|| format!("/checkout/complete/{}", receipt.id));
    Ok(Redirect::to(&target).into_response())
}

/// Order confirmation. Falls back to the bare id if the order can't be read.
///
/// Only the visitor who placed the order may see it.
///
/// # Errors
///
/// Returns `NotFound` for any order this session did not place.
#[instrument(skip(state, session, nonce))]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<CompleteTemplate> {
    if !placed_order(&session, &id).await {
        tracing::warn!("Confirmation requested for an order this visitor did not place");
        return Err(AppError::NotFound(format!("order {id}")));
    }
    let order_id = OrderId::new(id);
    let (order_number, summary) = match state.api().scope(&session).get_order(&order_id).await {
        Ok(order) => (
            order.display_number().to_string(),
            Some(OrderSummary::new(&order, state.config().currency)),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Could not load placed order");
            (order_id.into_inner(), None)
        }
    };

    Ok(CompleteTemplate {
        order_number,
        summary,
        analytics: state.config().analytics.clone(),
        nonce,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use jc_closet_core::{CartLine, ProductId, PromoTerms, PromoType};
    use rust_decimal::Decimal;

    use super::*;

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: " Wanjiru Kamau ".to_string(),
            email: "Wanjiru@Example.co.ke".to_string(),
            phone: "+254 700 000 000".to_string(),
            address: "Ngong Road 12".to_string(),
            city: "Nairobi".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_customer_validation() {
        let customer = form().customer().unwrap();
        assert_eq!(customer.name, "Wanjiru Kamau");
        assert_eq!(customer.city.as_deref(), Some("Nairobi"));

        let mut missing_phone = form();
        missing_phone.phone = "  ".to_string();
        assert_eq!(
            missing_phone.customer().unwrap_err(),
            "Please enter a phone number."
        );

        let mut bad_email = form();
        bad_email.email = "wanjiru".to_string();
        assert!(bad_email.customer().is_err());
    }

    #[test]
    fn test_order_uses_promo_prices() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap();
        let mut cart = Cart::new();
        cart.add(CartLine {
            product_id: ProductId::new("p1"),
            name: "Oud Royale".to_string(),
            price: Decimal::from(1000),
            quantity: 2,
            image: None,
            size: Some("50ml".to_string()),
            color: None,
            stock: Some(5),
            promo: PromoTerms {
                promo_enabled: true,
                promo_type: Some(PromoType::Price),
                promo_value: Some(Decimal::from(750)),
                promo_start: Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()),
                promo_end: Some(Utc.with_ymd_and_hms(2026, 5, 31, 0, 0, 0).unwrap()),
            },
        })
        .unwrap();

        let order = build_order(&cart, form().customer().unwrap(), None, now);

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].price, Decimal::from(750));
        assert_eq!(order.items[0].size.as_deref(), Some("50ml"));
        assert_eq!(order.total, Decimal::from(1500));
    }
}
