//! Cart route handlers.
//!
//! The cart lives in the visitor's session (see [`crate::models::session`]).
//! Adding a product re-reads it from the backend so the stored price, promo
//! terms and stock are current; every mutation goes through
//! [`jc_closet_core::Cart`], which keeps quantities within stock.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use jc_closet_core::ProductId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::AnalyticsConfig;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::CartView;
use crate::models::session::{load_cart, save_cart};
use crate::state::AppState;

/// HTMX event fired whenever the cart changes.
pub const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Sends add-to-cart errors to the feedback slot instead of the badge.
const CART_FEEDBACK: (&str, &str) = ("HX-Retarget", "#cart-feedback");

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub key: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub key: String,
}

/// Treat an empty select value as "not chosen".
fn chosen(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Cart items fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Inline add-to-cart error fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_error.html")]
pub struct CartErrorTemplate {
    pub message: String,
}

/// Display cart page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> CartShowTemplate {
    let cart = load_cart(&session).await;

    CartShowTemplate {
        cart: CartView::new(&cart, chrono::Utc::now(), state.config().currency),
        analytics: state.config().analytics.clone(),
        nonce,
    }
}

/// Add item to cart (HTMX).
///
/// Returns the new badge and triggers `cart-updated`. A sold-out product or
/// an unknown id answers with a short inline error instead.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    match try_add(&state, &session, form).await {
        Ok(count) => (AppendHeaders([CART_UPDATED]), CartCountTemplate { count }).into_response(),
        Err(e) => {
            let status = match &e {
                AppError::Cart(_) => StatusCode::CONFLICT,
                AppError::Api(jc_closet_client::ApiError::NotFound(_)) => StatusCode::NOT_FOUND,
                _ => {
                    tracing::error!(error = %e, "Failed to add item to cart");
                    StatusCode::BAD_GATEWAY
                }
            };
            (
                status,
                AppendHeaders([CART_FEEDBACK]),
                CartErrorTemplate {
                    message: e.public_message(),
                },
            )
                .into_response()
        }
    }
}

async fn try_add(state: &AppState, session: &Session, form: AddToCartForm) -> Result<u32> {
    let perfume = state
        .api()
        .scope(session)
        .get_perfume(&ProductId::new(form.product_id))
        .await?;

    let line = perfume.to_cart_line(
        form.quantity.unwrap_or(1),
        chosen(form.size),
        chosen(form.color),
    );

    let mut cart = load_cart(session).await;
    let quantity = cart.add(line)?;
    save_cart(session, &cart).await?;

    tracing::info!(product = %perfume.id, quantity, "Added to cart");
    Ok(cart.item_count())
}

/// Update cart item quantity (HTMX). Zero removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.set_quantity(&form.key, form.quantity)?;
    save_cart(&session, &cart).await?;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::new(&cart, chrono::Utc::now(), state.config().currency),
        },
    )
        .into_response())
}

/// Remove item from cart (HTMX). Removing a missing line is not an error.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    if cart.remove(&form.key) {
        save_cart(&session, &cart).await?;
    }

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::new(&cart, chrono::Utc::now(), state.config().currency),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> CartCountTemplate {
    CartCountTemplate {
        count: load_cart(&session).await.item_count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_chosen_ignores_blank_selects() {
        assert_eq!(chosen(None), None);
        assert_eq!(chosen(Some("  ".to_string())), None);
        assert_eq!(chosen(Some(" 50ml ".to_string())), Some("50ml".to_string()));
    }

    #[test]
    fn test_cart_error_fragment_escapes_message() {
        let html = CartErrorTemplate {
            message: "<script>alert(1)</script> & co".to_string(),
        }
        .render()
        .unwrap();
        assert!(html.starts_with("<span class=\"cart-error\">"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains(" & co"));
    }
}
