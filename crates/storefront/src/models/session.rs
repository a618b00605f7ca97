//! Values the storefront keeps in the visitor's session.
//!
//! Key names match the storage keys the shop has always used so that support
//! tooling reading the session table sees familiar names.

use jc_closet_core::{Cart, OrderId};
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    pub use jc_closet_client::{LAST_ACTIVITY_KEY, SESSION_ID_KEY};

    /// The visitor's cart, stored verbatim as a JSON array of lines.
    pub const CART: &str = jc_closet_core::Cart::SESSION_KEY;

    /// Id of the last order this visitor placed.
    pub const LAST_ORDER: &str = "jc_closet_last_order";
}

/// Read the cart, treating a missing or unreadable value as empty.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable cart");
            Cart::new()
        }
    }
}

/// Persist the cart.
///
/// # Errors
///
/// Returns the session store error.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Remember the order this visitor just placed.
///
/// # Errors
///
/// Returns the session store error.
pub async fn remember_order(
    session: &Session,
    id: &OrderId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::LAST_ORDER, id).await
}

/// Whether `id` is the order this visitor placed last.
pub async fn placed_order(session: &Session, id: &str) -> bool {
    matches!(
        session.get::<OrderId>(keys::LAST_ORDER).await,
        Ok(Some(last)) if last.as_str() == id
    )
}
