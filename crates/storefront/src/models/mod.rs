//! View models and session keys for the storefront.

pub mod session;
pub mod views;

pub use session::keys as session_keys;
pub use views::{CartItemView, CartView, PageLinks, ProductCard, ProductDetail};
