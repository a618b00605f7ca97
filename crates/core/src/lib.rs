//! JC Closet Core - Shared types and pure transforms.
//!
//! This crate provides the domain types used across all JC Closet components:
//! - `storefront` - Public-facing perfume and fashion shop
//! - `admin` - Internal dashboard (analytics, orders, customers, content)
//! - `cli` - Command-line tools for migrations and previews
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Everything here is deterministic given its inputs
//! (the current time is always passed in), which keeps it trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, and statuses
//! - [`promo`] - Promotional price resolution for a product at a point in time
//! - [`cart`] - The visitor's shopping cart with stock-bounded quantities
//! - [`flow`] - Navigation-path aggregation into Sankey node/link lists
//! - [`secrets`] - Placeholder, length and entropy checks for configured secrets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod flow;
pub mod promo;
pub mod secrets;
pub mod types;

pub use cart::{Cart, CartError, CartLine};
pub use flow::{FlowGraph, FlowLink, FlowNode, FlowOptions, FlowPath, build_flow_graph};
pub use promo::{PricedProduct, PromoResolution, PromoTerms, PromoType, resolve_promo};
pub use types::*;
