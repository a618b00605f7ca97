pub mod flow;
pub mod migrate;
pub mod promo;
