//! Display data for templates.
//!
//! Prices are resolved through the promo resolver and formatted here, once
//! per render, so templates only print strings.

use chrono::{DateTime, Utc};
use jc_closet_client::models::{Page, Perfume};
use jc_closet_core::{Cart, CartLine, CurrencyCode, PricedProduct, Price, PromoResolution};
use rust_decimal::Decimal;

fn money(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

/// Resolved price strings shared by cards, detail pages and cart lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceView {
    pub price: String,
    /// Struck-through base price, only while a promotion applies.
    pub original_price: Option<String>,
    pub promo_label: Option<String>,
}

impl PriceView {
    fn from_resolution(resolution: &PromoResolution, currency: CurrencyCode) -> Self {
        Self {
            price: money(resolution.display_price, currency),
            original_price: resolution
                .promo_active
                .then(|| money(resolution.original_price, currency)),
            promo_label: resolution.promo_label.clone(),
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product tile for grids and search suggestions.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub pricing: PriceView,
    pub sold_out: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(perfume: &Perfume, now: DateTime<Utc>, currency: CurrencyCode) -> Self {
        Self {
            id: perfume.id.to_string(),
            name: perfume.name.clone(),
            brand: perfume.brand.clone(),
            image: perfume.primary_image().map(str::to_string),
            pricing: PriceView::from_resolution(&perfume.resolve_price(now), currency),
            sold_out: perfume.is_sold_out(),
        }
    }

    /// Cards for a list of perfumes.
    #[must_use]
    pub fn all(perfumes: &[Perfume], now: DateTime<Utc>, currency: CurrencyCode) -> Vec<Self> {
        perfumes
            .iter()
            .map(|p| Self::new(p, now, currency))
            .collect()
    }
}

/// Full product page.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub card: ProductCard,
    pub description: Option<String>,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    /// Upper bound for the quantity input.
    pub max_quantity: u32,
    /// "Only N left" hint for low stock.
    pub low_stock: Option<u32>,
}

/// Stock level at or under which the page shows a hint.
const LOW_STOCK_THRESHOLD: u32 = 5;

/// Quantity input cap for products without a stock figure.
const DEFAULT_MAX_QUANTITY: u32 = 10;

impl ProductDetail {
    #[must_use]
    pub fn new(perfume: &Perfume, now: DateTime<Utc>, currency: CurrencyCode) -> Self {
        Self {
            card: ProductCard::new(perfume, now, currency),
            description: perfume.description.clone(),
            category: perfume.category.clone(),
            gender: perfume.gender.clone(),
            images: perfume.images.clone(),
            sizes: perfume.sizes.clone(),
            colors: perfume.colors.clone(),
            max_quantity: perfume.stock.unwrap_or(DEFAULT_MAX_QUANTITY),
            low_stock: perfume
                .stock
                .filter(|s| (1..=LOW_STOCK_THRESHOLD).contains(s)),
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Previous/next links for a paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub page: u32,
    pub pages: u32,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    /// Build links under `path`, carrying the non-empty `params` along.
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
            previous: page.has_previous().then(|| link(page.page - 1)),
            next: page.has_next().then(|| link(page.page + 1)),
        }
    }

    /// Whether there is more than one page.
    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.pages > 1
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One cart row.
#[derive(Debug, Clone)]
pub struct CartItemView {
    /// Line key posted back by the update/remove forms.
    pub key: String,
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
    pub max_quantity: Option<u32>,
    pub unit: PriceView,
    pub line_total: String,
}

impl CartItemView {
    fn new(line: &CartLine, now: DateTime<Utc>, currency: CurrencyCode) -> Self {
        Self {
            key: line.line_key(),
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            image: line.image.clone(),
            size: line.size.clone(),
            color: line.color.clone(),
            quantity: line.quantity,
            max_quantity: line.stock,
            unit: PriceView::from_resolution(&line.resolve_price(now), currency),
            line_total: money(line.line_total(now), currency),
        }
    }
}

/// The whole cart as displayed.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, now: DateTime<Utc>, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|l| CartItemView::new(l, now, currency))
                .collect(),
            subtotal: money(cart.subtotal(now), currency),
            item_count: cart.item_count(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use jc_closet_core::{ProductId, PromoTerms, PromoType};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap()
    }

    fn perfume(promo: PromoTerms) -> Perfume {
        serde_json::from_value::<Perfume>(serde_json::json!({
            "_id": "p1",
            "name": "Oud Royale",
            "price": 1000,
            "images": ["https://cdn.jccloset.com/oud.jpg"],
            "stock": 3
        }))
        .map(|mut p| {
            p.promo = promo;
            p
        })
        .unwrap()
    }

    fn discount(value: i64) -> PromoTerms {
        PromoTerms {
            promo_enabled: true,
            promo_type: Some(PromoType::Discount),
            promo_value: Some(Decimal::from(value)),
            promo_start: Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()),
            promo_end: Some(Utc.with_ymd_and_hms(2026, 5, 31, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_card_shows_promo_price() {
        let card = ProductCard::new(&perfume(discount(20)), now(), CurrencyCode::KES);
        assert_eq!(card.pricing.price, "KSh 800");
        assert_eq!(card.pricing.original_price.as_deref(), Some("KSh 1,000"));
        assert_eq!(card.pricing.promo_label.as_deref(), Some("-20% off"));
    }

    #[test]
    fn test_card_without_promo() {
        let card = ProductCard::new(&perfume(PromoTerms::default()), now(), CurrencyCode::USD);
        assert_eq!(card.pricing.price, "$1,000");
        assert!(card.pricing.original_price.is_none());
        assert!(card.pricing.promo_label.is_none());
        assert!(!card.sold_out);
    }

    #[test]
    fn test_detail_low_stock_hint() {
        let detail = ProductDetail::new(&perfume(PromoTerms::default()), now(), CurrencyCode::KES);
        assert_eq!(detail.max_quantity, 3);
        assert_eq!(detail.low_stock, Some(3));
    }

    #[test]
    fn test_page_links_carry_filters() {
        let page: Page<()> = Page {
            items: Vec::new(),
            total: 40,
            page: 2,
            pages: 3,
        };
        let links = PageLinks::new(&page, "/shop", &[("category", "women"), ("q", "")]);

        assert_eq!(links.previous.as_deref(), Some("/shop?category=women&page=1"));
        assert_eq!(links.next.as_deref(), Some("/shop?category=women&page=3"));
        assert!(links.is_paginated());
    }

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        cart.add(CartLine {
            product_id: ProductId::new("p1"),
            name: "Oud Royale".to_string(),
            price: Decimal::from(1000),
            quantity: 2,
            image: None,
            size: None,
            color: None,
            stock: None,
            promo: discount(20),
        })
        .unwrap();

        let view = CartView::new(&cart, now(), CurrencyCode::KES);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "KSh 1,600");
        assert_eq!(view.items[0].line_total, "KSh 1,600");
        assert_eq!(view.items[0].unit.price, "KSh 800");
        assert_eq!(view.items[0].key, "p1||");
    }
}
