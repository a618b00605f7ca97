//! Perfume catalogue types.

use chrono::{DateTime, Utc};
use jc_closet_core::{CartLine, PricedProduct, ProductId, PromoTerms};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Perfume
// =============================================================================

/// A perfume or fashion item as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perfume {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub featured: bool,
    #[serde(flatten)]
    pub promo: PromoTerms,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Perfume {
    /// First image, used for cards and cart lines.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the backend reports no stock.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.stock == Some(0)
    }

    /// Snapshot this product into a cart line.
    #[must_use]
    pub fn to_cart_line(
        &self,
        quantity: u32,
        size: Option<String>,
        color: Option<String>,
    ) -> CartLine {
        CartLine {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            quantity,
            image: self.primary_image().map(str::to_string),
            size,
            color,
            stock: self.stock,
            promo: self.promo.clone(),
        }
    }
}

impl PricedProduct for Perfume {
    fn base_price(&self) -> Decimal {
        self.price
    }

    fn promo_terms(&self) -> &PromoTerms {
        &self.promo
    }
}

// =============================================================================
// Listing
// =============================================================================

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub pages: u32,
}

const fn first_page() -> u32 {
    1
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            pages: 1,
        }
    }
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// A page of perfumes.
pub type ProductPage = Page<Perfume>;

/// Catalogue sort orders understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    /// Parse a sort key from a URL parameter string.
    #[must_use]
    pub fn from_str_param(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "newest" | "new" => Some(Self::Newest),
            "price_asc" | "price-asc" => Some(Self::PriceAsc),
            "price_desc" | "price-desc" => Some(Self::PriceDesc),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Name => "name",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::Name => "Name",
        }
    }

    pub const ALL: [Self; 4] = [Self::Newest, Self::PriceAsc, Self::PriceDesc, Self::Name];
}

/// Filters for `/perfumes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<ProductSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub featured: bool,
}

impl ProductQuery {
    /// Stable cache key for the query.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "perfumes:{}:{}:{}:{}:{}:{}",
            self.page.unwrap_or(1),
            self.limit.unwrap_or(0),
            self.category.as_deref().unwrap_or(""),
            self.sort.map_or("", ProductSort::as_str),
            self.search.as_deref().unwrap_or(""),
            self.featured
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_perfume_from_backend_json() {
        let json = r#"{
            "_id": "665f1c",
            "name": "Oud Royale",
            "brand": "Maison JC",
            "price": 12500,
            "sizes": ["50ml", "100ml"],
            "images": ["https://cdn.example.com/oud.jpg"],
            "stock": 4,
            "promoEnabled": true,
            "promoType": "price",
            "promoValue": 9999,
            "promoStart": "2026-01-01T00:00:00Z",
            "promoEnd": "2026-12-31T00:00:00Z",
            "createdAt": "2025-11-02T10:00:00Z"
        }"#;
        let perfume: Perfume = serde_json::from_str(json).unwrap();

        assert_eq!(perfume.id.as_str(), "665f1c");
        assert_eq!(perfume.price, Decimal::from(12500));
        assert!(perfume.promo.promo_enabled);
        assert_eq!(perfume.primary_image(), Some("https://cdn.example.com/oud.jpg"));

        let line = perfume.to_cart_line(2, Some("50ml".into()), None);
        assert_eq!(line.stock, Some(4));
        assert_eq!(line.promo, perfume.promo);
    }

    #[test]
    fn test_page_defaults() {
        let page: ProductPage = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert_eq!(page.page, 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_query_serializes_only_set_fields() {
        let query = ProductQuery {
            search: Some("oud".into()),
            limit: Some(6),
            ..ProductQuery::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, serde_json::json!({"limit": 6, "search": "oud"}));
    }
}
