//! Promotional price resolution.
//!
//! A product may carry promotion terms: an on/off switch, a type (percentage
//! discount or fixed promo price), a value, and a `[start, end]` window. The
//! shop never stores a derived price; every render resolves the display price
//! from the base price, the terms, and the current time.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use jc_closet_core::{PromoTerms, PromoType, resolve_promo};
//! use rust_decimal::Decimal;
//!
//! let terms = PromoTerms {
//!     promo_enabled: true,
//!     promo_type: Some(PromoType::Discount),
//!     promo_value: Some(Decimal::from(20)),
//!     promo_start: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
//!     promo_end: Some(Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap()),
//! };
//! let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
//!
//! let resolved = resolve_promo(Decimal::from(1000), &terms, now);
//! assert_eq!(resolved.display_price, Decimal::from(800));
//! assert_eq!(resolved.promo_label.as_deref(), Some("-20% off"));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Label shown for fixed promo prices.
pub const PROMO_PRICE_LABEL: &str = "Promo Price";

/// Kind of promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromoType {
    /// `promo_value` is a percentage taken off the base price.
    Discount,
    /// `promo_value` replaces the base price.
    Price,
    /// Anything else the backend might send; never applied.
    #[serde(other)]
    Other,
}

/// Promotion terms as projected by the backend (camelCase on the wire).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoTerms {
    #[serde(default)]
    pub promo_enabled: bool,
    #[serde(default)]
    pub promo_type: Option<PromoType>,
    #[serde(default)]
    pub promo_value: Option<Decimal>,
    #[serde(default)]
    pub promo_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub promo_end: Option<DateTime<Utc>>,
}

impl PromoTerms {
    /// Whether the promotion is switched on and `now` lies inside the
    /// inclusive window. A missing bound never matches.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        if !self.promo_enabled {
            return false;
        }
        match (self.promo_start, self.promo_end) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }
}

/// Result of resolving a product's price at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromoResolution {
    /// Price to show and charge.
    pub display_price: Decimal,
    /// The undiscounted base price.
    pub original_price: Decimal,
    /// Whether a promotion changed the price.
    pub promo_active: bool,
    /// Badge text, present only when `promo_active`.
    pub promo_label: Option<String>,
}

impl PromoResolution {
    fn regular(price: Decimal) -> Self {
        Self {
            display_price: price,
            original_price: price,
            promo_active: false,
            promo_label: None,
        }
    }

    /// Amount saved against the original price (zero when no promo applies).
    #[must_use]
    pub fn savings(&self) -> Decimal {
        if self.promo_active {
            self.original_price - self.display_price
        } else {
            Decimal::ZERO
        }
    }
}

/// Resolve the display price for `price` under `terms` at `now`.
///
/// - `Discount`: `round(price * (1 - value / 100))`, label `-{value}% off`
/// - `Price`: `value`, label `Promo Price`
/// - anything else, a disabled promo, or `now` outside the window: the base
///   price with no label
///
/// Values are taken as given: a negative discount or an inverted window is
/// not rejected here.
#[must_use]
pub fn resolve_promo(price: Decimal, terms: &PromoTerms, now: DateTime<Utc>) -> PromoResolution {
    if !terms.is_live(now) {
        return PromoResolution::regular(price);
    }

    let (Some(promo_type), Some(value)) = (terms.promo_type, terms.promo_value) else {
        return PromoResolution::regular(price);
    };

    match promo_type {
        PromoType::Discount => {
            let factor = Decimal::ONE - value / Decimal::ONE_HUNDRED;
            let display_price = (price * factor)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            PromoResolution {
                display_price,
                original_price: price,
                promo_active: true,
                promo_label: Some(format!("-{}% off", value.normalize())),
            }
        }
        PromoType::Price => PromoResolution {
            display_price: value,
            original_price: price,
            promo_active: true,
            promo_label: Some(PROMO_PRICE_LABEL.to_string()),
        },
        PromoType::Other => PromoResolution::regular(price),
    }
}

/// Anything with a base price and promotion terms.
///
/// Implemented by catalogue products and cart lines so both resolve prices
/// the same way.
pub trait PricedProduct {
    /// The undiscounted price.
    fn base_price(&self) -> Decimal;

    /// The promotion terms attached to the product.
    fn promo_terms(&self) -> &PromoTerms;

    /// Resolve the price at `now`.
    fn resolve_price(&self, now: DateTime<Utc>) -> PromoResolution {
        resolve_promo(self.base_price(), self.promo_terms(), now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn terms(promo_type: PromoType, value: i64) -> PromoTerms {
        PromoTerms {
            promo_enabled: true,
            promo_type: Some(promo_type),
            promo_value: Some(Decimal::from(value)),
            promo_start: Some(at(2026, 3, 1)),
            promo_end: Some(at(2026, 3, 31)),
        }
    }

    #[test]
    fn test_disabled_promo_keeps_price_at_any_time() {
        let mut t = terms(PromoType::Discount, 20);
        t.promo_enabled = false;

        for now in [at(2025, 1, 1), at(2026, 3, 15), at(2027, 1, 1)] {
            let resolved = resolve_promo(Decimal::from(1000), &t, now);
            assert_eq!(resolved.display_price, Decimal::from(1000));
            assert!(!resolved.promo_active);
            assert!(resolved.promo_label.is_none());
        }
    }

    #[test]
    fn test_discount_in_window() {
        let resolved = resolve_promo(
            Decimal::from(1000),
            &terms(PromoType::Discount, 20),
            at(2026, 3, 15),
        );
        assert_eq!(resolved.display_price, Decimal::from(800));
        assert_eq!(resolved.original_price, Decimal::from(1000));
        assert!(resolved.promo_active);
        assert_eq!(resolved.promo_label.as_deref(), Some("-20% off"));
        assert_eq!(resolved.savings(), Decimal::from(200));
    }

    #[test]
    fn test_outside_window_is_inactive() {
        let t = terms(PromoType::Discount, 20);
        for now in [at(2026, 2, 28), at(2026, 4, 1)] {
            let resolved = resolve_promo(Decimal::from(1000), &t, now);
            assert!(!resolved.promo_active);
            assert_eq!(resolved.display_price, Decimal::from(1000));
        }
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let t = terms(PromoType::Price, 650);
        let start = t.promo_start.unwrap();
        let end = t.promo_end.unwrap();

        assert!(resolve_promo(Decimal::from(900), &t, start).promo_active);
        assert!(resolve_promo(Decimal::from(900), &t, end).promo_active);
        assert!(!resolve_promo(Decimal::from(900), &t, end + Duration::seconds(1)).promo_active);
    }

    #[test]
    fn test_fixed_promo_price() {
        let resolved = resolve_promo(
            Decimal::from(4500),
            &terms(PromoType::Price, 3999),
            at(2026, 3, 10),
        );
        assert_eq!(resolved.display_price, Decimal::from(3999));
        assert_eq!(resolved.promo_label.as_deref(), Some(PROMO_PRICE_LABEL));
    }

    #[test]
    fn test_discount_rounds_half_away_from_zero() {
        // 1999 * 0.85 = 1699.15 -> 1699; 1250 * 0.5 = 625; 15 * 0.9 = 13.5 -> 14
        let now = at(2026, 3, 10);
        assert_eq!(
            resolve_promo(Decimal::from(1999), &terms(PromoType::Discount, 15), now).display_price,
            Decimal::from(1699)
        );
        assert_eq!(
            resolve_promo(Decimal::from(15), &terms(PromoType::Discount, 10), now).display_price,
            Decimal::from(14)
        );
    }

    #[test]
    fn test_fractional_discount_label() {
        let mut t = terms(PromoType::Discount, 0);
        t.promo_value = Some("12.50".parse().unwrap());
        let resolved = resolve_promo(Decimal::from(1000), &t, at(2026, 3, 10));
        assert_eq!(resolved.promo_label.as_deref(), Some("-12.5% off"));
        assert_eq!(resolved.display_price, Decimal::from(875));
    }

    #[test]
    fn test_missing_window_bound_is_inactive() {
        let mut t = terms(PromoType::Discount, 20);
        t.promo_end = None;
        assert!(!resolve_promo(Decimal::from(1000), &t, at(2026, 3, 10)).promo_active);
    }

    #[test]
    fn test_unknown_type_is_regular_price() {
        let t = terms(PromoType::Other, 20);
        let resolved = resolve_promo(Decimal::from(1000), &t, at(2026, 3, 10));
        assert!(!resolved.promo_active);
        assert_eq!(resolved.display_price, Decimal::from(1000));
    }

    #[test]
    fn test_terms_deserialize_from_backend_shape() {
        let json = r#"{
            "promoEnabled": true,
            "promoType": "discount",
            "promoValue": 20,
            "promoStart": "2026-03-01T00:00:00.000Z",
            "promoEnd": "2026-03-31T23:59:59.000Z"
        }"#;
        let t: PromoTerms = serde_json::from_str(json).unwrap();
        assert!(t.promo_enabled);
        assert_eq!(t.promo_type, Some(PromoType::Discount));
        assert_eq!(t.promo_value, Some(Decimal::from(20)));

        let t: PromoTerms = serde_json::from_str(r#"{"promoType": "bogo"}"#).unwrap();
        assert_eq!(t.promo_type, Some(PromoType::Other));
        assert!(!t.promo_enabled);
    }
}
