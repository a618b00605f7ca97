//! Promotion price preview.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use jc_closet_core::{CurrencyCode, Price, PromoTerms, PromoType, resolve_promo};
use rust_decimal::Decimal;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromoKind {
    /// Percentage off
    Discount,
    /// Fixed promo price
    Price,
}

impl From<PromoKind> for PromoType {
    fn from(kind: PromoKind) -> Self {
        match kind {
            PromoKind::Discount => Self::Discount,
            PromoKind::Price => Self::Price,
        }
    }
}

#[must_use]
pub fn terms(
    kind: PromoKind,
    value: Decimal,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    enabled: bool,
) -> PromoTerms {
    PromoTerms {
        promo_enabled: enabled,
        promo_type: Some(kind.into()),
        promo_value: Some(value),
        promo_start: Some(start),
        promo_end: Some(end),
    }
}

/// Log what shoppers would see at `at`.
pub fn preview(price: Decimal, terms: &PromoTerms, at: DateTime<Utc>, currency: CurrencyCode) {
    let resolved = resolve_promo(price, terms, at);
    let money = |amount| Price::new(amount, currency).display();

    info!("Evaluated at {}", at.to_rfc3339());
    info!("  Regular price: {}", money(resolved.original_price));
    info!("  Shoppers pay:  {}", money(resolved.display_price));
    match resolved.promo_label {
        Some(label) if resolved.promo_active => info!("  Badge:         {label}"),
        _ => info!("  Promotion is not live at this time"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_terms_from_flags() {
        let start = Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 11, 30, 0, 0, 0).unwrap();
        let terms = terms(PromoKind::Discount, Decimal::from(20), start, end, true);

        let inside = Utc.with_ymd_and_hms(2026, 11, 15, 0, 0, 0).unwrap();
        let resolved = resolve_promo(Decimal::from(1000), &terms, inside);
        assert_eq!(resolved.display_price, Decimal::from(800));

        let off = super::terms(PromoKind::Price, Decimal::from(500), start, end, false);
        assert!(!resolve_promo(Decimal::from(1000), &off, inside).promo_active);
    }
}
