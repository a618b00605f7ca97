//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts are in the currency's standard unit (shillings, dollars), never in
/// minor units. Display formatting groups thousands and only shows decimals
/// when the amount has a fractional part, matching how the shop prices its
/// catalogue (`KSh 12,500`, `$19.99`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Format for display, e.g. `KSh 12,500` or `$19.99`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let abs = rounded.abs();

        let whole = abs.trunc();
        let fraction = abs - whole;
        let grouped = group_thousands(&whole.to_string());

        let body = if fraction.is_zero() {
            grouped
        } else {
            let cents = (fraction * Decimal::ONE_HUNDRED).trunc().to_string();
            format!("{grouped}.{cents:0>2}")
        };

        let sign = if negative { "-" } else { "" };
        format!("{sign}{}{body}", self.currency_code.prefix())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `,` separators every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// ISO 4217 currency codes the shop can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    KES,
    USD,
    EUR,
    GBP,
    NGN,
}

impl CurrencyCode {
    /// Display prefix, including a trailing space for alphabetic symbols.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::KES => "KSh ",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::NGN => "₦",
        }
    }

    /// The ISO code as a string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::KES => "KES",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::NGN => "NGN",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KES" => Ok(Self::KES),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "NGN" => Ok(Self::NGN),
            other => Err(format!("unsupported currency code: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_whole_amount_grouped() {
        let price = Price::new(dec("12500"), CurrencyCode::KES);
        assert_eq!(price.display(), "KSh 12,500");
    }

    #[test]
    fn test_display_fractional_amount() {
        let price = Price::new(dec("1019.9"), CurrencyCode::USD);
        assert_eq!(price.display(), "$1,019.90");
    }

    #[test]
    fn test_display_small_and_zero() {
        assert_eq!(Price::new(dec("800"), CurrencyCode::GBP).display(), "£800");
        assert_eq!(Price::zero(CurrencyCode::KES).display(), "KSh 0");
    }

    #[test]
    fn test_display_negative() {
        let price = Price::new(dec("-1500"), CurrencyCode::USD);
        assert_eq!(price.display(), "-$1,500");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("kes".parse::<CurrencyCode>(), Ok(CurrencyCode::KES));
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
