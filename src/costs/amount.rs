use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unit reported when upstream omits one
pub const DEFAULT_UNIT: &str = "USD";

/// Parse an upstream amount string, coercing anything unusable to zero.
///
/// Contract:
/// - `None`, empty or whitespace-only input yields `0`
/// - plain decimals (`"12.50"`, `"-3"`) and scientific notation
///   (`"1.5E-7"`) are accepted
/// - any other input yields `0`; this function never fails
pub fn safe_parse_amount(raw: Option<&str>) -> Decimal {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Decimal::ZERO;
    };

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .unwrap_or(Decimal::ZERO)
}

/// A single amount/unit pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub amount: Decimal,
    pub unit: String,
}

impl Metric {
    pub fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
            unit: DEFAULT_UNIT.to_string(),
        }
    }

    pub fn from_raw(amount: Option<&str>, unit: Option<&str>) -> Self {
        Self {
            amount: safe_parse_amount(amount),
            unit: unit
                .filter(|u| !u.is_empty())
                .unwrap_or(DEFAULT_UNIT)
                .to_string(),
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::zero()
    }
}
