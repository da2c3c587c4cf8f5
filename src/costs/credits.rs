use super::amount::safe_parse_amount;
use crate::billing::{CostMetric, RawPeriod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Service name used when a credit group carries no key
pub const UNKNOWN_SERVICE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCredit {
    pub service: String,
    pub amount: Decimal,
}

/// Credits consumed over the trailing year, as positive magnitudes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsPayload {
    pub total_used: Decimal,
    pub by_service: Vec<ServiceCredit>,
}

impl CreditsPayload {
    /// Payload served when the upstream query fails
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Sum credit groups per service. Credits are negative upstream; every
/// reported amount is the absolute value of its sum. Services are sorted by
/// amount descending, then by name.
pub fn aggregate_credits(periods: &[RawPeriod]) -> CreditsPayload {
    let metric = CostMetric::UnblendedCost.api_name();
    let mut total = Decimal::ZERO;
    let mut per_service: HashMap<String, Decimal> = HashMap::new();

    for group in periods.iter().flat_map(|period| period.groups.iter()) {
        let service = group
            .keys
            .first()
            .filter(|key| !key.is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_SERVICE.to_string());
        let amount = safe_parse_amount(
            group
                .metrics
                .get(metric)
                .and_then(|value| value.amount.as_deref()),
        );

        total = total.saturating_add(amount);
        let sum = per_service.entry(service).or_default();
        *sum = sum.saturating_add(amount);
    }

    let mut by_service: Vec<ServiceCredit> = per_service
        .into_iter()
        .map(|(service, amount)| ServiceCredit {
            service,
            amount: amount.abs(),
        })
        .collect();
    by_service.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.service.cmp(&b.service))
    });

    CreditsPayload {
        total_used: total.abs(),
        by_service,
    }
}
