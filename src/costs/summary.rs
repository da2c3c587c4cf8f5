use super::amount::safe_parse_amount;
use crate::billing::{CostMetric, RawPeriod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing record type, matched exactly against the upstream dimension value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordType {
    Usage,
    Credit,
    Tax,
    Refund,
    /// Any other record type (support fees, discounts, ...)
    Other(String),
}

impl RecordType {
    pub fn from_dimension(value: &str) -> Self {
        match value {
            "Usage" => RecordType::Usage,
            "Credit" => RecordType::Credit,
            "Tax" => RecordType::Tax,
            "Refund" => RecordType::Refund,
            other => RecordType::Other(other.to_string()),
        }
    }
}

/// Record-type breakdown of a query range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub usage: Decimal,
    pub credit: Decimal,
    pub tax: Decimal,
    pub refund: Decimal,
    pub other: Decimal,
    /// Sum of every record-type amount, accumulated independently
    pub total: Decimal,
}

impl SummaryTotals {
    /// Accumulate `amount`; sums saturate at the `Decimal` bounds
    pub fn add(&mut self, record_type: &RecordType, amount: Decimal) {
        self.total = self.total.saturating_add(amount);
        let bucket = match record_type {
            RecordType::Usage => &mut self.usage,
            RecordType::Credit => &mut self.credit,
            RecordType::Tax => &mut self.tax,
            RecordType::Refund => &mut self.refund,
            RecordType::Other(_) => &mut self.other,
        };
        *bucket = bucket.saturating_add(amount);
    }
}

/// Classify the record-type summary query's groups into category totals
pub fn classify_record_types(periods: &[RawPeriod]) -> SummaryTotals {
    let metric = CostMetric::UnblendedCost.api_name();
    let mut totals = SummaryTotals::default();

    for group in periods.iter().flat_map(|period| period.groups.iter()) {
        let record_type = RecordType::from_dimension(
            group.keys.first().map(String::as_str).unwrap_or_default(),
        );
        let amount = safe_parse_amount(
            group
                .metrics
                .get(metric)
                .and_then(|value| value.amount.as_deref()),
        );
        totals.add(&record_type, amount);
    }

    totals
}
