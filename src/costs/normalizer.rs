use super::amount::Metric;
use crate::billing::{CostMetric, RawMetricValue, RawPeriod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The six cost metrics, always fully populated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSet {
    pub unblended: Metric,
    pub amortized: Metric,
    pub blended: Metric,
    pub usage: Metric,
    pub net_unblended: Metric,
    pub net_amortized: Metric,
}

impl MetricSet {
    /// Build from an upstream metric map; absent metrics become zero USD
    pub fn from_raw(raw: &HashMap<String, RawMetricValue>) -> Self {
        let lookup = |metric: CostMetric| {
            raw.get(metric.api_name())
                .map(|value| Metric::from_raw(value.amount.as_deref(), value.unit.as_deref()))
                .unwrap_or_default()
        };

        Self {
            unblended: lookup(CostMetric::UnblendedCost),
            amortized: lookup(CostMetric::AmortizedCost),
            blended: lookup(CostMetric::BlendedCost),
            usage: lookup(CostMetric::UsageQuantity),
            net_unblended: lookup(CostMetric::NetUnblendedCost),
            net_amortized: lookup(CostMetric::NetAmortizedCost),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub keys: Vec<String>,
    pub metrics: MetricSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodResult {
    pub start: String,
    pub end: String,
    pub total: MetricSet,
    pub groups: Vec<Group>,
}

/// Normalize detail-query periods, keeping upstream order of periods and groups
pub fn normalize_periods(periods: &[RawPeriod]) -> Vec<PeriodResult> {
    periods
        .iter()
        .map(|period| PeriodResult {
            start: period.start.clone(),
            end: period.end.clone(),
            total: MetricSet::from_raw(&period.total),
            groups: period
                .groups
                .iter()
                .map(|group| Group {
                    keys: group.keys.clone(),
                    metrics: MetricSet::from_raw(&group.metrics),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::mock::fixtures::{all_metrics, group, period};
    use rust_decimal::Decimal;

    #[test]
    fn test_missing_usage_quantity_becomes_zero_usd() {
        let mut metrics = all_metrics("4.20", "10");
        metrics.remove("UsageQuantity");

        let results = normalize_periods(&[period(
            "2024-01-01",
            "2024-01-02",
            vec![group("Amazon EC2", metrics)],
        )]);

        let usage = &results[0].groups[0].metrics.usage;
        assert_eq!(usage.amount, Decimal::ZERO);
        assert_eq!(usage.unit, "USD");
        assert_eq!(
            results[0].groups[0].metrics.unblended.amount,
            Decimal::new(420, 2)
        );
    }

    #[test]
    fn test_empty_total_is_fully_populated() {
        let results = normalize_periods(&[period("2024-01-01", "2024-01-02", vec![])]);
        assert_eq!(results[0].total, MetricSet::default());
        assert!(results[0].groups.is_empty());
    }

    #[test]
    fn test_non_numeric_amount_is_zero() {
        let mut metrics = all_metrics("1.00", "1");
        metrics.insert(
            "BlendedCost".to_string(),
            RawMetricValue {
                amount: Some("n/a".to_string()),
                unit: None,
            },
        );
        let set = MetricSet::from_raw(&metrics);
        assert_eq!(set.blended, Metric::zero());
        assert_eq!(set.usage.unit, "N/A");
    }

    #[test]
    fn test_preserves_upstream_order() {
        let results = normalize_periods(&[
            period(
                "2024-01-02",
                "2024-01-03",
                vec![
                    group("S3", all_metrics("1", "1")),
                    group("EC2", all_metrics("9", "1")),
                ],
            ),
            period("2024-01-01", "2024-01-02", vec![]),
        ]);

        assert_eq!(results[0].start, "2024-01-02");
        assert_eq!(results[1].start, "2024-01-01");
        assert_eq!(results[0].groups[0].keys, vec!["S3".to_string()]);
        assert_eq!(results[0].groups[1].keys, vec!["EC2".to_string()]);
    }

    #[test]
    fn test_metric_set_json_keys() {
        let json = serde_json::to_value(MetricSet::default()).unwrap();
        for key in [
            "unblended",
            "amortized",
            "blended",
            "usage",
            "netUnblended",
            "netAmortized",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(json["usage"]["unit"], "USD");
    }
}
