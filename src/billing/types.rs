use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Time bucket size for a billing query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Daily,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "DAILY",
            Granularity::Monthly => "MONTHLY",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream dimensions this service groups or filters by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Service,
    RecordType,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Service => "SERVICE",
            Dimension::RecordType => "RECORD_TYPE",
        }
    }
}

/// Cost metrics offered by the billing API, treated as opaque named values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostMetric {
    UnblendedCost,
    AmortizedCost,
    BlendedCost,
    UsageQuantity,
    NetUnblendedCost,
    NetAmortizedCost,
}

impl CostMetric {
    pub const ALL: [CostMetric; 6] = [
        CostMetric::UnblendedCost,
        CostMetric::AmortizedCost,
        CostMetric::BlendedCost,
        CostMetric::UsageQuantity,
        CostMetric::NetUnblendedCost,
        CostMetric::NetAmortizedCost,
    ];

    /// Name used by the upstream API, both in requests and as response map keys
    pub fn api_name(&self) -> &'static str {
        match self {
            CostMetric::UnblendedCost => "UnblendedCost",
            CostMetric::AmortizedCost => "AmortizedCost",
            CostMetric::BlendedCost => "BlendedCost",
            CostMetric::UsageQuantity => "UsageQuantity",
            CostMetric::NetUnblendedCost => "NetUnblendedCost",
            CostMetric::NetAmortizedCost => "NetAmortizedCost",
        }
    }
}

/// Filter expression subset used by this service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// Dimension value is one of `values`
    In {
        dimension: Dimension,
        values: Vec<String>,
    },
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    pub fn record_types(values: &[&str]) -> Self {
        FilterExpression::In {
            dimension: Dimension::RecordType,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn negate(self) -> Self {
        FilterExpression::Not(Box::new(self))
    }
}

/// A single billing query. `end` is exclusive, as upstream treats it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostAndUsageRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub metrics: Vec<CostMetric>,
    pub group_by: Option<Dimension>,
    pub filter: Option<FilterExpression>,
}

/// Raw amount/unit pair as returned upstream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetricValue {
    pub amount: Option<String>,
    pub unit: Option<String>,
}

impl RawMetricValue {
    pub fn new(amount: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            amount: Some(amount.into()),
            unit: Some(unit.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGroup {
    pub keys: Vec<String>,
    pub metrics: HashMap<String, RawMetricValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPeriod {
    pub start: String,
    pub end: String,
    pub total: HashMap<String, RawMetricValue>,
    pub groups: Vec<RawGroup>,
    pub estimated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostAndUsageResponse {
    pub periods: Vec<RawPeriod>,
}
