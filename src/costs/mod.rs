//! Cost reporting: query building, response reshaping and caching

pub mod amount;
pub mod credits;
pub mod normalizer;
pub mod query;
pub mod service;
pub mod summary;

use crate::billing::Granularity;
use serde::{Deserialize, Serialize};

pub use amount::{Metric, safe_parse_amount};
pub use credits::{CreditsPayload, ServiceCredit, aggregate_credits};
pub use normalizer::{Group, MetricSet, PeriodResult, normalize_periods};
pub use query::{CostQuery, CostsQueryParams, GroupBy, ValidationErrors, credits_request};
pub use service::CostService;
pub use summary::{RecordType, SummaryTotals, classify_record_types};

/// Response of `GET /api/costs`, also the cached unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostsPayload {
    pub start: String,
    pub end: String,
    pub granularity: Granularity,
    pub group_by: GroupBy,
    pub results: Vec<PeriodResult>,
    pub summary: SummaryTotals,
}
