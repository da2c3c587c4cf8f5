use super::credits::{CreditsPayload, aggregate_credits};
use super::normalizer::normalize_periods;
use super::query::{CostQuery, DATE_FORMAT, credits_request};
use super::summary::classify_record_types;
use super::CostsPayload;
use crate::billing::{BillingClient, BillingResult};
use crate::cache::ResponseCache;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Serves cost and credit reports from the billing API
pub struct CostService {
    billing: Arc<dyn BillingClient>,
    cache: Arc<dyn ResponseCache<CostsPayload>>,
}

impl CostService {
    pub fn new(
        billing: Arc<dyn BillingClient>,
        cache: Arc<dyn ResponseCache<CostsPayload>>,
    ) -> Self {
        Self { billing, cache }
    }

    /// Cost report for `query`, served from cache while fresh.
    /// Upstream failures are returned and never cached.
    pub async fn get_costs(&self, query: &CostQuery) -> BillingResult<CostsPayload> {
        let key = query.cache_key();

        if let Some(cached) = self.cache.get(&key).await {
            debug!(cache_key = %key, "Serving costs from cache");
            return Ok(cached);
        }

        let payload = self.fetch_costs(query).await.inspect_err(|e| {
            error!(cache_key = %key, kind = e.kind(), "Cost query failed: {}", e);
        })?;

        self.cache.set(&key, payload.clone()).await;
        Ok(payload)
    }

    /// Run the detail and record-type summary queries concurrently and
    /// reshape their results. Either query failing fails the whole report.
    pub async fn fetch_costs(&self, query: &CostQuery) -> BillingResult<CostsPayload> {
        let detail_request = query.detail_request();
        let summary_request = query.record_type_summary_request();

        let (detail, summary) = tokio::try_join!(
            self.billing.get_cost_and_usage(&detail_request),
            self.billing.get_cost_and_usage(&summary_request),
        )?;

        info!(
            start = %query.start,
            end = %query.end,
            granularity = %query.granularity,
            group_by = %query.group_by,
            periods = detail.periods.len(),
            "Fetched cost report"
        );

        Ok(CostsPayload {
            start: query.start.format(DATE_FORMAT).to_string(),
            end: query.end.format(DATE_FORMAT).to_string(),
            granularity: query.granularity,
            group_by: query.group_by,
            results: normalize_periods(&detail.periods),
            summary: classify_record_types(&summary.periods),
        })
    }

    /// Credits used over the year before `today`. Upstream failures degrade
    /// to a zero payload.
    pub async fn get_credits(&self, today: NaiveDate) -> CreditsPayload {
        match self.billing.get_cost_and_usage(&credits_request(today)).await {
            Ok(response) => aggregate_credits(&response.periods),
            Err(e) => {
                warn!(kind = e.kind(), "Credits query failed, serving zero payload: {}", e);
                CreditsPayload::zero()
            }
        }
    }
}
