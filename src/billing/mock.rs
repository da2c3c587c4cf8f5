use super::{
    BillingClient, BillingError, BillingResult, CostAndUsageRequest, CostAndUsageResponse,
    Dimension, FilterExpression, RawGroup, RawMetricValue, RawPeriod,
};
use crate::health::{HealthCheckResult, HealthChecker};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Which of the service's query shapes a request is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Cost detail query (record types Credit/Refund excluded)
    Detail,
    /// Monthly breakdown grouped by record type
    RecordTypeSummary,
    /// Credits-only query
    Credits,
}

impl RequestKind {
    pub fn of(request: &CostAndUsageRequest) -> Self {
        match (&request.group_by, &request.filter) {
            (Some(Dimension::RecordType), _) => RequestKind::RecordTypeSummary,
            (_, Some(FilterExpression::In { .. })) => RequestKind::Credits,
            _ => RequestKind::Detail,
        }
    }
}

/// Mock billing client returning canned responses per request kind
#[derive(Clone, Default)]
pub struct MockBillingClient {
    responses: Arc<Mutex<HashMap<RequestKind, CostAndUsageResponse>>>,
    failures: Arc<Mutex<HashMap<RequestKind, BillingError>>>,
    requests: Arc<Mutex<Vec<CostAndUsageRequest>>>,
    calls: Arc<AtomicUsize>,
}

impl MockBillingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for every request of `kind`
    pub fn with_response(self, kind: RequestKind, response: CostAndUsageResponse) -> Self {
        self.set_response(kind, response);
        self
    }

    /// Fail every request of `kind` with `error`
    pub fn with_failure(self, kind: RequestKind, error: BillingError) -> Self {
        self.failures.lock().unwrap().insert(kind, error);
        self
    }

    /// Fail every request regardless of kind
    pub fn failing(error: BillingError) -> Self {
        Self::new()
            .with_failure(RequestKind::Detail, error.clone())
            .with_failure(RequestKind::RecordTypeSummary, error.clone())
            .with_failure(RequestKind::Credits, error)
    }

    pub fn set_response(&self, kind: RequestKind, response: CostAndUsageResponse) {
        self.responses.lock().unwrap().insert(kind, response);
    }

    /// Total number of upstream calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All requests received, in arrival order
    pub fn requests(&self) -> Vec<CostAndUsageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingClient for MockBillingClient {
    async fn get_cost_and_usage(
        &self,
        request: &CostAndUsageRequest,
    ) -> BillingResult<CostAndUsageResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let kind = RequestKind::of(request);
        if let Some(error) = self.failures.lock().unwrap().get(&kind) {
            return Err(error.clone());
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    fn health_checker(&self) -> Arc<dyn HealthChecker> {
        Arc::new(MockHealthChecker)
    }
}

struct MockHealthChecker;

#[async_trait]
impl HealthChecker for MockHealthChecker {
    fn name(&self) -> &str {
        "cost_explorer"
    }

    async fn check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy_with_details(serde_json::json!({ "backend": "mock" }))
    }
}

/// Builders for canned upstream data
pub mod fixtures {
    use super::*;

    /// Metric map holding a single `UnblendedCost` amount
    pub fn unblended(amount: &str) -> HashMap<String, RawMetricValue> {
        HashMap::from([(
            "UnblendedCost".to_string(),
            RawMetricValue::new(amount, "USD"),
        )])
    }

    /// Metric map with every cost metric set to `amount` and usage to `usage`
    pub fn all_metrics(amount: &str, usage: &str) -> HashMap<String, RawMetricValue> {
        let mut metrics: HashMap<String, RawMetricValue> = [
            "UnblendedCost",
            "AmortizedCost",
            "BlendedCost",
            "NetUnblendedCost",
            "NetAmortizedCost",
        ]
        .into_iter()
        .map(|name| (name.to_string(), RawMetricValue::new(amount, "USD")))
        .collect();
        metrics.insert(
            "UsageQuantity".to_string(),
            RawMetricValue::new(usage, "N/A"),
        );
        metrics
    }

    pub fn group(key: &str, metrics: HashMap<String, RawMetricValue>) -> RawGroup {
        RawGroup {
            keys: vec![key.to_string()],
            metrics,
        }
    }

    pub fn period(start: &str, end: &str, groups: Vec<RawGroup>) -> RawPeriod {
        RawPeriod {
            start: start.to_string(),
            end: end.to_string(),
            total: HashMap::new(),
            groups,
            estimated: false,
        }
    }

    pub fn response(periods: Vec<RawPeriod>) -> CostAndUsageResponse {
        CostAndUsageResponse { periods }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::billing::{CostMetric, Granularity};
    use chrono::NaiveDate;

    fn request(group_by: Option<Dimension>, filter: Option<FilterExpression>) -> CostAndUsageRequest {
        CostAndUsageRequest {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            granularity: Granularity::Monthly,
            metrics: vec![CostMetric::UnblendedCost],
            group_by,
            filter,
        }
    }

    #[test]
    fn test_request_kind_detection() {
        let detail = request(
            Some(Dimension::Service),
            Some(FilterExpression::record_types(&["Credit", "Refund"]).negate()),
        );
        let summary = request(Some(Dimension::RecordType), None);
        let credits = request(
            Some(Dimension::Service),
            Some(FilterExpression::record_types(&["Credit"])),
        );

        assert_eq!(RequestKind::of(&detail), RequestKind::Detail);
        assert_eq!(RequestKind::of(&summary), RequestKind::RecordTypeSummary);
        assert_eq!(RequestKind::of(&credits), RequestKind::Credits);
    }

    #[tokio::test]
    async fn test_mock_serves_canned_response_and_counts_calls() {
        let canned = response(vec![period(
            "2024-01-01",
            "2024-02-01",
            vec![group("Usage", unblended("1.00"))],
        )]);
        let mock = MockBillingClient::new().with_response(RequestKind::RecordTypeSummary, canned.clone());

        let result = mock
            .get_cost_and_usage(&request(Some(Dimension::RecordType), None))
            .await
            .unwrap();
        assert_eq!(result, canned);

        let empty = mock.get_cost_and_usage(&request(None, None)).await.unwrap();
        assert!(empty.periods.is_empty());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockBillingClient::failing(BillingError::Request("boom".to_string()));
        let result = mock.get_cost_and_usage(&request(None, None)).await;
        assert_eq!(result, Err(BillingError::Request("boom".to_string())));
        assert_eq!(mock.call_count(), 1);
    }
}
