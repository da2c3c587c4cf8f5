use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cost_dashboard::billing::mock::fixtures::*;
use cost_dashboard::billing::mock::{MockBillingClient, RequestKind};
use cost_dashboard::test_utils::{TestServerBuilder, response_json};
use tower::ServiceExt;

/// Router over a mock billing API, plus the mock for call inspection
pub struct TestHarness {
    pub app: Router,
    pub billing: MockBillingClient,
}

impl TestHarness {
    pub async fn new(billing: MockBillingClient) -> Self {
        Self::with_builder(TestServerBuilder::new(), billing).await
    }

    pub async fn with_builder(builder: TestServerBuilder, billing: MockBillingClient) -> Self {
        let server = builder.with_billing_client(billing.clone()).build().await;
        Self {
            app: server.create_app(),
            billing,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, response_json(response).await)
    }
}

/// Two daily periods of per-service costs and a matching record-type summary
#[allow(dead_code)]
pub fn january_billing() -> MockBillingClient {
    MockBillingClient::new()
        .with_response(
            RequestKind::Detail,
            response(vec![
                period(
                    "2024-01-01",
                    "2024-01-02",
                    vec![
                        group(
                            "Amazon Elastic Compute Cloud - Compute",
                            all_metrics("10.00", "24"),
                        ),
                        group("Amazon Simple Storage Service", all_metrics("2.50", "512")),
                    ],
                ),
                period(
                    "2024-01-02",
                    "2024-01-03",
                    vec![group(
                        "Amazon Elastic Compute Cloud - Compute",
                        all_metrics("30.00", "72"),
                    )],
                ),
            ]),
        )
        .with_response(
            RequestKind::RecordTypeSummary,
            response(vec![period(
                "2024-01-01",
                "2024-01-03",
                vec![
                    group("Usage", unblended("40.00")),
                    group("Credit", unblended("-12.50")),
                    group("Tax", unblended("25.00")),
                ],
            )]),
        )
}
