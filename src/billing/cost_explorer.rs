use super::config::AwsConfig;
use super::{
    BillingClient, BillingError, BillingResult, CostAndUsageRequest, CostAndUsageResponse,
    Dimension, FilterExpression, Granularity, RawGroup, RawMetricValue, RawPeriod,
};
use crate::health::{HealthCheckResult, HealthChecker};
use crate::metrics;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_costexplorer::Client;
use aws_sdk_costexplorer::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_costexplorer::operation::get_cost_and_usage::GetCostAndUsageError;
use aws_sdk_costexplorer::types::{
    DateInterval, Dimension as CeDimension, DimensionValues, Expression,
    Granularity as CeGranularity, GroupDefinition, GroupDefinitionType, MetricValue, ResultByTime,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// AWS Cost Explorer backed billing client
#[derive(Clone)]
pub struct CostExplorerClient {
    client: Client,
    sdk_config: SdkConfig,
    config: AwsConfig,
}

impl CostExplorerClient {
    pub async fn new(config: AwsConfig) -> Self {
        let sdk_config = config.build_sdk_config().await;
        Self::from_sdk_config(config, sdk_config)
    }

    pub fn from_sdk_config(config: AwsConfig, sdk_config: SdkConfig) -> Self {
        Self {
            client: Client::new(&sdk_config),
            sdk_config,
            config,
        }
    }

    /// Check that credentials resolve; does not call the billing API
    pub async fn health_check(&self) -> Result<(), String> {
        let provider = self
            .sdk_config
            .credentials_provider()
            .ok_or_else(|| "No credential provider available".to_string())?;

        provider
            .provide_credentials()
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to resolve credentials: {}", e))
    }
}

#[async_trait]
impl BillingClient for CostExplorerClient {
    async fn get_cost_and_usage(
        &self,
        request: &CostAndUsageRequest,
    ) -> BillingResult<CostAndUsageResponse> {
        let time_period = DateInterval::builder()
            .start(request.start.format("%Y-%m-%d").to_string())
            .end(request.end.format("%Y-%m-%d").to_string())
            .build()
            .map_err(|e| BillingError::Request(e.to_string()))?;
        let metrics_names: Vec<String> = request
            .metrics
            .iter()
            .map(|m| m.api_name().to_string())
            .collect();
        let group_by = request.group_by.map(|dimension| {
            vec![
                GroupDefinition::builder()
                    .r#type(GroupDefinitionType::Dimension)
                    .key(dimension.as_str())
                    .build(),
            ]
        });
        let filter = request.filter.as_ref().map(to_sdk_expression);

        let started = Instant::now();
        let mut periods = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let result = self
                .client
                .get_cost_and_usage()
                .time_period(time_period.clone())
                .granularity(to_sdk_granularity(request.granularity))
                .set_metrics(Some(metrics_names.clone()))
                .set_group_by(group_by.clone())
                .set_filter(filter.clone())
                .set_next_page_token(next_page_token.take())
                .send()
                .await;

            let output = match result {
                Ok(output) => output,
                Err(err) => {
                    metrics::track_billing_call("GetCostAndUsage", false, started.elapsed());
                    return Err(into_billing_error(err));
                }
            };
            pages += 1;

            periods.extend(
                output
                    .results_by_time
                    .unwrap_or_default()
                    .into_iter()
                    .map(from_sdk_period),
            );

            match output.next_page_token {
                Some(token) if !token.is_empty() => next_page_token = Some(token),
                _ => break,
            }
        }

        metrics::track_billing_call("GetCostAndUsage", true, started.elapsed());
        debug!(
            pages = pages,
            periods = periods.len(),
            granularity = %request.granularity,
            "Cost Explorer query completed"
        );

        Ok(CostAndUsageResponse { periods })
    }

    fn health_checker(&self) -> Arc<dyn HealthChecker> {
        Arc::new(CostExplorerHealthChecker {
            client: self.clone(),
        })
    }
}

fn to_sdk_granularity(granularity: Granularity) -> CeGranularity {
    match granularity {
        Granularity::Daily => CeGranularity::Daily,
        Granularity::Monthly => CeGranularity::Monthly,
    }
}

fn to_sdk_dimension(dimension: Dimension) -> CeDimension {
    match dimension {
        Dimension::Service => CeDimension::Service,
        Dimension::RecordType => CeDimension::RecordType,
    }
}

fn to_sdk_expression(expression: &FilterExpression) -> Expression {
    match expression {
        FilterExpression::In { dimension, values } => Expression::builder()
            .dimensions(
                DimensionValues::builder()
                    .key(to_sdk_dimension(*dimension))
                    .set_values(Some(values.clone()))
                    .build(),
            )
            .build(),
        FilterExpression::Not(inner) => Expression::builder()
            .not(to_sdk_expression(inner))
            .build(),
    }
}

fn from_sdk_metrics(metrics: Option<HashMap<String, MetricValue>>) -> HashMap<String, RawMetricValue> {
    metrics
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| {
            (
                name,
                RawMetricValue {
                    amount: value.amount,
                    unit: value.unit,
                },
            )
        })
        .collect()
}

fn from_sdk_period(result: ResultByTime) -> RawPeriod {
    let (start, end) = result
        .time_period
        .map(|period| (period.start, period.end))
        .unwrap_or_default();

    RawPeriod {
        start,
        end,
        total: from_sdk_metrics(result.total),
        groups: result
            .groups
            .unwrap_or_default()
            .into_iter()
            .map(|group| RawGroup {
                keys: group.keys.unwrap_or_default(),
                metrics: from_sdk_metrics(group.metrics),
            })
            .collect(),
        estimated: result.estimated,
    }
}

fn into_billing_error(err: SdkError<GetCostAndUsageError>) -> BillingError {
    match err.as_service_error() {
        Some(service_err) => BillingError::Service {
            code: service_err.code().unwrap_or("BillingApiError").to_string(),
            message: service_err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(service_err).to_string()),
        },
        None => BillingError::Request(DisplayErrorContext(&err).to_string()),
    }
}

/// Health checker for the Cost Explorer connection
pub struct CostExplorerHealthChecker {
    client: CostExplorerClient,
}

#[async_trait]
impl HealthChecker for CostExplorerHealthChecker {
    fn name(&self) -> &str {
        "cost_explorer"
    }

    async fn check(&self) -> HealthCheckResult {
        match self.client.health_check().await {
            Ok(()) => HealthCheckResult::healthy_with_details(serde_json::json!({
                "region": self.client.config.region,
                "authentication": self.client.config.auth_source(),
            })),
            Err(err) => HealthCheckResult::unhealthy_with_details(
                "AWS credentials not available".to_string(),
                serde_json::json!({
                    "error": err,
                    "region": self.client.config.region,
                }),
            ),
        }
    }

    fn info(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "service": "AWS Cost Explorer",
            "region": self.client.config.region,
        }))
    }
}
