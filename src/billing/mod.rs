//! Billing API client seam
//!
//! The rest of the crate talks to the billing API only through the
//! [`BillingClient`] trait, using the request/response types in [`types`].
//! [`cost_explorer::CostExplorerClient`] is the AWS implementation and
//! [`mock::MockBillingClient`] serves canned responses for tests.

pub mod config;
pub mod cost_explorer;
pub mod mock;
pub mod types;

use crate::health::HealthChecker;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use types::{
    CostAndUsageRequest, CostAndUsageResponse, CostMetric, Dimension, FilterExpression,
    Granularity, RawGroup, RawMetricValue, RawPeriod,
};

/// Billing API error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// Error reported by the billing service itself, with its error code
    #[error("{code}: {message}")]
    Service { code: String, message: String },
    /// The request could not be built or sent
    #[error("Request error: {0}")]
    Request(String),
}

impl BillingError {
    /// Short error kind surfaced to API callers
    pub fn kind(&self) -> &str {
        match self {
            BillingError::Service { code, .. } => code,
            BillingError::Request(_) => "RequestError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BillingError::Service { message, .. } => message,
            BillingError::Request(message) => message,
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;

#[async_trait]
pub trait BillingClient: Send + Sync {
    /// Run a cost-and-usage query, following pagination to the end
    async fn get_cost_and_usage(
        &self,
        request: &CostAndUsageRequest,
    ) -> BillingResult<CostAndUsageResponse>;

    /// Health checker for this client
    fn health_checker(&self) -> Arc<dyn HealthChecker>;
}
