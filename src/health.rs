use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub details: Option<serde_json::Value>,
    pub duration_ms: Option<u64>,
}

impl HealthCheckResult {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: None,
            details: None,
            duration_ms: None,
        }
    }

    pub fn healthy_with_details(details: serde_json::Value) -> Self {
        Self {
            details: Some(details),
            ..Self::healthy()
        }
    }

    pub fn unhealthy_with_details(message: String, details: serde_json::Value) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message),
            details: Some(details),
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// The name of this health check component
    fn name(&self) -> &str;

    /// Perform the health check
    async fn check(&self) -> HealthCheckResult;

    /// Optional: return static information about this component
    fn info(&self) -> Option<serde_json::Value> {
        None
    }
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HashMap<String, HealthCheckResult>>,
}

#[derive(Default)]
pub struct HealthService {
    checkers: Arc<RwLock<HashMap<String, Arc<dyn HealthChecker>>>>,
}

impl HealthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a health checker for a specific component
    pub async fn register(&self, checker: Arc<dyn HealthChecker>) {
        let name = checker.name().to_string();
        debug!(component = %name, info = ?checker.info(), "Registered health check");
        let mut checkers = self.checkers.write().await;
        checkers.insert(name, checker);
    }

    /// Liveness only without a filter; `"all"` or a component name runs checks
    pub async fn check_health(&self, filter: Option<&str>) -> HealthResponse {
        let Some(filter) = filter else {
            return HealthResponse {
                ok: true,
                checks: None,
            };
        };

        let checkers = self.checkers.read().await;
        let mut results = HashMap::new();

        for (name, checker) in checkers
            .iter()
            .filter(|(name, _)| filter == "all" || name.as_str() == filter)
        {
            let start = Instant::now();
            let result = checker.check().await;
            results.insert(
                name.clone(),
                result.with_duration(start.elapsed().as_millis() as u64),
            );
        }

        let ok = results
            .values()
            .all(|r| r.status != HealthStatus::Unhealthy);

        HealthResponse {
            ok,
            checks: Some(results),
        }
    }
}
