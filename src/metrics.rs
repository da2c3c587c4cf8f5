use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

/// Install the Prometheus recorder and its scrape listener on `port`
pub fn init_metrics_with_port(port: u16) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .add_global_label("service", "cost_dashboard")
        .install()?;

    info!("Metrics server started on :{}/metrics", port);
    Ok(())
}

/// Middleware to collect HTTP request metrics
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    gauge!("http_requests_active").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active").decrement(1.0);

    let status = response.status();
    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status.as_str().to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());

    if status.is_server_error() {
        counter!("http_errors_total", &labels[..2]).increment(1);
    }

    response
}

/// Track billing API calls
pub fn track_billing_call(operation: &'static str, success: bool, duration: Duration) {
    let result = if success { "success" } else { "failure" };

    counter!("billing_requests_total", "operation" => operation, "result" => result).increment(1);
    histogram!("billing_request_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}

/// Track cache operations
pub fn track_cache_operation(operation: &'static str, backend: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("cache_operations_total",
        "operation" => operation,
        "backend" => backend,
        "result" => result
    )
    .increment(1);
}

/// Update cache size metrics
pub fn update_cache_size(backend: &'static str, size: usize) {
    gauge!("cache_size_entries", "backend" => backend).set(size as f64);
}
