pub mod middleware;

use crate::{
    billing::{BillingClient, cost_explorer::CostExplorerClient},
    cache::{self, CacheHealthChecker},
    config::Config,
    costs::{CostService, CostsPayload},
    error::AppError,
    health::HealthService,
    metrics,
    routes::{create_cost_routes, create_credits_routes, create_health_routes},
    server::middleware::{cors_middleware, request_response_logger},
    shutdown::ShutdownCoordinator,
};
use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub cost_service: Arc<CostService>,
    pub health_service: Arc<HealthService>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    /// Build a server backed by AWS Cost Explorer
    pub async fn new(config: Config) -> Result<Self, AppError> {
        if config.metrics.enabled {
            metrics::init_metrics_with_port(config.metrics.port).map_err(|e| {
                error!(
                    "Failed to start metrics server on port {}: {}",
                    config.metrics.port, e
                );
                AppError::Internal(format!("Failed to start metrics server: {}", e))
            })?;
        }

        info!(
            region = %config.aws.region,
            auth = config.aws.auth_source(),
            "Initializing Cost Explorer client"
        );
        let billing = Arc::new(CostExplorerClient::new(config.aws.clone()).await);

        Ok(Self::with_billing_client(config, billing).await)
    }

    /// Build a server over any billing client
    pub async fn with_billing_client(config: Config, billing: Arc<dyn BillingClient>) -> Self {
        let cache = cache::from_config::<CostsPayload>(&config.cache);
        info!(
            backend = cache.backend(),
            ttl_seconds = config.cache.ttl_seconds,
            max_entries = config.cache.max_entries,
            "Response cache initialized"
        );

        let health_service = Arc::new(HealthService::new());
        health_service.register(billing.health_checker()).await;
        health_service
            .register(Arc::new(CacheHealthChecker::new(
                cache.clone(),
                config.cache.clone(),
            )))
            .await;

        let cost_service = Arc::new(CostService::new(billing, cache));

        Self {
            config: Arc::new(config),
            cost_service,
            health_service,
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let app = self.create_app();

        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid listen address: {}", e)))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to address: {}", e)))?;

        info!(
            allowed_origin = %self.config.cors.allowed_origin,
            "Server listening on http://{}", addr
        );

        let signal_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            signal_coordinator.wait_for_shutdown_signal().await;
        });

        let shutdown_coordinator = self.shutdown_coordinator.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_coordinator.wait().await;
                info!("Graceful shutdown initiated");
            })
            .await
            .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Router with all API routes under `/api`
    pub fn create_app(&self) -> Router {
        let api = create_health_routes()
            .merge(create_cost_routes())
            .merge(create_credits_routes());

        let app = Router::new()
            .nest("/api", api)
            .layer(from_fn_with_state(self.clone(), cors_middleware))
            .with_state(self.clone());

        self.add_conditional_middleware(app)
    }

    fn add_conditional_middleware(&self, mut app: Router) -> Router {
        if self.config.metrics.enabled {
            app = app.layer(from_fn(metrics::metrics_middleware));
        }
        if self.config.logging.log_request {
            app = app.layer(from_fn(request_response_logger));
        }
        app
    }
}
