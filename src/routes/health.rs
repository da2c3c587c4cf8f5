use crate::{health::HealthResponse, server::Server};
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct HealthCheckQuery {
    #[serde(default)]
    check: Option<String>,
}

/// Liveness at `/health`; `?check=all` or `?check=<component>` also runs
/// the registered component checks.
pub fn create_health_routes() -> Router<Server> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(
    State(server): State<Server>,
    Query(params): Query<HealthCheckQuery>,
) -> Json<HealthResponse> {
    Json(
        server
            .health_service
            .check_health(params.check.as_deref())
            .await,
    )
}
