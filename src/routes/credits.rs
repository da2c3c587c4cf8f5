use crate::{costs::CreditsPayload, server::Server};
use axum::{Router, extract::State, response::Json, routing::get};
use chrono::Utc;

pub fn create_credits_routes() -> Router<Server> {
    Router::new().route("/credits", get(get_credits))
}

/// Credits consumed over the trailing year; upstream failures yield zeros
async fn get_credits(State(server): State<Server>) -> Json<CreditsPayload> {
    Json(
        server
            .cost_service
            .get_credits(Utc::now().date_naive())
            .await,
    )
}
