use crate::{
    costs::{CostQuery, CostsPayload, CostsQueryParams, ValidationErrors},
    error::AppError,
    server::Server,
};
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
    routing::get,
};
use chrono::Utc;

pub fn create_cost_routes() -> Router<Server> {
    Router::new().route("/costs", get(get_costs))
}

/// Cost report for a date range. Invalid parameters are rejected before
/// the billing API is called.
async fn get_costs(
    State(server): State<Server>,
    params: Result<Query<CostsQueryParams>, QueryRejection>,
) -> Result<Json<CostsPayload>, AppError> {
    let Query(params) = params.map_err(query_string_errors)?;
    let query = CostQuery::from_params(&params, Utc::now().date_naive())?;
    let payload = server.cost_service.get_costs(&query).await?;
    Ok(Json(payload))
}

const QUERY_FIELDS: [&str; 4] = ["start", "end", "granularity", "groupBy"];

/// Field-level errors for a query string that does not deserialize, such as
/// a repeated parameter. Reported under the offending field when the
/// rejection names one, otherwise under `query`.
fn query_string_errors(rejection: QueryRejection) -> ValidationErrors {
    let message = rejection.body_text();
    let field = message
        .split('`')
        .nth(1)
        .filter(|field| QUERY_FIELDS.contains(field))
        .unwrap_or("query");

    let mut errors = ValidationErrors::default();
    errors.add(field, message.as_str());
    errors
}
