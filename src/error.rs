use crate::billing::BillingError;
use crate::costs::ValidationErrors;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid query: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Billing API error: {0}")]
    Billing(#[from] BillingError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Invalid query",
                    "details": details
                }),
            ),
            AppError::Billing(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": err.kind(),
                    "message": err.message()
                }),
            ),
            AppError::Config(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Internal server error",
                    "message": self.to_string()
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::{CostQuery, CostsQueryParams};
    use chrono::NaiveDate;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let internal_err = AppError::Internal("test message".to_string());
        assert_eq!(internal_err.to_string(), "Internal error: test message");

        let billing_err = AppError::from(BillingError::Request("timed out".to_string()));
        assert_eq!(
            billing_err.to_string(),
            "Billing API error: Request error: timed out"
        );
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let params = CostsQueryParams {
            granularity: Some("WEEKLY".to_string()),
            ..Default::default()
        };
        let errors =
            CostQuery::from_params(&params, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
                .unwrap_err();

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid query");
        assert_eq!(
            json["details"]["granularity"][0],
            "must be one of DAILY, MONTHLY"
        );
    }

    #[tokio::test]
    async fn test_billing_error_response() {
        let response = AppError::from(BillingError::Service {
            code: "LimitExceededException".to_string(),
            message: "slow down".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "LimitExceededException");
        assert_eq!(json["message"], "slow down");
    }

    #[tokio::test]
    async fn test_internal_error_response() {
        let response = AppError::Internal("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
