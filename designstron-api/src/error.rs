use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use designstron_catalog::QuoteError;
use designstron_order::OrderError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Rejected calculator input, reported with its error kind
    Quote(QuoteError),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    PaymentGatewayError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, error_message) = match self {
            AppError::Quote(err) => {
                tracing::warn!("Rejected quote request: {}", err);
                (StatusCode::BAD_REQUEST, err.kind(), err.to_string())
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION", msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::PaymentGatewayError(msg) => {
                tracing::error!("Payment gateway error: {}", msg);
                (StatusCode::BAD_GATEWAY, "PAYMENT_GATEWAY", "Payment provider unavailable".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        AppError::Quote(err)
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Quote(err) => AppError::Quote(err),
            OrderError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            OrderError::InvalidTransition { .. }
            | OrderError::ParentNotEligible(_)
            | OrderError::PaymentInProgress(_)
            | OrderError::UnexpectedPayment { .. }
            | OrderError::ConcurrentUpdate(_) => {
                AppError::ConflictError(err.to_string())
            }
            OrderError::InvalidBuyer(_) | OrderError::InvalidMessage(_) => {
                AppError::ValidationError(err.to_string())
            }
            OrderError::Payment(msg) => AppError::PaymentGatewayError(msg),
            OrderError::Money(_) | OrderError::Repository(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}
