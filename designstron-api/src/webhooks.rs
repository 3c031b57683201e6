use axum::{extract::State, routing::post, Json, Router};
use designstron_order::Order;
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

/// Notification sent by the payment provider when a checkout changes state.
/// Only the session id is trusted; the status is re-read from the gateway.
#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    pub session_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(handle_payment_webhook))
}

/// POST /v1/webhooks/payments
async fn handle_payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> Result<Json<Order>, AppError> {
    tracing::info!("Received payment webhook for checkout {}", payload.session_id);

    // 1. Ask the gateway for the real state of the checkout
    let session = state.payments.process_status_update(&payload.session_id).await?;

    // 2. Reflect it onto the order
    let order = state.orders.apply_payment_status(&session).await?;

    Ok(Json(order))
}
