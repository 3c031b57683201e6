use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use designstron_catalog::{HostingSelection, QuoteRequest};
use designstron_order::{BuyerData, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, quotes::QuoteRequestBody, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub request: QuoteRequestBody,
    pub buyer: BuyerData,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub session_id: String,
    pub redirect_url: String,
    /// Charged amount in minor units
    pub amount: i64,
    pub currency: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(place_order).get(list_orders))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/checkout", post(start_checkout))
        .route("/v1/orders/{id}/hosting", post(extend_hosting))
        .route("/v1/orders/{id}/status", post(update_status))
        .route("/v1/admin/orders", get(list_orders_by_status))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/orders
/// Submit the summary step. The quote is recomputed from the request.
async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let request = QuoteRequest::try_from(req.request)?;
    let order = state.orders.place_order(request, req.buyer).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/orders?email=
/// Orders of one customer, newest first
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list_orders(&query.email).await?))
}

/// GET /v1/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.get_order(order_id).await?))
}

/// POST /v1/orders/{id}/checkout
/// Open a hosted checkout and return where to redirect the customer
async fn start_checkout(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<CheckoutResponse>, AppError> {
    // 1. Load and check the order can still be paid
    let order = state.orders.get_order(order_id).await?;

    // 2. Ask the gateway for a session
    let session = state.payments.start_checkout(&order).await?;

    // 3. Remember the session so the webhook can find the order
    state.orders.attach_checkout(order_id, &session).await?;

    Ok(Json(CheckoutResponse {
        order_id,
        session_id: session.id,
        redirect_url: session.redirect_url,
        amount: session.amount,
        currency: session.currency,
    }))
}

/// POST /v1/orders/{id}/hosting
/// Buy hosting for a paid website order
async fn extend_hosting(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(hosting): Json<HostingSelection>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.orders.place_hosting_extension(order_id, hosting).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /v1/orders/{id}/status
/// Admin-driven progress: start work, complete, or cancel an unpaid order.
/// Payment states are only reachable through checkout and webhooks.
async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    if !matches!(
        req.status,
        OrderStatus::InProgress | OrderStatus::Completed | OrderStatus::Cancelled
    ) {
        return Err(AppError::ValidationError(format!(
            "Status {:?} cannot be set manually",
            req.status
        )));
    }

    Ok(Json(state.orders.transition(order_id, req.status).await?))
}

/// GET /v1/admin/orders?status=
async fn list_orders_by_status(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list_by_status(query.status).await?))
}
