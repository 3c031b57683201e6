use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use designstron_order::{Message, MessageAuthor};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub author: MessageAuthor,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub reader: MessageAuthor,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub marked: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders/{id}/messages", get(list_messages).post(post_message))
        .route("/v1/orders/{id}/messages/read", post(mark_read))
}

/// GET /v1/orders/{id}/messages
async fn list_messages(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(state.messages.thread(order_id).await?))
}

/// POST /v1/orders/{id}/messages
async fn post_message(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = state.messages.post(order_id, req.author, &req.body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /v1/orders/{id}/messages/read
async fn mark_read(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let marked = state.messages.mark_read(order_id, req.reader).await?;
    Ok(Json(MarkReadResponse { marked }))
}
