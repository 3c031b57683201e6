use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use designstron_catalog::QuoteRequest;

use crate::{error::AppError, quotes::QuoteRequestBody, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/drafts/{key}",
        get(load_draft).put(save_draft).delete(delete_draft),
    )
}

/// PUT /v1/drafts/{key}
/// Autosave the calculator state. Drafts may be incomplete, so they are
/// stored without pricing them.
async fn save_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<QuoteRequestBody>,
) -> Result<StatusCode, AppError> {
    let request = QuoteRequest::try_from(body)?;
    state
        .drafts
        .save_draft(&key, &request)
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    tracing::debug!("Saved draft {}", key);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/drafts/{key}
async fn load_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<QuoteRequest>, AppError> {
    let draft = state
        .drafts
        .load_draft(&key)
        .await
        .map_err(|e| anyhow::anyhow!(e))?
        .ok_or_else(|| AppError::NotFoundError(format!("Draft not found: {}", key)))?;
    Ok(Json(draft))
}

/// DELETE /v1/drafts/{key}
async fn delete_draft(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = state
        .drafts
        .delete_draft(&key)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError(format!("Draft not found: {}", key)))
    }
}
