use axum::{extract::State, routing::{get, post}, Json, Router};
use designstron_catalog::{HostingSelection, PriceCatalog, Quote, QuoteError, QuoteRequest};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Calculator input as sent by the browser. The page count is taken as any
/// JSON number so that fractional values are reported as quote errors.
#[derive(Debug, Deserialize)]
pub struct QuoteRequestBody {
    pub package_id: String,
    pub page_count: serde_json::Number,
    #[serde(default)]
    pub selected_add_ons: Vec<String>,
    #[serde(default)]
    pub hosting: Option<HostingSelection>,
}

impl TryFrom<QuoteRequestBody> for QuoteRequest {
    type Error = QuoteError;

    fn try_from(body: QuoteRequestBody) -> Result<Self, Self::Error> {
        let page_count = body
            .page_count
            .as_i64()
            .ok_or_else(|| QuoteError::InvalidPageCount(body.page_count.to_string()))?;

        Ok(QuoteRequest {
            package_id: body.package_id,
            page_count,
            selected_add_ons: body.selected_add_ons,
            hosting: body.hosting,
        })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/catalog", get(get_catalog))
        .route("/v1/quotes", post(create_quote))
        .route("/v1/quotes/hosting", post(create_hosting_quote))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/catalog
/// Price table the calculator works from
async fn get_catalog(State(state): State<AppState>) -> Json<PriceCatalog> {
    Json(state.pricing.catalog().clone())
}

/// POST /v1/quotes
/// Price a package + pages + add-ons + hosting selection
async fn create_quote(
    State(state): State<AppState>,
    Json(body): Json<QuoteRequestBody>,
) -> Result<Json<Quote>, AppError> {
    let request = QuoteRequest::try_from(body)?;
    let quote = state.pricing.quote(&request)?;
    Ok(Json(quote))
}

/// POST /v1/quotes/hosting
/// Price hosting alone (hosting extension from the customer panel)
async fn create_hosting_quote(
    State(state): State<AppState>,
    Json(hosting): Json<HostingSelection>,
) -> Result<Json<Quote>, AppError> {
    Ok(Json(state.pricing.hosting_quote(&hosting)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(page_count: serde_json::Value) -> QuoteRequestBody {
        serde_json::from_value(serde_json::json!({
            "package_id": "basic",
            "page_count": page_count,
        }))
        .unwrap()
    }

    #[test]
    fn test_integer_page_count() {
        let request = QuoteRequest::try_from(body(serde_json::json!(7))).unwrap();
        assert_eq!(request.page_count, 7);
        assert!(request.selected_add_ons.is_empty());
    }

    #[test]
    fn test_fractional_page_count() {
        let err = QuoteRequest::try_from(body(serde_json::json!(3.5))).unwrap_err();
        assert_eq!(err, QuoteError::InvalidPageCount("3.5".to_string()));
    }
}
