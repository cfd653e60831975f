use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::models::{CbeReceiptJson, failure, success};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CbeQuery {
    pub id: Option<String>,
}

/// `GET /api/cbe?id=<receipt id>`: ingest a CBE PDF receipt.
pub async fn scrape_cbe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CbeQuery>,
) -> impl IntoResponse {
    let Some(id) = query.id.filter(|id| !id.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "success": false, "error": "Missing receipt ID" })),
        );
    };

    tracing::info!(receipt_id = %id, "processing CBE receipt");
    match state.pipeline.ingest(&state.cbe, &id).await {
        Ok(report) => success(CbeReceiptJson::from(&report.receipt)),
        Err(err) => {
            tracing::warn!(receipt_id = %id, error = %err, "CBE ingestion failed");
            failure(&err)
        }
    }
}
