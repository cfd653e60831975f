use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::models::{TelebirrReceiptJson, failure, success};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TelebirrQuery {
    pub transaction_number: Option<String>,
}

/// `GET /api/telebirr?transaction_number=<number>`: ingest a Telebirr
/// HTML receipt.
pub async fn scrape_telebirr(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelebirrQuery>,
) -> impl IntoResponse {
    let Some(number) = query
        .transaction_number
        .filter(|n| !n.trim().is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": "Transaction number is required",
            })),
        );
    };

    tracing::info!(transaction_number = %number, "processing Telebirr receipt");
    match state.pipeline.ingest(&state.telebirr, &number).await {
        Ok(report) => success(TelebirrReceiptJson::from(&report.receipt)),
        Err(err) => {
            tracing::warn!(transaction_number = %number, error = %err, "Telebirr ingestion failed");
            failure(&err)
        }
    }
}
