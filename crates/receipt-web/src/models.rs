//! Response assembly: pipeline outcomes mapped to the uniform
//! `{ success, data?, error?, details? }` envelope.
//!
//! The success path never carries raw document bytes or internal error
//! text; internal failures return a generic message with the cause string
//! in `details` (the full context goes to the logs).

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use receipt_core::{ExtractedReceipt, Outcome, PipelineError};

/// Successful CBE extraction, as returned to the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CbeReceiptJson {
    pub payer_name: Option<String>,
    pub receiver_name: Option<String>,
    /// Integer minor units (cents of ETB).
    pub amount: i64,
    pub transaction_number: String,
}

impl From<&ExtractedReceipt> for CbeReceiptJson {
    fn from(receipt: &ExtractedReceipt) -> Self {
        Self {
            payer_name: receipt.payer_name.clone(),
            receiver_name: receipt.receiver_name.clone(),
            amount: receipt.amount_minor,
            transaction_number: receipt.transaction_id.clone(),
        }
    }
}

/// Successful Telebirr extraction. Absent optionals render as `""`, the
/// shape the original API exposed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelebirrReceiptJson {
    pub payer_name: String,
    pub payer_telebirr_no: String,
    pub credited_party_name: String,
    pub transaction_status: String,
    /// Integer minor units (cents of ETB).
    pub settled_amount: i64,
    pub payment_date: String,
}

impl From<&ExtractedReceipt> for TelebirrReceiptJson {
    fn from(receipt: &ExtractedReceipt) -> Self {
        Self {
            payer_name: receipt.payer_name.clone().unwrap_or_default(),
            payer_telebirr_no: receipt.payer_phone.clone().unwrap_or_default(),
            credited_party_name: receipt.receiver_name.clone().unwrap_or_default(),
            transaction_status: receipt.raw_status.clone().unwrap_or_default(),
            settled_amount: receipt.amount_minor,
            payment_date: receipt.occurred_at.clone(),
        }
    }
}

/// Success envelope.
pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true, "data": data })),
    )
}

/// Failure envelope per the propagation policy: validation and conflict
/// errors carry their own descriptive message; internal errors carry a
/// generic message plus the cause string for diagnostics.
pub fn failure(err: &PipelineError) -> (StatusCode, Json<serde_json::Value>) {
    match err.outcome() {
        Outcome::Validation => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "success": false, "error": err.to_string() })),
        ),
        Outcome::Conflict => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "success": false, "error": err.to_string() })),
        ),
        Outcome::Internal => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "success": false,
                "error": "Failed to process receipt",
                "details": err.to_string(),
            })),
        ),
    }
}
