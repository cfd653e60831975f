use serde::{Deserialize, Serialize};

pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod store;

// Re-export for convenience
pub use config::Config;
pub use document::{DocumentFormat, RawDocument};
pub use error::{ExtractError, FetchError, Outcome, PipelineError, StoreError};
pub use fetch::DocumentFetcher;
pub use pipeline::{IngestReport, Pipeline};
pub use store::TransactionStore;

/// A payment provider whose receipts this service ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Commercial Bank of Ethiopia. Serves signed PDF receipts.
    Cbe,
    /// Ethio Telecom mobile money. Serves HTML receipt pages.
    Telebirr,
}

impl Provider {
    /// Tag stored in the `provider` column and used in the dedup key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Cbe => "cbe",
            Provider::Telebirr => "telebirr",
        }
    }

    /// The document format this provider's endpoint serves.
    pub fn expected_format(&self) -> DocumentFormat {
        match self {
            Provider::Cbe => DocumentFormat::Pdf,
            Provider::Telebirr => DocumentFormat::Html,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cbe" => Ok(Provider::Cbe),
            "telebirr" => Ok(Provider::Telebirr),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Normalized fields pulled out of one receipt document.
///
/// `transaction_id` is the only field whose absence is fatal: it is the dedup
/// key, and without it the persistence gate cannot run. Cosmetic fields
/// degrade to `None` when the source document omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReceipt {
    pub provider: Provider,
    /// Provider-unique reference (non-empty by construction).
    pub transaction_id: String,
    pub payer_name: Option<String>,
    /// Payer's mobile-money number (Telebirr pages only).
    pub payer_phone: Option<String>,
    pub receiver_name: Option<String>,
    /// Amount in integer minor units (cents of ETB). Never negative.
    pub amount_minor: i64,
    /// RFC 3339 ingestion timestamp, or the provider's own date string when
    /// the document carries one.
    pub occurred_at: String,
    /// Raw transaction status text (Telebirr pages only).
    pub raw_status: Option<String>,
}

/// A receipt as persisted by the dedup gate. Immutable once written.
#[derive(Debug, Clone)]
pub struct StoredTransaction {
    /// Generated primary key (SQLite rowid).
    pub id: i64,
    pub provider: Provider,
    pub transaction_id: String,
    pub amount_minor: i64,
    pub occurred_at: String,
    pub payer_name: Option<String>,
    pub receiver_name: Option<String>,
    /// When the row was inserted (RFC 3339).
    pub created_at: String,
}

/// A provider-specific strategy turning a fetched document into an
/// [`ExtractedReceipt`].
///
/// Implementations must be strict about the identifying field (fail with
/// [`ExtractError::MissingTransactionId`] / [`ExtractError::InvalidTransactionReference`])
/// and tolerant about everything cosmetic (return `None`, never fail).
pub trait ReceiptExtractor: Send + Sync {
    /// Which provider's documents this strategy understands.
    fn provider(&self) -> Provider;

    /// Extract and normalize the receipt fields from a validated document.
    fn extract(&self, doc: &RawDocument) -> Result<ExtractedReceipt, ExtractError>;
}
