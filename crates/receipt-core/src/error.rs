//! Error taxonomy for the ingestion pipeline.
//!
//! Each stage owns a small `thiserror` enum; [`PipelineError`] composes them
//! transparently so `?` flows through the staged pipeline, and
//! [`PipelineError::outcome`] collapses the taxonomy into the three
//! caller-facing outcome classes.

use thiserror::Error;

use crate::DocumentFormat;

/// Failures while retrieving a document from a provider endpoint.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not reach provider endpoint: {0}")]
    Transport(String),
    #[error("provider request timed out after {0}s")]
    Timeout(u64),
    #[error("provider returned HTTP {0}")]
    UnexpectedStatus(u16),
    #[error("provider returned content type {got:?}, expected {expected}")]
    UnexpectedContentType {
        expected: &'static str,
        got: Option<String>,
    },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl FetchError {
    /// Map a reqwest error, distinguishing timeouts (retryable by the
    /// caller, never by us) from other transport failures.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout_secs)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Failures while validating or extracting fields from a fetched document.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Payload does not carry the magic signature its content type promised.
    #[error("payload is not a valid {0} document: {1}")]
    MalformedDocument(DocumentFormat, String),
    /// The reference / invoice number anchor was not found. Hard failure:
    /// this is the dedup key.
    #[error("no transaction reference found in receipt")]
    MissingTransactionId,
    /// The endpoint answered, but the page proves it has no such
    /// transaction (empty status field).
    #[error("invalid transaction number")]
    InvalidTransactionReference,
    #[error("cannot parse amount {0:?}")]
    InvalidAmount(String),
    /// The caller supplied an empty lookup key.
    #[error("missing receipt lookup key")]
    EmptyLookupKey,
}

/// Failures at the dedup and persistence gate.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A row for this (provider, transaction_id) already exists. Business
    /// conflict, not a system error.
    #[error("transaction {transaction_id} from {provider} already recorded")]
    Duplicate {
        provider: &'static str,
        transaction_id: String,
    },
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),
}

/// Any terminal pipeline failure. No stage after the failing one runs, and
/// nothing is retried internally.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Caller-facing outcome class for a failed (or conflicting) ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request or document is at fault (4xx-equivalent).
    Validation,
    /// The transaction is already recorded (conflict, 409-equivalent).
    Conflict,
    /// Upstream or storage failure (5xx-equivalent).
    Internal,
}

impl PipelineError {
    /// Classify per the propagation policy: shape/identifier errors are the
    /// client's problem, duplicates are a distinct conflict, everything
    /// touching the network or the store is internal.
    pub fn outcome(&self) -> Outcome {
        match self {
            PipelineError::Extract(_) => Outcome::Validation,
            PipelineError::Store(StoreError::Duplicate { .. }) => Outcome::Conflict,
            PipelineError::Fetch(_) | PipelineError::Store(_) => Outcome::Internal,
        }
    }
}
