//! The staged ingestion pipeline.
//!
//! Fetch, signature check, extract/normalize, then the dedup-gated insert.
//! Stages
//! run sequentially for one request (each needs the previous stage's
//! output); any failure short-circuits via `?` and nothing downstream runs.
//! Concurrent requests only meet at the store, whose uniqueness constraint
//! is the sole shared-state guard.

use std::sync::Arc;

use crate::config::Config;
use crate::document::RawDocument;
use crate::error::{ExtractError, PipelineError};
use crate::fetch::DocumentFetcher;
use crate::store::TransactionStore;
use crate::{ExtractedReceipt, Provider, ReceiptExtractor, StoredTransaction};

/// Successful ingestion: the normalized receipt and the row it became.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub receipt: ExtractedReceipt,
    pub stored: StoredTransaction,
}

/// One pipeline instance serves all requests; it owns the fetcher and a
/// handle to the store (injected, never ambient: lifecycle belongs to the
/// binary that opened it).
pub struct Pipeline {
    fetcher: DocumentFetcher,
    store: Arc<TransactionStore>,
}

impl Pipeline {
    pub fn new(config: &Config, store: Arc<TransactionStore>) -> Result<Self, PipelineError> {
        Ok(Self {
            fetcher: DocumentFetcher::new(config)?,
            store,
        })
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    /// Run the full pipeline for one lookup key.
    pub async fn ingest(
        &self,
        extractor: &dyn ReceiptExtractor,
        lookup_key: &str,
    ) -> Result<IngestReport, PipelineError> {
        if lookup_key.trim().is_empty() {
            return Err(ExtractError::EmptyLookupKey.into());
        }

        let document = match extractor.provider() {
            Provider::Cbe => self.fetcher.fetch_cbe_receipt(lookup_key).await?,
            Provider::Telebirr => self.fetcher.fetch_telebirr_receipt(lookup_key).await?,
        };

        self.ingest_document(extractor, document).await
    }

    /// The network-free tail of the pipeline: validate the payload
    /// signature, extract, and pass through the dedup gate.
    pub async fn ingest_document(
        &self,
        extractor: &dyn ReceiptExtractor,
        document: RawDocument,
    ) -> Result<IngestReport, PipelineError> {
        document.validate_signature()?;

        let receipt = extractor.extract(&document)?;
        debug_assert!(!receipt.transaction_id.is_empty());

        let stored = self.store.record(&receipt)?;
        tracing::info!(
            provider = %receipt.provider,
            transaction_id = %receipt.transaction_id,
            "receipt ingested"
        );

        Ok(IngestReport { receipt, stored })
    }
}
