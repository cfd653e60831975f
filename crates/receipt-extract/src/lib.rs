//! Provider-specific extraction strategies.
//!
//! Each strategy implements the [`ReceiptExtractor`] trait from
//! `receipt-core`: strict on the identifying field, tolerant of formatting
//! drift in everything cosmetic. Extraction is pure with respect to the
//! fetched document, so every strategy is testable against fixtures.

pub mod html;
pub mod pdf;

pub use html::TelebirrHtmlExtractor;
pub use pdf::CbePdfExtractor;

// Re-export the trait so callers can depend on this crate alone.
pub use receipt_core::ReceiptExtractor;
