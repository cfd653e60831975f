//! CBE PDF-text extraction strategy.
//!
//! The bank's receipt PDFs carry labeled fields in their text layer. The
//! PDF is rendered to a linear text stream and fields are located by their
//! label anchors. Each lookup is independent: a missing payer or receiver
//! degrades to `None`, but a missing reference number is fatal (it is the
//! dedup key) and a missing amount is fatal because amounts are stored
//! NOT NULL in minor units.

use once_cell::sync::Lazy;
use regex::Regex;

use receipt_core::normalize::{clean_name, ingestion_timestamp, parse_minor_units};
use receipt_core::{
    DocumentFormat, ExtractError, ExtractedReceipt, Provider, RawDocument, ReceiptExtractor,
};

/// Text following the "Payer" label, up to end of line.
static PAYER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Payer([^\n]+)").expect("static regex"));

/// Text following the "Receiver" label, up to end of line.
static RECEIVER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Receiver([^\n]+)").expect("static regex"));

/// Numeric token (with optional thousands separators) before the ETB suffix.
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Transferred Amount\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*ETB").expect("static regex")
});

/// Reference number after the fixed invoice label phrase.
static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Reference No\.\s*\(VAT Invoice No\)\s*([^\n]+)").expect("static regex"));

/// Extraction strategy for CBE PDF receipts.
pub struct CbePdfExtractor;

impl ReceiptExtractor for CbePdfExtractor {
    fn provider(&self) -> Provider {
        Provider::Cbe
    }

    fn extract(&self, doc: &RawDocument) -> Result<ExtractedReceipt, ExtractError> {
        let text = pdf_extract::extract_text_from_mem(&doc.body).map_err(|e| {
            ExtractError::MalformedDocument(DocumentFormat::Pdf, e.to_string())
        })?;
        tracing::debug!(chars = text.len(), "rendered CBE receipt text");
        parse_receipt_text(&text)
    }
}

/// Locate the labeled fields in the receipt's linear text.
///
/// Separated from PDF rendering so fixtures can exercise the anchors
/// without binary documents.
pub fn parse_receipt_text(text: &str) -> Result<ExtractedReceipt, ExtractError> {
    let transaction_id = REFERENCE_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ExtractError::MissingTransactionId)?;

    let amount_raw = AMOUNT_RE
        .captures(text)
        .map(|c| c[1].to_string())
        .ok_or_else(|| ExtractError::InvalidAmount("transferred amount not found".into()))?;
    let amount_minor = parse_minor_units(&amount_raw)?;

    let payer_name = PAYER_RE.captures(text).and_then(|c| clean_name(&c[1]));
    let receiver_name = RECEIVER_RE.captures(text).and_then(|c| clean_name(&c[1]));

    Ok(ExtractedReceipt {
        provider: Provider::Cbe,
        transaction_id,
        payer_name,
        payer_phone: None,
        receiver_name,
        amount_minor,
        // CBE PDFs carry no machine-readable date anchor.
        occurred_at: ingestion_timestamp(),
        raw_status: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "Commercial Bank of Ethiopia\n\
        Payer John Doe\n\
        Receiver Jane Roe\n\
        Payment Date & Time 7/5/2025, 9:00:00 AM\n\
        Transferred Amount1,500.00 ETB\n\
        Reference No. (VAT Invoice No)FT25186CS2K308680658\n";

    #[test]
    fn full_receipt_extracts_all_fields() {
        let receipt = parse_receipt_text(FIXTURE).unwrap();
        assert_eq!(receipt.provider, Provider::Cbe);
        assert_eq!(receipt.payer_name.as_deref(), Some("John Doe"));
        assert_eq!(receipt.receiver_name.as_deref(), Some("Jane Roe"));
        assert_eq!(receipt.amount_minor, 150000);
        assert_eq!(receipt.transaction_id, "FT25186CS2K308680658");
    }

    #[test]
    fn missing_reference_label_is_hard_failure() {
        let text = "Payer John Doe\nTransferred Amount1,500.00 ETB\n";
        assert!(matches!(
            parse_receipt_text(text),
            Err(ExtractError::MissingTransactionId)
        ));
    }

    #[test]
    fn empty_reference_value_is_hard_failure() {
        let text = "Transferred Amount10.00 ETB\nReference No. (VAT Invoice No)   \n";
        assert!(matches!(
            parse_receipt_text(text),
            Err(ExtractError::MissingTransactionId)
        ));
    }

    #[test]
    fn missing_names_degrade_to_none() {
        let text = "Transferred Amount250.00 ETB\nReference No. (VAT Invoice No)FT99\n";
        let receipt = parse_receipt_text(text).unwrap();
        assert_eq!(receipt.payer_name, None);
        assert_eq!(receipt.receiver_name, None);
        assert_eq!(receipt.amount_minor, 25000);
    }

    #[test]
    fn missing_amount_is_invalid_amount() {
        let text = "Payer John Doe\nReference No. (VAT Invoice No)FT99\n";
        assert!(matches!(
            parse_receipt_text(text),
            Err(ExtractError::InvalidAmount(_))
        ));
    }

    #[test]
    fn amount_without_separator_parses() {
        let text = "Transferred Amount500 ETB\nReference No. (VAT Invoice No)FT42\n";
        let receipt = parse_receipt_text(text).unwrap();
        assert_eq!(receipt.amount_minor, 50000);
    }

    #[test]
    fn garbage_bytes_are_malformed_document() {
        let doc = RawDocument::new(
            Provider::Cbe,
            "FT1",
            Some("application/pdf".into()),
            b"%PDF-not really a pdf at all".to_vec(),
        );
        let err = CbePdfExtractor.extract(&doc).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedDocument(DocumentFormat::Pdf, _)
        ));
    }
}
