//! Telebirr HTML extraction strategy.
//!
//! The receipt page is a label/value table (labels are bilingual; we match
//! on the English fragment, case-insensitively). An empty or missing
//! transaction status is the page's way of saying the transaction number
//! does not exist: the endpoint answered, so it is not a fetch failure,
//! it is an invalid reference.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use receipt_core::normalize::{clean_name, ingestion_timestamp, parse_minor_units};
use receipt_core::{ExtractError, ExtractedReceipt, Provider, RawDocument, ReceiptExtractor};

static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("static selector"));

/// Leading numeric token of an amount cell; the page suffixes the currency
/// ("345.00 Birr").
static AMOUNT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9][0-9,]*(?:\.[0-9]+)?").expect("static regex"));

/// Extraction strategy for Telebirr receipt pages.
pub struct TelebirrHtmlExtractor;

impl ReceiptExtractor for TelebirrHtmlExtractor {
    fn provider(&self) -> Provider {
        Provider::Telebirr
    }

    fn extract(&self, doc: &RawDocument) -> Result<ExtractedReceipt, ExtractError> {
        let page = Html::parse_document(&doc.body_text());
        let cells = cell_texts(&page);
        tracing::debug!(cells = cells.len(), "parsed Telebirr receipt page");

        // An absent status means the page exists but knows no such transaction.
        let raw_status = labeled_value(&cells, "transaction status")
            .ok_or(ExtractError::InvalidTransactionReference)?;

        let transaction_id = doc.lookup_key.trim().to_string();
        if transaction_id.is_empty() {
            return Err(ExtractError::MissingTransactionId);
        }

        let amount_raw = labeled_value(&cells, "settled amount")
            .ok_or_else(|| ExtractError::InvalidAmount("settled amount not found".into()))?;
        let amount_token = AMOUNT_TOKEN_RE
            .find(&amount_raw)
            .ok_or_else(|| ExtractError::InvalidAmount(amount_raw.clone()))?;
        let amount_minor = parse_minor_units(amount_token.as_str())?;

        let occurred_at =
            labeled_value(&cells, "payment date").unwrap_or_else(ingestion_timestamp);

        Ok(ExtractedReceipt {
            provider: Provider::Telebirr,
            transaction_id,
            payer_name: labeled_value(&cells, "payer name"),
            payer_phone: labeled_value(&cells, "payer telebirr no"),
            receiver_name: labeled_value(&cells, "credited party name"),
            amount_minor,
            occurred_at,
            raw_status: Some(raw_status),
        })
    }
}

/// All table-cell texts in document order, whitespace-collapsed.
fn cell_texts(page: &Html) -> Vec<String> {
    page.select(&CELL_SELECTOR)
        .map(|cell| {
            cell.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// The cell immediately after the one containing `label` (English fragment,
/// case-insensitive). Empty values count as absent.
fn labeled_value(cells: &[String], label: &str) -> Option<String> {
    let position = cells
        .iter()
        .position(|cell| cell.to_ascii_lowercase().contains(label))?;
    cells.get(position + 1).and_then(|v| clean_name(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &[(&str, &str)]) -> String {
        let mut body = String::from("<html><body><table>");
        for (label, value) in rows {
            body.push_str(&format!("<tr><td>{label}</td><td>{value}</td></tr>"));
        }
        body.push_str("</table></body></html>");
        body
    }

    fn doc(html: &str, lookup_key: &str) -> RawDocument {
        RawDocument::new(
            Provider::Telebirr,
            lookup_key,
            Some("text/html; charset=utf-8".into()),
            html.as_bytes().to_vec(),
        )
    }

    const FULL_ROWS: &[(&str, &str)] = &[
        ("የከፋይ ስም/Payer Name", "ABEBE KEBEDE"),
        ("የከፋይ ቴሌብር ቁ./Payer telebirr no.", "251911223344"),
        ("የገንዘብ ተቀባይ ስም/Credited Party name", "SOME MERCHANT PLC"),
        ("የክፍያው ሁኔታ/transaction status", "Completed"),
        ("ጠቅላላ የተከፈለ/Settled Amount", "345.00 Birr"),
        ("የክፍያ ቀን/Payment date", "05-07-2025 09:00:00"),
    ];

    #[test]
    fn full_page_extracts_all_fields() {
        let html = page(FULL_ROWS);
        let receipt = TelebirrHtmlExtractor
            .extract(&doc(&html, "CG179W93AJ"))
            .unwrap();

        assert_eq!(receipt.provider, Provider::Telebirr);
        assert_eq!(receipt.transaction_id, "CG179W93AJ");
        assert_eq!(receipt.payer_name.as_deref(), Some("ABEBE KEBEDE"));
        assert_eq!(receipt.payer_phone.as_deref(), Some("251911223344"));
        assert_eq!(receipt.receiver_name.as_deref(), Some("SOME MERCHANT PLC"));
        assert_eq!(receipt.raw_status.as_deref(), Some("Completed"));
        assert_eq!(receipt.occurred_at, "05-07-2025 09:00:00");
        assert_eq!(receipt.amount_minor, 34500);
    }

    #[test]
    fn missing_status_is_invalid_reference() {
        let html = page(&[("የከፋይ ስም/Payer Name", "ABEBE KEBEDE")]);
        let err = TelebirrHtmlExtractor
            .extract(&doc(&html, "BOGUS123"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidTransactionReference));
    }

    #[test]
    fn empty_status_cell_is_invalid_reference() {
        let html = page(&[("የክፍያው ሁኔታ/transaction status", "  ")]);
        let err = TelebirrHtmlExtractor
            .extract(&doc(&html, "BOGUS123"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidTransactionReference));
    }

    #[test]
    fn missing_cosmetic_fields_degrade_to_none() {
        let html = page(&[
            ("የክፍያው ሁኔታ/transaction status", "Completed"),
            ("ጠቅላላ የተከፈለ/Settled Amount", "10.00"),
        ]);
        let receipt = TelebirrHtmlExtractor
            .extract(&doc(&html, "CG179W93AJ"))
            .unwrap();
        assert_eq!(receipt.payer_name, None);
        assert_eq!(receipt.payer_phone, None);
        assert_eq!(receipt.receiver_name, None);
        // No date on the page: ingestion timestamp fallback.
        assert!(looks_like_rfc3339(&receipt.occurred_at));
    }

    #[test]
    fn unparseable_amount_is_invalid_amount() {
        let html = page(&[
            ("የክፍያው ሁኔታ/transaction status", "Completed"),
            ("ጠቅላላ የተከፈለ/Settled Amount", "N/A"),
        ]);
        let err = TelebirrHtmlExtractor
            .extract(&doc(&html, "CG179W93AJ"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidAmount(_)));
    }

    fn looks_like_rfc3339(s: &str) -> bool {
        // The fallback is RFC 3339; provider-native dates are stored verbatim.
        s.contains('T') && s.contains(':')
    }
}
