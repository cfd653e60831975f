//! The raw fetched document and its format signature check.

use crate::error::ExtractError;
use crate::Provider;

/// The two wire formats the providers serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Html,
}

impl DocumentFormat {
    /// Content type the provider must declare for this format.
    pub fn expected_content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Html => "text/html",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf => f.write_str("PDF"),
            DocumentFormat::Html => f.write_str("HTML"),
        }
    }
}

/// A document as fetched from a provider endpoint.
///
/// Lives for one request only and is never written to disk; raw receipts
/// must not be stored at rest.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub provider: Provider,
    pub format: DocumentFormat,
    /// The key the document was looked up by (receipt id or transaction
    /// number). For providers whose pages do not repeat the identifier,
    /// this *is* the dedup key.
    pub lookup_key: String,
    /// Content type the server declared, verbatim.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawDocument {
    pub fn new(
        provider: Provider,
        lookup_key: impl Into<String>,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            provider,
            format: provider.expected_format(),
            lookup_key: lookup_key.into(),
            content_type,
            body,
        }
    }

    /// Confirm the payload starts with the expected format signature.
    ///
    /// Servers lie about content type on error pages, so the header check in
    /// the fetcher is not enough: a PDF must begin with the `%PDF-` marker
    /// and an HTML page must open with a tag.
    pub fn validate_signature(&self) -> Result<(), ExtractError> {
        match self.format {
            DocumentFormat::Pdf => {
                if self.body.starts_with(b"%PDF-") {
                    Ok(())
                } else {
                    Err(ExtractError::MalformedDocument(
                        self.format,
                        "missing %PDF- signature".into(),
                    ))
                }
            }
            DocumentFormat::Html => {
                let first = self
                    .body
                    .iter()
                    .copied()
                    .find(|b| !b.is_ascii_whitespace());
                if first == Some(b'<') {
                    Ok(())
                } else {
                    Err(ExtractError::MalformedDocument(
                        self.format,
                        "payload does not start with markup".into(),
                    ))
                }
            }
        }
    }

    /// Body as UTF-8 text (lossy). Used by the HTML strategy.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
