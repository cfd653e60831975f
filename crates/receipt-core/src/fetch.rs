//! Document fetcher: retrieves raw receipt payloads from the provider
//! endpoints with bounded timeouts and declared-content-type checks.
//!
//! The raw payload is held in memory only; nothing fetched here is ever
//! written to disk.

use std::time::Duration;

use crate::config::Config;
use crate::document::{DocumentFormat, RawDocument};
use crate::error::FetchError;
use crate::Provider;

/// Browser-signature headers the Telebirr endpoint requires before it will
/// serve a receipt page (it rejects bare HTTP clients).
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.5"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
    ("DNT", "1"),
];

/// Fetches receipt documents from the two provider endpoints.
pub struct DocumentFetcher {
    /// Standard client (Telebirr and anything else well-behaved).
    client: reqwest::Client,
    /// CBE-only client. The bank serves its receipts on a non-standard port
    /// with a certificate chain that does not validate, so this client
    /// accepts invalid certs and is never used for any other host.
    /// Content-type and status checks still apply in full.
    cbe_client: reqwest::Client,
    cbe_receipt_url: String,
    telebirr_receipt_url: String,
    timeout: Duration,
    timeout_secs: u64,
}

impl DocumentFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        let cbe_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            cbe_client,
            cbe_receipt_url: config.cbe_receipt_url.clone(),
            telebirr_receipt_url: config.telebirr_receipt_url.clone(),
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            timeout_secs: config.fetch_timeout_secs,
        })
    }

    /// Download the PDF receipt for a CBE receipt id.
    pub async fn fetch_cbe_receipt(&self, receipt_id: &str) -> Result<RawDocument, FetchError> {
        let url = format!(
            "{}?id={}",
            self.cbe_receipt_url,
            urlencoding::encode(receipt_id)
        );
        tracing::debug!(url = %url, "fetching CBE receipt");

        let response = self
            .cbe_client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout_secs))?;

        self.into_document(Provider::Cbe, receipt_id, response).await
    }

    /// Download the HTML receipt page for a Telebirr transaction number.
    pub async fn fetch_telebirr_receipt(
        &self,
        transaction_number: &str,
    ) -> Result<RawDocument, FetchError> {
        let url = format!(
            "{}/{}",
            self.telebirr_receipt_url,
            urlencoding::encode(transaction_number)
        );
        tracing::debug!(url = %url, "fetching Telebirr receipt");

        let mut request = self.client.get(&url).timeout(self.timeout);
        for (name, value) in BROWSER_HEADERS {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout_secs))?;

        self.into_document(Provider::Telebirr, transaction_number, response)
            .await
    }

    /// Check status and declared content type, then read the body.
    async fn into_document(
        &self,
        provider: Provider,
        lookup_key: &str,
        response: reqwest::Response,
    ) -> Result<RawDocument, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        let format = provider.expected_format();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        if !declares(content_type.as_deref(), format) {
            return Err(FetchError::UnexpectedContentType {
                expected: format.expected_content_type(),
                got: content_type,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout_secs))?;

        tracing::debug!(provider = %provider, bytes = body.len(), "downloaded receipt document");
        Ok(RawDocument::new(provider, lookup_key, content_type, body.to_vec()))
    }
}

/// Does the declared content type match the expected one (ignoring charset
/// and other parameters)?
fn declares(content_type: Option<&str>, format: DocumentFormat) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains(format.expected_content_type()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_match_ignores_parameters() {
        assert!(declares(Some("text/html; charset=utf-8"), DocumentFormat::Html));
        assert!(declares(Some("application/pdf"), DocumentFormat::Pdf));
    }

    #[test]
    fn wrong_or_missing_content_type_rejected() {
        assert!(!declares(Some("text/plain"), DocumentFormat::Pdf));
        assert!(!declares(None, DocumentFormat::Html));
    }
}
