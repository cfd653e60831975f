//! Runtime configuration with environment overlay.
//!
//! Defaults point at the real provider endpoints; every field can be
//! overridden through the environment (the binary loads `.env` first).

use std::path::PathBuf;

/// Configuration for the ingestion service.
#[derive(Debug, Clone)]
pub struct Config {
    /// CBE receipt endpoint; the receipt id is appended as `?id=…`.
    pub cbe_receipt_url: String,
    /// Telebirr receipt endpoint; the transaction number is appended as a
    /// path segment.
    pub telebirr_receipt_url: String,
    /// Bound on every outbound fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// SQLite database path. `None` means in-memory (tests, dry runs).
    pub db_path: Option<PathBuf>,
    /// Port for the HTTP surface.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cbe_receipt_url: "https://apps.cbe.com.et:100/".to_string(),
            telebirr_receipt_url: "https://transactioninfo.ethiotelecom.et/receipt".to_string(),
            fetch_timeout_secs: 30,
            db_path: Some(PathBuf::from("receipts.db")),
            port: 3000,
        }
    }
}

impl Config {
    /// Defaults overlaid with any environment variables that are set.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(url) = std::env::var("CBE_RECEIPT_URL") {
            config.cbe_receipt_url = url;
        }
        if let Ok(url) = std::env::var("TELEBIRR_RECEIPT_URL") {
            config.telebirr_receipt_url = url;
        }
        if let Ok(secs) = std::env::var("FETCH_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse()
        {
            config.fetch_timeout_secs = secs;
        }
        if let Ok(path) = std::env::var("RECEIPTS_DB") {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            config.port = port;
        }
        config
    }
}
