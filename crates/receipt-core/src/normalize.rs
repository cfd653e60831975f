//! Normalization of raw extracted strings into typed values.

use crate::error::ExtractError;

/// Parse a human-formatted amount (`"1,500.00"`) into integer minor units.
///
/// Strips thousands separators, parses as decimal, rejects anything that is
/// not a finite non-negative number, then rounds `value * 100` to the
/// nearest integer. Integer minor units avoid every float-storage rounding
/// problem downstream.
pub fn parse_minor_units(raw: &str) -> Result<i64, ExtractError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| ExtractError::InvalidAmount(raw.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ExtractError::InvalidAmount(raw.to_string()));
    }
    Ok((value * 100.0).round() as i64)
}

/// Trim a cosmetic field; empty-after-trim means the field is absent, not
/// an empty string.
pub fn clean_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// RFC 3339 ingestion timestamp, used when the source document carries no
/// machine-readable date. A documented fallback, not an error.
pub fn ingestion_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
