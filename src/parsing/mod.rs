//! Loaders for the engine's external inputs.
//!
//! - **Bank exports** ([`bank`]): `;`- or `,`-separated CSV with German
//!   column names, decimal commas and `DD.MM.YY` booking dates
//! - **Address directories** ([`directory`]): CSV/TSV with `Name`, `Straße`,
//!   `PLZ`, `Ort` columns, or a JSON array of records
//!
//! Files are decoded as UTF-8 (a leading BOM is ignored) and fall back to
//! Latin-1, which covers exports from older banking software.
//!
//! ## Example
//!
//! ```rust,no_run
//! use payer_match::parsing::{bank, directory};
//! use std::path::Path;
//!
//! let transactions = bank::parse_bank_file(Path::new("umsaetze.csv")).unwrap();
//! let records = directory::parse_directory_file(Path::new("adressen.csv")).unwrap();
//! ```

use thiserror::Error;
use tracing::warn;

pub mod bank;
pub mod directory;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Too many rows: {0} exceeds maximum allowed ({max})", max = crate::utils::validation::MAX_ROWS)]
    TooManyRows(usize),
}

/// Decode file contents as UTF-8, falling back to Latin-1
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!("Input is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Pick the delimiter used by a header line: tab, then `;`, then `,`
pub(crate) fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains('\t') {
        b'\t'
    } else if header_line.contains(';') {
        b';'
    } else {
        b','
    }
}

/// Position of the first header matching any of `aliases` (case-insensitive)
pub(crate) fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim().to_lowercase();
        aliases.iter().any(|alias| header == *alias)
    })
}
