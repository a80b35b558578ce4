//! # payer-match
//!
//! A library for resolving the payer names of bank transfers to entries of an
//! address directory, so that donation receipts reach the right person.
//!
//! Payer names in bank exports are noisy: they arrive in capitals, as
//! "Surname, Given", with two co-payers in one field ("Maria und Hans
//! Schmidt"), or with small spelling differences from the directory.
//! `payer-match` normalizes and splits both sides the same way and picks the
//! directory record with the highest similarity score above a threshold.
//!
//! ## Features
//!
//! - **Normalization**: title case and "Surname, Given" reordering
//! - **Co-payer splitting**: conjunctions, `&`, `+` and repeated surnames
//! - **Multi-strategy scoring**: character and token-order-insensitive ratios
//! - **Combined-name fallback**: for directory entries that hold a couple
//! - **Review classification**: exact, high, medium, low or unmatched
//! - **Batch resolution**: worker threads with progress and cancellation
//!
//! ## Example
//!
//! ```rust
//! use payer_match::{resolve, Confidence, DirectoryRecord};
//!
//! let directory = vec![
//!     DirectoryRecord::new("Maria Schmidt").with_address("Ring 2", "54321", "Köln"),
//!     DirectoryRecord::new("Max Mustermann"),
//! ];
//!
//! let result = resolve("SCHMIDT, MARIA", &directory, 80).unwrap();
//! assert_eq!(result.record(), Some(&directory[0]));
//! assert_eq!(result.confidence, Confidence::Exact);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Directory records, transactions and confidence levels
//! - [`matching`]: Normalization, splitting, scoring and resolution
//! - [`parsing`]: Bank export and address directory loaders
//! - [`config`]: Optional JSON settings file
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON web API

pub mod cli;
pub mod config;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use crate::core::record::DirectoryRecord;
pub use crate::core::transaction::Transaction;
pub use crate::core::types::*;
pub use crate::matching::batch::BatchResolver;
pub use crate::matching::engine::{resolve, MatchResolver, MatchResult, MatchingConfig, ResolveError};
