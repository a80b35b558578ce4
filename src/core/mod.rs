//! Core data types for payer-name resolution.
//!
//! - [`DirectoryRecord`]: an address-book entry used as the match target
//! - [`Transaction`]: one booking line from a bank export
//! - [`Confidence`], [`ReviewThresholds`]: classification of resolved scores
//!
//! [`DirectoryRecord`]: record::DirectoryRecord
//! [`Transaction`]: transaction::Transaction
//! [`Confidence`]: types::Confidence
//! [`ReviewThresholds`]: types::ReviewThresholds

pub mod record;
pub mod transaction;
pub mod types;
