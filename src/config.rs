//! Optional JSON settings file.
//!
//! Every field is optional; command-line flags take precedence over the file,
//! and the file over built-in defaults.
//!
//! ```json
//! {
//!   "threshold": 85,
//!   "low_below": 80,
//!   "medium_below": 95,
//!   "workers": 4,
//!   "directory": "adressen.csv"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::ReviewThresholds;
use crate::matching::engine::MatchingConfig;
use crate::utils::validation::{
    validate_review_thresholds, validate_threshold, validate_workers, ValidationError,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub threshold: Option<u16>,
    pub low_below: Option<u16>,
    pub medium_below: Option<u16>,
    pub workers: Option<usize>,

    /// Address directory used when a command is not given one
    pub directory: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` or `ConfigError::ParseError`.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load settings if a path was given, defaults otherwise
    ///
    /// # Errors
    ///
    /// See [`Settings::load_from_file`].
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load_from_file)
    }

    /// Parse settings from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for invalid JSON or unknown keys.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the resolver configuration, with `threshold` overriding the file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for out-of-range thresholds.
    pub fn matching_config(&self, threshold: Option<u16>) -> Result<MatchingConfig, ConfigError> {
        let defaults = MatchingConfig::default();

        let threshold = threshold
            .or(self.threshold)
            .map_or(Ok(defaults.threshold), validate_threshold)?;

        let (low_below, medium_below) = validate_review_thresholds(
            self.low_below
                .unwrap_or_else(|| defaults.review.low_below.into()),
            self.medium_below
                .unwrap_or_else(|| defaults.review.medium_below.into()),
        )?;

        Ok(MatchingConfig {
            threshold,
            review: ReviewThresholds {
                low_below,
                medium_below,
            },
            ..defaults
        })
    }

    /// Worker count, with `workers` overriding the file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for zero workers.
    pub fn workers(&self, workers: Option<usize>) -> Result<Option<usize>, ConfigError> {
        Ok(workers
            .or(self.workers)
            .map(validate_workers)
            .transpose()?)
    }

    /// Directory path, with `directory` overriding the file
    pub fn directory(&self, directory: Option<PathBuf>) -> Option<PathBuf> {
        directory.or_else(|| self.directory.clone())
    }
}
