use serde::{Deserialize, Serialize};

/// Default minimum similarity (0-100) for accepting a directory match
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Scores below this are flagged as low confidence
pub const DEFAULT_LOW_BELOW: u8 = 80;

/// Scores below this (but at or above `low_below`) still warrant a second look
pub const DEFAULT_MEDIUM_BELOW: u8 = 95;

/// Display thresholds used to classify a resolved score for review.
///
/// These are independent of the resolution threshold: a match can clear the
/// resolution threshold and still be worth a manual check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewThresholds {
    pub low_below: u8,
    pub medium_below: u8,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            low_below: DEFAULT_LOW_BELOW,
            medium_below: DEFAULT_MEDIUM_BELOW,
        }
    }
}

/// Confidence level of a resolved payer name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Unmatched,
    Low,
    Medium,
    High,
    Exact,
}

impl Confidence {
    /// Classify a result; `score` is ignored when nothing matched
    #[must_use]
    pub fn classify(matched: bool, score: u8, thresholds: &ReviewThresholds) -> Self {
        if !matched {
            Self::Unmatched
        } else if score >= 100 {
            Self::Exact
        } else if score < thresholds.low_below {
            Self::Low
        } else if score < thresholds.medium_below {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Whether a person should look at this row before a receipt is issued
    pub fn needs_review(self) -> bool {
        matches!(self, Self::Unmatched | Self::Low | Self::Medium)
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unmatched => write!(f, "unmatched"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Exact => write!(f, "exact"),
        }
    }
}
