use serde::Serialize;

use crate::matching::engine::Strategy;

/// Decision trace of one resolution, collected when tracing is enabled.
///
/// Used for audit output (`payer-match match --trace`) and for explaining
/// low-confidence rows during manual review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchDiagnosis {
    /// Payer name after title-casing and "Surname, Given" reordering
    pub normalized: String,

    /// Rule that split the name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_rule: Option<String>,

    /// Every time the running best candidate changed, in order
    pub steps: Vec<TraceStep>,

    /// Highest-scoring comparison that fell short of the threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest_below_threshold: Option<NearMiss>,

    pub fallback: FallbackOutcome,
}

/// A candidate that replaced the previous best
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub variant: String,
    pub record_index: usize,
    pub record_variant: String,
    pub score: u8,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearMiss {
    pub record_index: usize,
    pub record_variant: String,
    pub score: u8,
}

/// Whether the combined-name fallback ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum FallbackOutcome {
    /// The payer name was not split
    NotApplicable,
    /// A split variant already matched
    NotNeeded,
    /// No variant matched, so the joined variants were compared
    Tried { combined: String, matched: bool },
}

impl MatchDiagnosis {
    /// Human-readable lines for text output
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec![format!("Normalized: {}", self.normalized)];

        if let Some(rule) = &self.split_rule {
            lines.push(format!("Split by {rule}"));
        }

        for step in &self.steps {
            lines.push(format!(
                "'{}' ~ '{}' (record {}): {} via {:?}",
                step.variant, step.record_variant, step.record_index, step.score, step.strategy
            ));
        }

        if let Some(near) = &self.closest_below_threshold {
            lines.push(format!(
                "Closest below threshold: '{}' (record {}) at {}",
                near.record_variant, near.record_index, near.score
            ));
        }

        match &self.fallback {
            FallbackOutcome::NotApplicable => {}
            FallbackOutcome::NotNeeded => lines.push("Combined-name fallback not needed".into()),
            FallbackOutcome::Tried { combined, matched } => lines.push(format!(
                "Combined-name fallback '{combined}': {}",
                if *matched { "matched" } else { "no match" }
            )),
        }

        lines
    }
}
