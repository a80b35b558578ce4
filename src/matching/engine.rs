use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::record::DirectoryRecord;
use crate::core::types::{Confidence, ReviewThresholds, DEFAULT_THRESHOLD};
use crate::matching::diagnosis::{FallbackOutcome, MatchDiagnosis, NearMiss, TraceStep};
use crate::matching::normalize::{normalize, title_case};
use crate::matching::scoring::{ratio, token_sort_ratio};
use crate::matching::split::{matching_rule, split};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Directory record {index} has no name (street: '{street}', city: '{city}')")]
    MissingName {
        index: usize,
        street: String,
        city: String,
    },
}

/// Configuration for the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum score (0-100) a candidate needs to be accepted
    pub threshold: u8,

    /// Display thresholds for classifying accepted matches
    pub review: ReviewThresholds,

    /// Collect a [`MatchDiagnosis`] for every resolution
    pub trace: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            review: ReviewThresholds::default(),
            trace: false,
        }
    }
}

impl MatchingConfig {
    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// Comparison that produced a candidate's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Payer variant vs. directory variant
    Ratio,
    /// Normalized payer variant vs. directory variant
    NormalizedRatio,
    /// Normalized payer variant vs. normalized directory variant
    NormalizedBothRatio,
    TokenSort,
    NormalizedTokenSort,
    /// Combined payer variants vs. the whole directory name
    CombinedRatio,
    CombinedNormalizedRatio,
    CombinedTokenSort,
    CombinedNormalizedTokenSort,
}

impl Strategy {
    pub fn is_fallback(self) -> bool {
        matches!(
            self,
            Self::CombinedRatio
                | Self::CombinedNormalizedRatio
                | Self::CombinedTokenSort
                | Self::CombinedNormalizedTokenSort
        )
    }
}

/// The accepted directory entry for a payer name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate<'a> {
    pub record: &'a DirectoryRecord,

    /// Position of the record in the directory
    pub index: usize,

    /// Similarity score, at least the configured threshold
    pub score: u8,

    /// Payer name variant that produced the score
    pub variant: String,

    pub strategy: Strategy,
}

/// Outcome of resolving one payer name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult<'a> {
    pub payer_name: String,

    /// Name variants the payer name was split into
    pub variants: Vec<String>,

    /// Best candidate, `None` if nothing cleared the threshold
    pub best: Option<MatchCandidate<'a>>,

    pub confidence: Confidence,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<MatchDiagnosis>,
}

impl<'a> MatchResult<'a> {
    pub fn record(&self) -> Option<&'a DirectoryRecord> {
        self.best.as_ref().map(|c| c.record)
    }

    /// Score of the best candidate, 0 when unmatched
    pub fn score(&self) -> u8 {
        self.best.as_ref().map_or(0, |c| c.score)
    }

    pub fn is_match(&self) -> bool {
        self.best.is_some()
    }
}

/// One side of a directory name after splitting, lower-cased for scoring
#[derive(Debug, Clone)]
struct RecordVariant {
    display: String,
    raw: String,
    normalized: String,
}

/// A directory record with its name prepared once for all resolutions
#[derive(Debug, Clone)]
struct PreparedRecord {
    display: String,
    raw: String,
    normalized: String,
    variants: Vec<RecordVariant>,
}

impl PreparedRecord {
    fn new(name: &str) -> Self {
        let normalized = normalize(name);

        // Raw and normalized splits are paired position by position
        let variants = split(name)
            .into_iter()
            .zip(split(&normalized))
            .map(|(raw, normalized)| RecordVariant {
                raw: raw.to_lowercase(),
                normalized: normalized.to_lowercase(),
                display: raw,
            })
            .collect();

        Self {
            display: name.to_string(),
            raw: name.to_lowercase(),
            normalized: normalized.to_lowercase(),
            variants,
        }
    }
}

/// Resolves payer names against a read-only address directory.
///
/// The directory is validated and pre-split once in [`MatchResolver::new`];
/// [`MatchResolver::resolve`] is then a pure function of the payer name and
/// can be called from many threads at once.
#[derive(Debug)]
pub struct MatchResolver<'a> {
    directory: &'a [DirectoryRecord],
    prepared: Vec<PreparedRecord>,
    config: MatchingConfig,
}

impl<'a> MatchResolver<'a> {
    /// Create a resolver with the default configuration
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::MissingName` if any record has no name.
    pub fn new(directory: &'a [DirectoryRecord]) -> Result<Self, ResolveError> {
        Self::with_config(directory, MatchingConfig::default())
    }

    /// Create a resolver with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::MissingName` for the first record without a name.
    pub fn with_config(
        directory: &'a [DirectoryRecord],
        config: MatchingConfig,
    ) -> Result<Self, ResolveError> {
        let prepared = directory
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .name()
                    .map(PreparedRecord::new)
                    .ok_or_else(|| ResolveError::MissingName {
                        index,
                        street: record.street.clone(),
                        city: record.city.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            directory,
            prepared,
            config,
        })
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn directory(&self) -> &'a [DirectoryRecord] {
        self.directory
    }

    /// Find the best directory record for a raw payer name
    pub fn resolve(&self, payer_name: &str) -> MatchResult<'a> {
        let titled = title_case(payer_name);
        let normalized = normalize(&titled);
        let variants = split(&normalized);

        if variants.len() > 1 {
            debug!("Split '{}' into {:?}", normalized, variants);
        }

        let mut search = Search::new(self.config.threshold, self.config.trace);

        for variant in &variants {
            let v = variant.to_lowercase();
            let nv = normalize(variant).to_lowercase();

            for (index, record) in self.prepared.iter().enumerate() {
                for rv in &record.variants {
                    let (score, strategy) = best_score(&[
                        (ratio(&v, &rv.raw), Strategy::Ratio),
                        (ratio(&nv, &rv.raw), Strategy::NormalizedRatio),
                        (ratio(&nv, &rv.normalized), Strategy::NormalizedBothRatio),
                        (token_sort_ratio(&v, &rv.raw), Strategy::TokenSort),
                        (
                            token_sort_ratio(&nv, &rv.normalized),
                            Strategy::NormalizedTokenSort,
                        ),
                    ]);
                    search.offer(index, variant, &rv.display, score, strategy);
                }
            }
        }

        let fallback = if variants.len() < 2 {
            FallbackOutcome::NotApplicable
        } else if search.best.is_some() {
            FallbackOutcome::NotNeeded
        } else {
            let combined = variants.join(" ");
            let c = combined.to_lowercase();

            for (index, record) in self.prepared.iter().enumerate() {
                let (score, strategy) = best_score(&[
                    (ratio(&c, &record.raw), Strategy::CombinedRatio),
                    (ratio(&c, &record.normalized), Strategy::CombinedNormalizedRatio),
                    (token_sort_ratio(&c, &record.raw), Strategy::CombinedTokenSort),
                    (
                        token_sort_ratio(&c, &record.normalized),
                        Strategy::CombinedNormalizedTokenSort,
                    ),
                ]);
                search.offer(index, &combined, &record.display, score, strategy);
            }

            FallbackOutcome::Tried {
                matched: search.best.is_some(),
                combined,
            }
        };

        let best = search.best.take().map(|found| MatchCandidate {
            record: &self.directory[found.index],
            index: found.index,
            score: found.score,
            variant: found.variant,
            strategy: found.strategy,
        });

        match &best {
            Some(c) => debug!(
                "Matched '{}' to '{}' via '{}' ({:?}, score {})",
                payer_name,
                self.prepared[c.index].display,
                c.variant,
                c.strategy,
                c.score
            ),
            None => debug!("No match for '{}'", payer_name),
        }

        let confidence = Confidence::classify(
            best.is_some(),
            best.as_ref().map_or(0, |c| c.score),
            &self.config.review,
        );

        let diagnosis = self.config.trace.then(|| MatchDiagnosis {
            normalized: normalized.clone(),
            split_rule: matching_rule(&normalized).map(|rule| rule.to_string()),
            steps: std::mem::take(&mut search.steps),
            closest_below_threshold: search.closest.take(),
            fallback,
        });

        MatchResult {
            payer_name: payer_name.to_string(),
            variants,
            best,
            confidence,
            diagnosis,
        }
    }
}

/// Resolve a single payer name against a directory.
///
/// Convenience wrapper around [`MatchResolver`] for one-off lookups; batches
/// should build the resolver once and reuse it.
///
/// # Errors
///
/// Returns `ResolveError::MissingName` if a directory record has no name.
pub fn resolve<'a>(
    payer_name: &str,
    directory: &'a [DirectoryRecord],
    threshold: u8,
) -> Result<MatchResult<'a>, ResolveError> {
    let config = MatchingConfig::default().with_threshold(threshold);
    Ok(MatchResolver::with_config(directory, config)?.resolve(payer_name))
}

/// Highest score of a comparison set; the earliest entry wins ties
fn best_score(scores: &[(u8, Strategy)]) -> (u8, Strategy) {
    scores
        .iter()
        .copied()
        .fold((0, scores[0].1), |best, candidate| {
            if candidate.0 > best.0 {
                candidate
            } else {
                best
            }
        })
}

#[derive(Debug)]
struct Found {
    index: usize,
    score: u8,
    variant: String,
    strategy: Strategy,
}

/// Running state of one resolution
struct Search {
    threshold: u8,
    trace: bool,
    best: Option<Found>,
    best_score: u8,
    closest: Option<NearMiss>,
    steps: Vec<TraceStep>,
}

impl Search {
    fn new(threshold: u8, trace: bool) -> Self {
        Self {
            threshold,
            trace,
            best: None,
            best_score: 0,
            closest: None,
            steps: Vec::new(),
        }
    }

    /// Strict improvement only, so the first candidate wins exact ties.
    ///
    /// `best_score` starts at 0, so a score of 0 never matches, even at
    /// threshold 0.
    fn offer(
        &mut self,
        index: usize,
        variant: &str,
        record_variant: &str,
        score: u8,
        strategy: Strategy,
    ) {
        if score > self.best_score && score >= self.threshold {
            self.best_score = score;
            self.best = Some(Found {
                index,
                score,
                variant: variant.to_string(),
                strategy,
            });

            if self.trace {
                self.steps.push(TraceStep {
                    variant: variant.to_string(),
                    record_index: index,
                    record_variant: record_variant.to_string(),
                    score,
                    strategy,
                });
            }
        } else if self.trace
            && score < self.threshold
            && self.closest.as_ref().map_or(true, |c| score > c.score)
        {
            self.closest = Some(NearMiss {
                record_index: index,
                record_variant: record_variant.to_string(),
                score,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(names: &[&str]) -> Vec<DirectoryRecord> {
        names.iter().map(|n| DirectoryRecord::new(*n)).collect()
    }

    #[test]
    fn test_all_caps_payer() {
        let dir = directory(&["Max Mustermann"]);
        let result = resolve("MAX MUSTERMANN", &dir, 80).unwrap();
        assert_eq!(result.record(), Some(&dir[0]));
        assert_eq!(result.score(), 100);
        assert_eq!(result.confidence, Confidence::Exact);
    }

    #[test]
    fn test_surname_first_payer() {
        let dir = directory(&["Maria Schmidt"]);
        let result = resolve("Schmidt, Maria", &dir, 80).unwrap();
        assert_eq!(result.record(), Some(&dir[0]));
        assert_eq!(result.score(), 100);
    }

    #[test]
    fn test_surname_first_directory() {
        let dir = directory(&["Schmidt, Maria"]);
        let result = resolve("Maria Schmidt", &dir, 80).unwrap();
        assert_eq!(result.score(), 100);
        assert_eq!(result.best.unwrap().strategy, Strategy::NormalizedBothRatio);
    }

    #[test]
    fn test_co_payer_split() {
        let dir = directory(&["Hans Schmidt"]);
        let result = resolve("Maria Und Hans Schmidt", &dir, 80).unwrap();
        assert_eq!(result.variants, vec!["Maria Schmidt", "Hans Schmidt"]);

        let best = result.best.unwrap();
        assert_eq!(best.index, 0);
        assert_eq!(best.score, 100);
        assert_eq!(best.variant, "Hans Schmidt");
    }

    #[test]
    fn test_no_match() {
        let dir = directory(&["Max Mustermann", "Maria Schmidt"]);
        let result = resolve("Globex Trading AG", &dir, 80).unwrap();
        assert!(result.best.is_none());
        assert_eq!(result.score(), 0);
        assert_eq!(result.confidence, Confidence::Unmatched);
    }

    #[test]
    fn test_first_record_wins_ties() {
        let dir = directory(&["Max Mustermann", "Max Mustermann"]);
        let result = resolve("Max Mustermann", &dir, 80).unwrap();
        assert_eq!(result.best.unwrap().index, 0);
    }

    #[test]
    fn test_later_record_wins_only_when_strictly_better() {
        let dir = directory(&["Max Musterman", "Max Mustermann"]);
        let result = resolve("Max Mustermann", &dir, 80).unwrap();
        assert_eq!(result.best.unwrap().index, 1);
    }

    #[test]
    fn test_threshold_boundary() {
        // (payer, directory name, best score of the pair)
        let cases = [
            ("Max Mustermann", "Max Mustermann", 100),
            ("Max Mustermann", "Max Musterman", 96),
            ("Max Mustermann", "Max Mustermenn", 93),
            ("Abcd", "Bcde", 75),
            ("Abcde", "Abcdexxxxxx", 62),
        ];

        for (payer, name, score) in cases {
            let dir = directory(&[name]);
            for threshold in [score - 1, score, score + 1] {
                if threshold > 100 {
                    continue;
                }
                let result = resolve(payer, &dir, threshold).unwrap();
                if threshold <= score {
                    assert_eq!(result.score(), score, "{payer:?} at {threshold}");
                } else {
                    assert!(result.best.is_none(), "{payer:?} at {threshold}");
                }
            }
        }
    }

    #[test]
    fn test_zero_score_never_matches() {
        let dir = directory(&["Abc"]);
        let result = resolve("Xyz", &dir, 0).unwrap();
        assert!(result.best.is_none());
        assert_eq!(result.confidence, Confidence::Unmatched);
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let dir = vec![
            DirectoryRecord::new("Max Mustermann"),
            DirectoryRecord {
                full_name: None,
                street: "Hauptstr. 1".to_string(),
                postal_code: "12345".to_string(),
                city: "Berlin".to_string(),
            },
        ];
        let err = resolve("Max Mustermann", &dir, 80).unwrap_err();
        assert!(matches!(err, ResolveError::MissingName { index: 1, .. }));
        assert!(err.to_string().contains("Berlin"));
    }

    #[test]
    fn test_combined_fallback() {
        // Neither "Anna Berg" nor "Tom Krause" clears 90 against the joint
        // entry, but the combined string is identical to it.
        let dir = directory(&["Anna Berg Tom Krause"]);
        let config = MatchingConfig::default().with_threshold(90).with_trace(true);
        let resolver = MatchResolver::with_config(&dir, config).unwrap();

        let result = resolver.resolve("Anna Berg & Tom Krause");
        let best = result.best.as_ref().unwrap();
        assert_eq!(best.score, 100);
        assert_eq!(best.variant, "Anna Berg Tom Krause");
        assert!(best.strategy.is_fallback());

        let diagnosis = result.diagnosis.unwrap();
        assert!(matches!(
            diagnosis.fallback,
            FallbackOutcome::Tried { matched: true, .. }
        ));
    }

    #[test]
    fn test_fallback_skipped_when_variant_matched() {
        let dir = directory(&["Hans Schmidt"]);
        let resolver =
            MatchResolver::with_config(&dir, MatchingConfig::default().with_trace(true)).unwrap();
        let diagnosis = resolver.resolve("Maria Und Hans Schmidt").diagnosis.unwrap();
        assert_eq!(diagnosis.fallback, FallbackOutcome::NotNeeded);
        assert_eq!(diagnosis.split_rule.as_deref(), Some("separator \" Und \""));
    }

    #[test]
    fn test_trace_records_improvements() {
        let dir = directory(&["Max Musterman", "Max Mustermann", "Erika Mustermann"]);
        let resolver =
            MatchResolver::with_config(&dir, MatchingConfig::default().with_trace(true)).unwrap();
        let diagnosis = resolver.resolve("MAX MUSTERMANN").diagnosis.unwrap();

        let indices: Vec<usize> = diagnosis.steps.iter().map(|s| s.record_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(diagnosis.normalized, "Max Mustermann");
        assert_eq!(diagnosis.fallback, FallbackOutcome::NotApplicable);
    }

    #[test]
    fn test_near_miss_reported() {
        let dir = directory(&["Erika Musterfrau"]);
        let resolver =
            MatchResolver::with_config(&dir, MatchingConfig::default().with_trace(true)).unwrap();
        let result = resolver.resolve("Max Mustermann");
        assert!(result.best.is_none());

        let near = result.diagnosis.unwrap().closest_below_threshold.unwrap();
        assert_eq!(near.record_index, 0);
        assert!(near.score > 0 && near.score < 80);
    }

    #[test]
    fn test_no_trace_by_default() {
        let dir = directory(&["Max Mustermann"]);
        assert!(resolve("Max Mustermann", &dir, 80).unwrap().diagnosis.is_none());
    }

    #[test]
    fn test_empty_payer_name() {
        let dir = directory(&["Max Mustermann"]);
        let result = resolve("", &dir, 80).unwrap();
        assert_eq!(result.variants, vec![""]);
        assert!(result.best.is_none());
    }

    #[test]
    fn test_empty_directory() {
        let result = resolve("Max Mustermann", &[], 80).unwrap();
        assert!(result.best.is_none());
    }

    #[test]
    fn test_best_score_prefers_first_of_equals() {
        let (score, strategy) = best_score(&[
            (90, Strategy::Ratio),
            (95, Strategy::TokenSort),
            (95, Strategy::NormalizedTokenSort),
        ]);
        assert_eq!(score, 95);
        assert_eq!(strategy, Strategy::TokenSort);
    }
}
