//! Resolution of many payer names against one directory.
//!
//! Every `resolve` call is independent and read-only, so a batch is split into
//! contiguous chunks that run on scoped worker threads sharing the prepared
//! directory. Progress and cancellation live here, at the batch-loop level.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::Serialize;
use tracing::{debug, info};

use crate::matching::engine::{MatchResolver, MatchResult};

/// Outcome of a batch run; `results[i]` belongs to input `i`
#[derive(Debug)]
pub struct BatchOutcome<'a> {
    /// `None` for items skipped after cancellation
    pub results: Vec<Option<MatchResult<'a>>>,
    /// Set when at least one item was skipped
    pub cancelled: bool,
}

/// Counts for the end-of-run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub needs_review: usize,
    pub not_processed: usize,
}

impl BatchOutcome<'_> {
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.results.len(),
            ..BatchSummary::default()
        };

        for result in &self.results {
            match result {
                None => summary.not_processed += 1,
                Some(r) => {
                    if r.is_match() {
                        summary.matched += 1;
                    } else {
                        summary.unmatched += 1;
                    }
                    if r.confidence.needs_review() {
                        summary.needs_review += 1;
                    }
                }
            }
        }

        summary
    }
}

/// Runs a [`MatchResolver`] over many names on a fixed number of threads
pub struct BatchResolver<'r, 'a> {
    resolver: &'r MatchResolver<'a>,
    workers: usize,
}

impl<'r, 'a> BatchResolver<'r, 'a> {
    pub fn new(resolver: &'r MatchResolver<'a>) -> Self {
        let workers = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self { resolver, workers }
    }

    /// Use `workers` threads (at least one)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Resolve every name, preserving input order.
    ///
    /// `progress(done, total)` is called after each completed resolution, from
    /// whichever worker finished it. Setting `cancel` stops workers before
    /// their next item; remaining items come back as `None`.
    pub fn resolve_all<S, F>(
        &self,
        names: &[S],
        progress: F,
        cancel: Option<&AtomicBool>,
    ) -> BatchOutcome<'a>
    where
        S: AsRef<str> + Sync,
        F: Fn(usize, usize) + Sync,
    {
        let total = names.len();
        let workers = self.workers.min(total.max(1));
        let chunk_size = total.div_ceil(workers).max(1);
        let done = AtomicUsize::new(0);

        info!("Resolving {} names on {} worker(s)", total, workers);

        let chunks: Vec<Vec<Option<MatchResult<'a>>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = names
                .chunks(chunk_size)
                .map(|chunk| {
                    let done = &done;
                    let progress = &progress;
                    let resolver = self.resolver;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|name| {
                                if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                                    return None;
                                }
                                let result = resolver.resolve(name.as_ref());
                                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                                progress(finished, total);
                                Some(result)
                            })
                            .collect()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });

        let results: Vec<_> = chunks.into_iter().flatten().collect();

        // A flag raised after the last item changes nothing
        let cancelled = results.iter().any(Option::is_none);
        if cancelled {
            debug!(
                "Batch cancelled after {} of {} names",
                done.load(Ordering::Relaxed),
                total
            );
        }

        BatchOutcome { results, cancelled }
    }
}
