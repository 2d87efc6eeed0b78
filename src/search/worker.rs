//! A single search worker: one stream, one budget, one ordered result.

use std::time::Instant;

use crate::error::SearchError;
use crate::numeric::{LatticeReducer, PrimalityOracle};
use crate::rng::SplitMix;
use crate::search::candidate::{shape, CandidateFilter};
use crate::search::config::DEFAULT_PROGRESS_INTERVAL;
use crate::search::parallel::channel::{ProgressMessage, ProgressReporter};
use crate::search::result::{SearchResult, WorkerStatistics};

/// Work assigned to one worker. Consumed by [`SearchWorker::run`].
#[derive(Debug, Clone)]
pub struct SearchTask {
    pub worker_id: usize,
    /// Stream owned exclusively by this worker.
    pub stream: SplitMix,
    pub iterations: u64,
}

pub struct SearchWorker<'a, P, R> {
    filter: &'a CandidateFilter<P, R>,
    progress: ProgressReporter,
    progress_interval: u64,
}

impl<'a, P: PrimalityOracle, R: LatticeReducer> SearchWorker<'a, P, R> {
    pub fn new(filter: &'a CandidateFilter<P, R>) -> Self {
        Self {
            filter,
            progress: ProgressReporter::silent(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter, interval: u64) -> Self {
        self.progress = progress;
        self.progress_interval = interval.max(1);
        self
    }

    /// Runs exactly `task.iterations` draws and returns the accepted
    /// candidates in discovery order.
    pub fn run(&self, task: SearchTask) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let SearchTask {
            worker_id,
            mut stream,
            iterations,
        } = task;

        let mut candidates = Vec::new();
        let mut statistics = WorkerStatistics::default();

        for iteration in 1..=iterations {
            let raw = stream.next();
            let outcome = self
                .filter
                .evaluate(raw)
                .map_err(|source| SearchError::Numeric {
                    worker_id,
                    multiplier: shape(raw),
                    source,
                })?;
            statistics.record(&outcome);
            if let Some(candidate) = outcome.candidate() {
                candidates.push(candidate);
            }

            if iteration % self.progress_interval == 0 {
                self.progress.report(ProgressMessage::Progress {
                    worker_id,
                    iterations: iteration,
                    found: candidates.len() as u64,
                });
            }
        }

        statistics.elapsed_time = start.elapsed();
        self.progress.report(ProgressMessage::Finished {
            worker_id,
            iterations,
            found: candidates.len() as u64,
        });

        Ok(SearchResult {
            worker_id,
            candidates,
            statistics,
        })
    }
}
