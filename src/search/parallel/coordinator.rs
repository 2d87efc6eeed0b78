//! Parallel search coordinator that manages worker threads.
//!
//! A run goes through partition, stream derivation, dispatch, a rendezvous
//! with every worker, and a merge. Streams are split from the root generator
//! in ascending worker order and results are concatenated in the same order,
//! so the output depends only on the seed, the budget and the worker count.

use rand::Rng;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::error::SearchError;
use crate::numeric::{LatticeReducer, PrimalityOracle};
use crate::rng::SplitMix;
use crate::search::candidate::{Candidate, CandidateFilter};
use crate::search::config::SearchConfig;
use crate::search::parallel::channel::{create_channels, spawn_printer, ProgressReporter};
use crate::search::parallel::config::{FailurePolicy, ParallelConfig};
use crate::search::result::{SearchResult, SearchStatistics, WorkerStatistics};
use crate::search::worker::{SearchTask, SearchWorker};
use crate::spectral::SpectralTest;

/// Result from parallel search execution.
#[derive(Debug)]
pub struct ParallelResult {
    /// Process seed the worker streams were derived from.
    pub seed: u64,
    /// Candidates of all successful workers, ascending worker id.
    pub candidates: Vec<Candidate>,
    /// Per-worker statistics, ascending worker id.
    pub worker_statistics: Vec<(usize, WorkerStatistics)>,
    /// Statistics aggregated from all successful workers.
    pub total_statistics: SearchStatistics,
    /// Worker failures kept under [`FailurePolicy::KeepPartial`].
    pub failures: Vec<SearchError>,
}

/// Draw a process seed from the operating system.
pub fn process_seed() -> u64 {
    rand::rng().random()
}

/// Split `total` iterations over `worker_count` workers. Every worker but the
/// last gets `total / worker_count`; the last one gets the remainder on top.
pub fn partition(total: u64, worker_count: usize) -> Vec<u64> {
    let workers = worker_count.max(1) as u64;
    let chunk = total / workers;
    let mut budgets = vec![chunk; (workers - 1) as usize];
    budgets.push(total - (workers - 1) * chunk);
    budgets
}

/// Split one stream per worker from the root seeded with `seed`, in
/// ascending worker order.
pub fn derive_streams(seed: u64, worker_count: usize) -> Vec<SplitMix> {
    SplitMix::new(seed).streams(worker_count)
}

/// Derive one task per budget. Task `i` owns stream `i`.
pub fn build_tasks(seed: u64, budgets: &[u64]) -> Vec<SearchTask> {
    derive_streams(seed, budgets.len())
        .into_iter()
        .zip(budgets)
        .enumerate()
        .map(|(worker_id, (stream, &iterations))| SearchTask {
            worker_id,
            stream,
            iterations,
        })
        .collect()
}

/// Run parallel search with the given configuration.
///
/// Workers `0..n-1` run on spawned threads; the last worker runs on the
/// calling thread. The call returns only after every worker has finished.
pub fn run_parallel_search<P, R>(
    spectral: SpectralTest<R>,
    primality: P,
    search_config: &SearchConfig,
    parallel_config: &ParallelConfig,
) -> Result<ParallelResult, SearchError>
where
    P: PrimalityOracle + 'static,
    R: LatticeReducer + 'static,
{
    search_config.validate()?;
    let start_time = Instant::now();
    let seed = parallel_config.base_seed.unwrap_or_else(process_seed);
    let num_workers = parallel_config.num_workers.max(1);

    let budgets = partition(search_config.total_iterations, num_workers);
    let mut tasks = build_tasks(seed, &budgets);

    let filter =
        Arc::new(CandidateFilter::new(spectral, primality).with_threshold(search_config.threshold));
    let interval = search_config.progress_interval;

    let (printer, mut reporters) = if parallel_config.report_progress {
        let (rx, reporters) = create_channels(num_workers);
        (Some(spawn_printer(rx, search_config.verbose)), reporters)
    } else {
        (None, vec![ProgressReporter::silent(); num_workers])
    };

    let coordinator_task = tasks.pop();
    let coordinator_reporter = reporters.pop();

    // Spawn workers
    let worker_handles: Vec<_> = tasks
        .into_iter()
        .zip(reporters)
        .map(|(task, reporter)| {
            let filter = Arc::clone(&filter);
            let worker_id = task.worker_id;
            let handle = std::thread::spawn(move || {
                SearchWorker::new(filter.as_ref())
                    .with_progress(reporter, interval)
                    .run(task)
            });
            (worker_id, handle)
        })
        .collect();

    // The coordinating thread runs the last chunk itself.
    let coordinator_outcome = match (coordinator_task, coordinator_reporter) {
        (Some(task), Some(reporter)) => {
            let worker_id = task.worker_id;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                SearchWorker::new(filter.as_ref())
                    .with_progress(reporter, interval)
                    .run(task)
            }));
            Some(flatten_outcome(worker_id, outcome))
        }
        _ => None,
    };

    // Wait for all workers to finish
    let mut outcomes: Vec<Result<SearchResult, SearchError>> = worker_handles
        .into_iter()
        .map(|(worker_id, handle)| flatten_outcome(worker_id, handle.join()))
        .collect();
    outcomes.extend(coordinator_outcome);

    if let Some(printer) = printer {
        let _ = printer.join();
    }

    let merged = merge_results(outcomes, parallel_config.failure_policy)?;
    let total_statistics = SearchStatistics::aggregate(
        merged.worker_statistics.iter().map(|(_, stats)| stats),
        start_time.elapsed(),
    );

    Ok(ParallelResult {
        seed,
        candidates: merged.candidates,
        worker_statistics: merged.worker_statistics,
        total_statistics,
        failures: merged.failures,
    })
}

/// Worker results merged in ascending worker id.
#[derive(Debug, Default)]
pub struct MergedResults {
    pub candidates: Vec<Candidate>,
    pub worker_statistics: Vec<(usize, WorkerStatistics)>,
    pub failures: Vec<SearchError>,
}

/// Concatenate worker results in ascending worker id, keeping each worker's
/// discovery order. Under [`FailurePolicy::Abort`] the failure of the lowest
/// worker id is returned instead.
pub fn merge_results(
    mut outcomes: Vec<Result<SearchResult, SearchError>>,
    policy: FailurePolicy,
) -> Result<MergedResults, SearchError> {
    outcomes.sort_by_key(|outcome| match outcome {
        Ok(result) => result.worker_id,
        Err(e) => e.worker_id().unwrap_or(usize::MAX),
    });

    let mut merged = MergedResults::default();
    for outcome in outcomes {
        match outcome {
            Ok(result) => {
                merged.candidates.extend(result.candidates);
                merged
                    .worker_statistics
                    .push((result.worker_id, result.statistics));
            }
            Err(e) => match policy {
                FailurePolicy::Abort => return Err(e),
                FailurePolicy::KeepPartial => merged.failures.push(e),
            },
        }
    }
    Ok(merged)
}

fn flatten_outcome(
    worker_id: usize,
    outcome: Result<Result<SearchResult, SearchError>, Box<dyn Any + Send>>,
) -> Result<SearchResult, SearchError> {
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(SearchError::WorkerFailed {
            worker_id,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
