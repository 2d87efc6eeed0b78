//! Multiplier search: candidate filtering, workers and the parallel run.
//!
//! - `candidate`: shaping a raw draw and filtering it through primality and
//!   spectral tests
//! - `worker`: one stream, one budget, candidates in discovery order
//! - `parallel`: partition, dispatch, rendezvous and ordered merge

pub mod candidate;
pub mod config;
pub mod parallel;
pub mod result;
pub mod worker;

pub use candidate::{Candidate, CandidateFilter, FilterOutcome};
pub use config::SearchConfig;
pub use parallel::{FailurePolicy, ParallelConfig, ParallelResult, run_parallel_search};
pub use result::{SearchResult, SearchStatistics, WorkerStatistics};
pub use worker::{SearchTask, SearchWorker};
