//! Parallel search execution over a fixed pool of workers.
//!
//! # Architecture
//!
//! The parallel search system consists of:
//! - A **coordinator** that splits one stream per worker from the process
//!   seed, dispatches the budget and merges results in worker order
//! - Multiple **workers**, one of them on the coordinating thread
//! - A **progress channel** feeding a single printer thread
//!
//! # Example
//!
//! ```ignore
//! use spectral_search::search::parallel::{ParallelConfig, run_parallel_search};
//!
//! let config = ParallelConfig::default().with_workers(4).with_seed(42);
//! let result = run_parallel_search(spectral, MillerRabin::default(), &search_config, &config)?;
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;

pub use config::{FailurePolicy, ParallelConfig};
pub use coordinator::{ParallelResult, derive_streams, partition, run_parallel_search};
