//! Configuration for parallel search execution.

/// What to do with the other workers' results when a worker fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole run; no candidates are published.
    #[default]
    Abort,
    /// Publish the surviving workers' candidates and report the failures.
    KeepPartial,
}

/// Configuration for parallel search execution.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of workers, including the one run on the coordinating thread.
    pub num_workers: usize,
    /// Process seed (None = drawn from the operating system).
    pub base_seed: Option<u64>,
    pub failure_policy: FailurePolicy,
    /// Whether to start the progress printer.
    pub report_progress: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get().max(1),
            base_seed: None,
            failure_policy: FailurePolicy::Abort,
            report_progress: true,
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel config with the specified number of workers.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Set the process seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base_seed = Some(seed);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_progress(mut self, report_progress: bool) -> Self {
        self.report_progress = report_progress;
        self
    }

    /// Number of workers spawned on their own threads.
    pub fn num_spawned_workers(&self) -> usize {
        self.num_workers.saturating_sub(1)
    }
}
