//! Configuration for a search run

use crate::error::SearchError;
use crate::search::candidate::DEFAULT_THRESHOLD;

/// Default total number of draws (2^32).
pub const DEFAULT_TOTAL_ITERATIONS: u64 = 1 << 32;

/// Default number of iterations between progress reports (2^24).
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1 << 24;

/// Configuration of the search budget and filtering.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Total number of draws across all workers.
    pub total_iterations: u64,
    /// Minimum figure of merit a multiplier must reach in every dimension.
    pub threshold: f64,
    /// Each worker reports progress every this many iterations.
    pub progress_interval: u64,
    /// Enable verbose output
    pub verbose: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            total_iterations: DEFAULT_TOTAL_ITERATIONS,
            threshold: DEFAULT_THRESHOLD,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            verbose: false,
        }
    }
}

impl SearchConfig {
    pub fn with_iterations(mut self, total_iterations: u64) -> Self {
        self.total_iterations = total_iterations;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.progress_interval == 0 {
            return Err(SearchError::InvalidConfig(
                "progress interval must be positive".to_string(),
            ));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "threshold {} must be a non-negative number",
                self.threshold
            )));
        }
        Ok(())
    }
}
