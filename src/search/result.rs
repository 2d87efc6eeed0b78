//! Search result types and statistics

use std::time::Duration;

use crate::search::candidate::{Candidate, FilterOutcome};

/// Candidates found by one worker, in discovery order.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub worker_id: usize,
    pub candidates: Vec<Candidate>,
    pub statistics: WorkerStatistics,
}

/// Counters kept by one worker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerStatistics {
    /// Number of draws processed
    pub iterations: u64,
    pub out_of_range: u64,
    pub composite_modulus: u64,
    pub composite_half: u64,
    pub below_threshold: u64,
    pub accepted: u64,
    pub elapsed_time: Duration,
}

impl WorkerStatistics {
    /// Count one filter outcome.
    pub fn record(&mut self, outcome: &FilterOutcome) {
        self.iterations += 1;
        match outcome {
            FilterOutcome::Accepted(_) => self.accepted += 1,
            FilterOutcome::OutOfRange => self.out_of_range += 1,
            FilterOutcome::CompositeModulus => self.composite_modulus += 1,
            FilterOutcome::CompositeHalf => self.composite_half += 1,
            FilterOutcome::BelowThreshold => self.below_threshold += 1,
        }
    }

    /// Draws that reached the spectral test.
    pub fn spectral_tests(&self) -> u64 {
        self.below_threshold + self.accepted
    }

    /// Get iterations per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.iterations as f64 / secs
        }
    }
}

/// Statistics aggregated over all workers of a run.
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    pub workers: usize,
    pub totals: WorkerStatistics,
    /// Wall-clock time of the whole run.
    pub elapsed_time: Duration,
}

impl SearchStatistics {
    pub fn aggregate<'a>(
        workers: impl IntoIterator<Item = &'a WorkerStatistics>,
        elapsed_time: Duration,
    ) -> Self {
        let mut stats = SearchStatistics {
            elapsed_time,
            ..Default::default()
        };
        for worker in workers {
            stats.workers += 1;
            let totals = &mut stats.totals;
            totals.iterations += worker.iterations;
            totals.out_of_range += worker.out_of_range;
            totals.composite_modulus += worker.composite_modulus;
            totals.composite_half += worker.composite_half;
            totals.below_threshold += worker.below_threshold;
            totals.accepted += worker.accepted;
        }
        stats.totals.elapsed_time = elapsed_time;
        stats
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let totals = &self.totals;
        let mut s = String::new();
        s.push_str(&format!("Workers: {}\n", self.workers));
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Iterations: {}\n", totals.iterations));
        s.push_str(&format!(
            "Throughput: {:.0} iterations/sec\n",
            totals.throughput()
        ));
        s.push_str(&format!("Out of range: {}\n", totals.out_of_range));
        s.push_str(&format!(
            "Composite (a << 192) - 1: {}\n",
            totals.composite_modulus
        ));
        s.push_str(&format!("Composite half: {}\n", totals.composite_half));
        s.push_str(&format!("Spectral tests: {}\n", totals.spectral_tests()));
        s.push_str(&format!("Below threshold: {}\n", totals.below_threshold));
        s.push_str(&format!("Candidates found: {}\n", totals.accepted));
        s
    }
}
