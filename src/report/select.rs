//! Shortlisting candidates from a finished search.
//!
//! Duplicates are dropped, only scores at or above a quantile are kept, and
//! the survivors are ranked by period (`multiplier / 2^64`).

use std::fmt::Write;

use crate::error::SearchError;
use crate::search::candidate::Candidate;

pub const DEFAULT_QUANTILE: f64 = 0.95;
pub const DEFAULT_TOP: usize = 50;

/// 2^64 as a float.
const PERIOD_SCALE: f64 = 18_446_744_073_709_551_616.0;

#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub quantile: f64,
    /// Number of rows in the ranking.
    pub top: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            quantile: DEFAULT_QUANTILE,
            top: DEFAULT_TOP,
        }
    }
}

impl SelectionConfig {
    pub fn with_quantile(mut self, quantile: f64) -> Self {
        self.quantile = quantile;
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if !(0.0..=1.0).contains(&self.quantile) {
            return Err(SearchError::InvalidConfig(format!(
                "quantile must be within [0, 1], got {}",
                self.quantile
            )));
        }
        Ok(())
    }
}

/// A kept candidate with its period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedCandidate {
    pub multiplier: u64,
    pub spectral_score: f64,
    pub period: f64,
}

impl From<Candidate> for SelectedCandidate {
    fn from(candidate: Candidate) -> Self {
        Self {
            multiplier: candidate.multiplier,
            spectral_score: candidate.spectral_score,
            period: period(candidate.multiplier),
        }
    }
}

/// Descriptive statistics of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 for fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            0.0
        } else {
            let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: interpolate(&sorted, 0.25),
            median: interpolate(&sorted, 0.5),
            q75: interpolate(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

#[derive(Debug, Clone)]
pub struct Selection {
    /// Rows read, duplicates included.
    pub total: usize,
    /// Distinct rows.
    pub unique: usize,
    /// Score cutoff; `None` when there were no rows.
    pub cutoff: Option<f64>,
    /// Kept rows in file order.
    pub kept: Vec<SelectedCandidate>,
}

impl Selection {
    /// Kept rows by descending period. Ties keep file order.
    pub fn ranked(&self, top: usize) -> Vec<SelectedCandidate> {
        let mut ranked = self.kept.clone();
        ranked.sort_by(|a, b| b.period.total_cmp(&a.period));
        ranked.truncate(top);
        ranked
    }

    pub fn score_summary(&self) -> Option<ColumnSummary> {
        let scores: Vec<f64> = self.kept.iter().map(|c| c.spectral_score).collect();
        ColumnSummary::of(&scores)
    }

    pub fn period_summary(&self) -> Option<ColumnSummary> {
        let periods: Vec<f64> = self.kept.iter().map(|c| c.period).collect();
        ColumnSummary::of(&periods)
    }

    pub fn format_report(&self, top: usize) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "Rows: {} ({} unique)", self.total, self.unique);
        if let Some(cutoff) = self.cutoff {
            let _ = writeln!(s, "Score cutoff: {:.6}", cutoff);
        }
        let _ = writeln!(s, "Kept: {}", self.kept.len());

        if let (Some(score), Some(period)) = (self.score_summary(), self.period_summary()) {
            let _ = writeln!(s);
            let _ = writeln!(s, "{:>8} {:>16} {:>16}", "", "Spectral score", "Period");
            let rows = [
                ("count", score.count as f64, period.count as f64),
                ("mean", score.mean, period.mean),
                ("std", score.std, period.std),
                ("min", score.min, period.min),
                ("25%", score.q25, period.q25),
                ("50%", score.median, period.median),
                ("75%", score.q75, period.q75),
                ("max", score.max, period.max),
            ];
            for (label, a, b) in rows {
                let _ = writeln!(s, "{:>8} {:>16.6} {:>16.6}", label, a, b);
            }
        }

        let ranked = self.ranked(top);
        if !ranked.is_empty() {
            let _ = writeln!(s);
            let _ = writeln!(s, "{:<18} {:>16} {:>16}", "Multiplier", "Spectral score", "Period");
            for row in ranked {
                let _ = writeln!(
                    s,
                    "{:<18} {:>16.6} {:>16.6}",
                    format!("{:x}", row.multiplier),
                    row.spectral_score,
                    row.period
                );
            }
        }
        s
    }
}

/// `multiplier / 2^64`.
pub fn period(multiplier: u64) -> f64 {
    multiplier as f64 / PERIOD_SCALE
}

/// Drop exact repeats, keeping the first occurrence.
pub fn dedup(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .iter()
        .filter(|c| seen.insert((c.multiplier, c.spectral_score.to_bits())))
        .copied()
        .collect()
}

/// Quantile with linear interpolation between order statistics.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(interpolate(&sorted, q))
}

fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

pub fn select(
    candidates: &[Candidate],
    config: &SelectionConfig,
) -> Result<Selection, SearchError> {
    config.validate()?;
    let unique = dedup(candidates);
    let scores: Vec<f64> = unique.iter().map(|c| c.spectral_score).collect();
    let cutoff = quantile(&scores, config.quantile);

    let kept = match cutoff {
        Some(cutoff) => unique
            .iter()
            .filter(|c| c.spectral_score >= cutoff)
            .map(|&c| SelectedCandidate::from(c))
            .collect(),
        None => Vec::new(),
    };

    Ok(Selection {
        total: candidates.len(),
        unique: unique.len(),
        cutoff,
        kept,
    })
}
