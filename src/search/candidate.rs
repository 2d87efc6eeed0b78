//! Per-draw filtering of multipliers.

use num_bigint::BigUint;

use crate::numeric::{IntegerLll, LatticeReducer, MillerRabin, PrimalityOracle, ReductionError};
use crate::spectral::SpectralTest;

/// Both top bits are forced on every draw.
pub const TOP_BITS: u64 = 0xc000_0000_0000_0000;

/// Shift applied to the multiplier when building the full-period modulus.
pub const MODULUS_SHIFT: u32 = 192;

/// Default minimum figure of merit over all dimensions.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// A multiplier that passed every filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub multiplier: u64,
    /// Harmonic-weighted spectral score, always > 0.
    pub spectral_score: f64,
}

/// Result of filtering one raw draw. Only `Accepted` produces a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOutcome {
    Accepted(Candidate),
    /// Multiplier is not below the spectral modulus.
    OutOfRange,
    /// `(a << 192) - 1` is composite.
    CompositeModulus,
    /// `((a << 192) - 1) >> 1` is composite.
    CompositeHalf,
    /// Some dimension has a figure of merit below the threshold.
    BelowThreshold,
}

impl FilterOutcome {
    pub fn candidate(&self) -> Option<Candidate> {
        match self {
            FilterOutcome::Accepted(candidate) => Some(*candidate),
            _ => None,
        }
    }
}

/// Shapes a draw into the searched range.
#[inline]
pub fn shape(raw: u64) -> u64 {
    raw | TOP_BITS
}

/// Primality and spectral filter shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct CandidateFilter<P = MillerRabin, R = IntegerLll> {
    spectral: SpectralTest<R>,
    primality: P,
    threshold: f64,
}

impl<P: PrimalityOracle, R: LatticeReducer> CandidateFilter<P, R> {
    pub fn new(spectral: SpectralTest<R>, primality: P) -> Self {
        Self {
            spectral,
            primality,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Runs one raw draw through every filter. Rejections are outcomes, not
    /// errors; only a failure of the reduction backend is an error.
    pub fn evaluate(&self, raw: u64) -> Result<FilterOutcome, ReductionError> {
        let x = shape(raw);
        let a = BigUint::from(x);
        if a >= self.spectral.config().modulus {
            return Ok(FilterOutcome::OutOfRange);
        }

        let m = (&a << MODULUS_SHIFT) - 1u32;
        if !self.primality.is_probably_prime(&m) {
            return Ok(FilterOutcome::CompositeModulus);
        }
        let p = &m >> 1u32;
        if !self.primality.is_probably_prime(&p) {
            return Ok(FilterOutcome::CompositeHalf);
        }

        let score = self.spectral.test(&a, self.threshold)?;
        if score == 0.0 {
            return Ok(FilterOutcome::BelowThreshold);
        }

        Ok(FilterOutcome::Accepted(Candidate {
            multiplier: x,
            spectral_score: score,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::SpectralConfig;

    fn default_filter() -> CandidateFilter {
        let spectral = SpectralTest::new(SpectralConfig::default()).unwrap();
        CandidateFilter::new(spectral, MillerRabin::default())
    }

    /// Primality oracle that accepts everything, to isolate the spectral step.
    struct AlwaysPrime;

    impl PrimalityOracle for AlwaysPrime {
        fn is_probably_prime(&self, _n: &BigUint) -> bool {
            true
        }
    }

    #[test]
    fn test_shape_sets_top_bits() {
        assert_eq!(shape(0), 0xc000_0000_0000_0000);
        assert_eq!(shape(0x1234), 0xc000_0000_0000_1234);
        assert_eq!(shape(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_accepts_full_period_multiplier() {
        let filter = default_filter();
        let outcome = filter.evaluate(0xcba2723cca35d642).unwrap();
        let candidate = outcome.candidate().expect("multiplier should pass");
        assert_eq!(candidate.multiplier, 0xcba2723cca35d642);
        assert!((candidate.spectral_score - 0.7343581481514461).abs() < 1e-9);
    }

    #[test]
    fn test_top_bits_forced_before_filtering() {
        // Same multiplier with both top bits cleared.
        let filter = default_filter();
        let outcome = filter.evaluate(0x0ba2723cca35d642).unwrap();
        assert_eq!(outcome.candidate().unwrap().multiplier, 0xcba2723cca35d642);
    }

    #[test]
    fn test_composite_modulus_rejected_despite_good_score() {
        // 0xd1342543de82ef95 scores 0.8257 but (a << 192) - 1 is composite.
        let filter = default_filter();
        assert_eq!(
            filter.evaluate(0xd1342543de82ef95).unwrap(),
            FilterOutcome::CompositeModulus
        );
    }

    #[test]
    fn test_composite_half_rejected() {
        let filter = default_filter();
        assert_eq!(
            filter.evaluate(0xf6b9aeef0d2df7ab).unwrap(),
            FilterOutcome::CompositeHalf
        );
    }

    #[test]
    fn test_below_threshold_rejected() {
        // Worst figure of merit of 0xf7c2ebc08f67f2b5 is 0.49906.
        let spectral = SpectralTest::new(SpectralConfig::default()).unwrap();
        let filter = CandidateFilter::new(spectral, AlwaysPrime);
        assert_eq!(
            filter.evaluate(0xf7c2ebc08f67f2b5).unwrap(),
            FilterOutcome::BelowThreshold
        );

        let filter = filter.with_threshold(0.49);
        assert!(filter.evaluate(0xf7c2ebc08f67f2b5).unwrap().candidate().is_some());
    }

    #[test]
    fn test_out_of_range_for_small_modulus() {
        let spectral = SpectralTest::new(
            SpectralConfig::default()
                .with_modulus(BigUint::from(1u64 << 40))
                .with_max_dim(4),
        )
        .unwrap();
        let filter = CandidateFilter::new(spectral, AlwaysPrime);
        assert_eq!(filter.evaluate(12345).unwrap(), FilterOutcome::OutOfRange);
    }
}
