//! Spectral test for multipliers of full-period congruential generators.
//!
//! For every dimension `d` in `2..=max_dim` the dual lattice of the
//! generator is reduced and its shortest basis row is compared with the
//! Hermite-type bound for that dimension. The normalized figures of merit lie
//! in (0, 1]; the score of a multiplier is their harmonic-weighted mean, and a
//! multiplier whose worst dimension falls below the threshold scores 0.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

use crate::error::SearchError;
use crate::numeric::{norm_squared, IntegerLll, LatticeReducer, ReductionError, ReductionParameter};

/// Largest dimension with a tabulated normalization constant.
pub const MAX_DIMENSION: usize = 24;

/// Hermite constants gamma_t for t = 2..=24 (Knuth, TAOCP vol. 2, 3.3.4).
pub const GAMMA_T: [f64; MAX_DIMENSION - 1] = [
    1.1547005383793, // gamma_2
    1.2599210498949,
    1.4142135623731,
    1.5157165665104,
    1.6653663553112,
    1.8114473285278,
    2.0,
    2.0,
    2.0583720179295,
    2.140198065871,
    2.3094010767585,
    2.3563484301065,
    2.4886439198224,
    2.6390158215458,
    2.8284271247462,
    2.8866811540599,
    2.986825999361,
    3.0985192845333,
    3.2490095854249,
    3.3914559675101,
    3.5727801951422,
    3.7660273525956,
    4.0, // gamma_24
];

/// Parameters of the spectral test, shared read-only by all workers.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralConfig {
    /// Highest dimension tested (2..=24).
    pub max_dim: usize,
    /// Generator modulus.
    pub modulus: BigUint,
    /// LLL parameter delta.
    pub reduction: ReductionParameter,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            max_dim: MAX_DIMENSION,
            modulus: BigUint::one() << 64u32,
            reduction: ReductionParameter::default(),
        }
    }
}

impl SpectralConfig {
    pub fn with_max_dim(mut self, max_dim: usize) -> Self {
        self.max_dim = max_dim;
        self
    }

    pub fn with_modulus(mut self, modulus: BigUint) -> Self {
        self.modulus = modulus;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if !(2..=MAX_DIMENSION).contains(&self.max_dim) {
            return Err(SearchError::InvalidConfig(format!(
                "max dimension {} is outside 2..={}",
                self.max_dim, MAX_DIMENSION
            )));
        }
        if self.modulus <= BigUint::one() {
            return Err(SearchError::InvalidConfig(format!(
                "modulus {} must be at least 2",
                self.modulus
            )));
        }
        self.reduction
            .validate()
            .map_err(|e| SearchError::InvalidConfig(e.to_string()))
    }
}

/// Figure of merit in one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionMerit {
    pub dimension: usize,
    /// Squared norm of the shortest row of the reduced dual basis.
    pub min_norm_sq: BigInt,
    pub figure_of_merit: f64,
}

/// Spectral test bound to one configuration and reduction backend.
#[derive(Debug, Clone)]
pub struct SpectralTest<R = IntegerLll> {
    config: SpectralConfig,
    reducer: R,
    /// 1 / (sqrt(gamma_d) * modulus^(1/d)), indexed by d - 2.
    tnorm: Vec<f64>,
}

impl SpectralTest<IntegerLll> {
    pub fn new(config: SpectralConfig) -> Result<Self, SearchError> {
        Self::with_reducer(config, IntegerLll)
    }
}

impl<R: LatticeReducer> SpectralTest<R> {
    pub fn with_reducer(config: SpectralConfig, reducer: R) -> Result<Self, SearchError> {
        config.validate()?;
        let modulus = config.modulus.to_f64().unwrap_or(f64::INFINITY);
        let tnorm = (2..=config.max_dim)
            .map(|d| 1.0 / (GAMMA_T[d - 2].sqrt() * modulus.powf(1.0 / d as f64)))
            .collect();
        Ok(Self {
            config,
            reducer,
            tnorm,
        })
    }

    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Scores `multiplier`, or returns 0 if it is not below the modulus or if
    /// its figure of merit in any dimension is below `threshold`.
    pub fn test(&self, multiplier: &BigUint, threshold: f64) -> Result<f64, ReductionError> {
        if multiplier >= &self.config.modulus {
            return Ok(0.0);
        }

        let multiplier = BigInt::from(multiplier.clone());
        let mut harm_score = 0.0;
        let mut harm_norm = 0.0;
        let mut min_fm = f64::INFINITY;

        for d in 2..=self.config.max_dim {
            let merit = self.merit(&multiplier, d)?;
            min_fm = min_fm.min(merit.figure_of_merit);
            // No later dimension can raise the minimum again.
            if min_fm < threshold {
                return Ok(0.0);
            }
            harm_score += merit.figure_of_merit / (d - 1) as f64;
            harm_norm += 1.0 / (d - 1) as f64;
        }

        Ok(harm_score / harm_norm)
    }

    /// Figures of merit for every dimension, lowest dimension first.
    pub fn figures_of_merit(
        &self,
        multiplier: &BigUint,
    ) -> Result<Vec<DimensionMerit>, ReductionError> {
        let multiplier = BigInt::from(multiplier.clone());
        (2..=self.config.max_dim)
            .map(|d| self.merit(&multiplier, d))
            .collect()
    }

    fn merit(&self, multiplier: &BigInt, d: usize) -> Result<DimensionMerit, ReductionError> {
        let mut basis = dual_basis(&self.config.modulus, multiplier, d);
        self.reducer.reduce(&mut basis, self.config.reduction)?;

        let min_norm_sq = basis
            .iter()
            .map(|row| norm_squared(row))
            .min()
            .unwrap_or_else(BigInt::zero);
        let figure_of_merit =
            self.tnorm[d - 2] * min_norm_sq.to_f64().unwrap_or(f64::INFINITY).sqrt();

        Ok(DimensionMerit {
            dimension: d,
            min_norm_sq,
            figure_of_merit,
        })
    }
}

/// Harmonic-weighted mean of per-dimension figures of merit.
pub fn harmonic_score(merits: &[DimensionMerit]) -> f64 {
    let (score, norm) = merits.iter().fold((0.0, 0.0), |(score, norm), merit| {
        let weight = (merit.dimension - 1) as f64;
        (score + merit.figure_of_merit / weight, norm + 1.0 / weight)
    });
    if norm == 0.0 {
        0.0
    } else {
        score / norm
    }
}

/// Basis of the dual lattice of `x -> multiplier * x (mod modulus)` in dimension `d`:
/// row 0 is (m, 0, ..., 0), row i is (-a^i, e_i).
pub fn dual_basis(modulus: &BigUint, multiplier: &BigInt, d: usize) -> Vec<Vec<BigInt>> {
    let mut basis = vec![vec![BigInt::zero(); d]; d];
    basis[0][0] = BigInt::from(modulus.clone());
    let mut power = BigInt::one();
    for (i, row) in basis.iter_mut().enumerate().skip(1) {
        power *= multiplier;
        row[i] = BigInt::one();
        row[0] = -power.clone();
    }
    basis
}
