//! Number-theoretic capabilities used by the search.
//!
//! The search needs two oracles besides plain big-integer arithmetic: a
//! probabilistic primality test and an exact lattice basis reduction. Both are
//! traits so that another backend can be substituted, as long as it is
//! deterministic for fixed inputs.

pub mod lll;
pub mod primality;

pub use lll::IntegerLll;
pub use primality::MillerRabin;

use num_bigint::{BigInt, BigUint};
use std::fmt;

/// Probabilistic primality predicate.
pub trait PrimalityOracle: Send + Sync {
    /// Returns true if `n` is prime, with a negligible false-positive rate.
    /// Must return the same answer for the same `n` on every call.
    fn is_probably_prime(&self, n: &BigUint) -> bool;
}

/// Lattice basis reduction.
pub trait LatticeReducer: Send + Sync {
    /// Reduces the rows of `basis` in place.
    ///
    /// The reduced rows generate the same lattice and satisfy the size and
    /// Lovász conditions for `delta`.
    fn reduce(
        &self,
        basis: &mut [Vec<BigInt>],
        delta: ReductionParameter,
    ) -> Result<(), ReductionError>;
}

/// Reduction parameter `delta = numerator / denominator`, with 1/4 < delta < 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReductionParameter {
    pub numerator: u64,
    pub denominator: u64,
}

impl Default for ReductionParameter {
    fn default() -> Self {
        Self {
            numerator: 999_999_999,
            denominator: 1_000_000_000,
        }
    }
}

impl ReductionParameter {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, ReductionError> {
        let parameter = Self {
            numerator,
            denominator,
        };
        parameter.validate()?;
        Ok(parameter)
    }

    /// Checks 1/4 < delta < 1.
    pub fn validate(&self) -> Result<(), ReductionError> {
        let p = self.numerator as u128;
        let q = self.denominator as u128;
        if q == 0 || 4 * p <= q || p >= q {
            return Err(ReductionError::InvalidParameter {
                numerator: self.numerator,
                denominator: self.denominator,
            });
        }
        Ok(())
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Failure of the lattice reduction backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReductionError {
    /// delta is outside (1/4, 1).
    InvalidParameter { numerator: u64, denominator: u64 },
    /// Row `row` (zero-based) depends linearly on the rows before it.
    LinearlyDependent { row: usize },
    /// Rows have different lengths.
    Ragged { row: usize, expected: usize, found: usize },
}

impl fmt::Display for ReductionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionError::InvalidParameter {
                numerator,
                denominator,
            } => write!(
                f,
                "reduction parameter {}/{} is outside (1/4, 1)",
                numerator, denominator
            ),
            ReductionError::LinearlyDependent { row } => {
                write!(f, "basis row {} is linearly dependent", row)
            }
            ReductionError::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "basis row {} has {} entries, expected {}",
                row, found, expected
            ),
        }
    }
}

impl std::error::Error for ReductionError {}

/// Squared Euclidean norm of a basis row.
pub fn norm_squared(row: &[BigInt]) -> BigInt {
    dot(row, row)
}

/// Dot product of two basis rows.
pub fn dot(a: &[BigInt], b: &[BigInt]) -> BigInt {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
