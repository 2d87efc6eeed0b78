//! Exact integral LLL reduction.
//!
//! All Gram-Schmidt quantities are kept as integers: `d[i]` is the Gram
//! determinant of the first `i` rows and `lambda[k][j] = d[j] * mu[k][j]`.
//! Every division performed below is exact, so the reduced basis depends only
//! on the input basis and the reduction parameter.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use super::{dot, LatticeReducer, ReductionError, ReductionParameter};

/// Integral LLL reducer over `BigInt` rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerLll;

impl LatticeReducer for IntegerLll {
    fn reduce(
        &self,
        basis: &mut [Vec<BigInt>],
        delta: ReductionParameter,
    ) -> Result<(), ReductionError> {
        delta.validate()?;
        if basis.is_empty() {
            return Ok(());
        }

        let width = basis[0].len();
        for (row, vector) in basis.iter().enumerate() {
            if vector.len() != width {
                return Err(ReductionError::Ragged {
                    row,
                    expected: width,
                    found: vector.len(),
                });
            }
        }

        Reduction::new(basis).run(delta)
    }
}

/// Working state of one reduction. Row indices are 1-based here, `d[0] = 1`.
struct Reduction<'a> {
    b: &'a mut [Vec<BigInt>],
    d: Vec<BigInt>,
    lambda: Vec<Vec<BigInt>>,
}

impl<'a> Reduction<'a> {
    fn new(b: &'a mut [Vec<BigInt>]) -> Self {
        let n = b.len();
        Self {
            b,
            d: vec![BigInt::zero(); n + 1],
            lambda: vec![vec![BigInt::zero(); n + 1]; n + 1],
        }
    }

    fn run(mut self, delta: ReductionParameter) -> Result<(), ReductionError> {
        let n = self.b.len();
        let p = BigInt::from(delta.numerator);
        let q = BigInt::from(delta.denominator);

        self.d[0] = BigInt::from(1);
        self.d[1] = dot(&self.b[0], &self.b[0]);
        if self.d[1].is_zero() {
            return Err(ReductionError::LinearlyDependent { row: 0 });
        }

        let mut k = 2;
        let mut k_max = 1;
        while k <= n {
            if k > k_max {
                k_max = k;
                self.orthogonalize(k)?;
            }

            loop {
                self.size_reduce(k, k - 1);
                if self.lovasz_fails(k, &p, &q) {
                    self.swap(k, k_max);
                    k = (k - 1).max(2);
                } else {
                    break;
                }
            }

            for l in (1..k - 1).rev() {
                self.size_reduce(k, l);
            }
            k += 1;
        }

        Ok(())
    }

    /// Incremental Gram-Schmidt for row `k`.
    fn orthogonalize(&mut self, k: usize) -> Result<(), ReductionError> {
        for j in 1..=k {
            let mut u = dot(&self.b[k - 1], &self.b[j - 1]);
            for i in 1..j {
                u = (&self.d[i] * &u - &self.lambda[k][i] * &self.lambda[j][i]) / &self.d[i - 1];
            }
            if j < k {
                self.lambda[k][j] = u;
            } else {
                self.d[k] = u;
            }
        }

        if self.d[k].is_zero() {
            return Err(ReductionError::LinearlyDependent { row: k - 1 });
        }
        Ok(())
    }

    /// Makes |mu[k][l]| <= 1/2 by subtracting the nearest multiple of row `l`.
    fn size_reduce(&mut self, k: usize, l: usize) {
        let twice: BigInt = &self.lambda[k][l] * 2;
        if twice.abs() <= self.d[l] {
            return;
        }

        // Nearest integer to lambda / d, ties rounded up.
        let r = (twice + &self.d[l]).div_floor(&(&self.d[l] * 2));

        let source = self.b[l - 1].clone();
        for (x, y) in self.b[k - 1].iter_mut().zip(&source) {
            *x -= &r * y;
        }

        let step = &r * &self.d[l];
        self.lambda[k][l] -= step;
        for i in 1..l {
            let step = &r * &self.lambda[l][i];
            self.lambda[k][i] -= step;
        }
    }

    /// Lovasz condition, scaled to integers: swap when
    /// q * (d[k] * d[k-2] + lambda^2) < p * d[k-1]^2.
    fn lovasz_fails(&self, k: usize, p: &BigInt, q: &BigInt) -> bool {
        let lam = &self.lambda[k][k - 1];
        let lhs = q * (&self.d[k] * &self.d[k - 2] + lam * lam);
        let rhs = p * &self.d[k - 1] * &self.d[k - 1];
        lhs < rhs
    }

    fn swap(&mut self, k: usize, k_max: usize) {
        self.b.swap(k - 1, k - 2);
        for j in 1..k - 1 {
            let upper = std::mem::take(&mut self.lambda[k][j]);
            self.lambda[k][j] = std::mem::replace(&mut self.lambda[k - 1][j], upper);
        }

        let lam = self.lambda[k][k - 1].clone();
        let b = (&self.d[k - 2] * &self.d[k] + &lam * &lam) / &self.d[k - 1];

        for i in k + 1..=k_max {
            let t = self.lambda[i][k].clone();
            self.lambda[i][k] = (&self.d[k] * &self.lambda[i][k - 1] - &lam * &t) / &self.d[k - 1];
            self.lambda[i][k - 1] = (&b * &t + &lam * &self.lambda[i][k]) / &self.d[k];
        }

        self.d[k - 1] = b;
    }
}
