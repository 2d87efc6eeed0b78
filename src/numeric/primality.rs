//! Miller-Rabin primality oracle with fixed witnesses.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

use super::PrimalityOracle;

/// Trial division bound. Primes below it are used as divisors and witnesses.
const SMALL_PRIME_LIMIT: u32 = 1000;

/// Miller-Rabin test using the first `rounds` primes as witnesses.
///
/// Candidates are first trial-divided by every prime below 1000, which gives
/// an exact answer for inputs below 10^6 and rejects most composites cheaply.
#[derive(Debug, Clone)]
pub struct MillerRabin {
    rounds: usize,
    small_primes: Vec<u32>,
}

impl Default for MillerRabin {
    fn default() -> Self {
        Self::new(10)
    }
}

impl MillerRabin {
    /// `rounds` is clamped to 1..=168 (the number of primes below 1000).
    pub fn new(rounds: usize) -> Self {
        let small_primes = sieve_primes(SMALL_PRIME_LIMIT);
        Self {
            rounds: rounds.clamp(1, small_primes.len()),
            small_primes,
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// One strong-probable-prime round for odd `n > 3` with `n - 1 = d * 2^s`.
    fn passes_round(
        &self,
        n: &BigUint,
        n_minus_one: &BigUint,
        d: &BigUint,
        s: u64,
        base: u32,
    ) -> bool {
        let mut x = BigUint::from(base).modpow(d, n);
        if x.is_one() || &x == n_minus_one {
            return true;
        }
        for _ in 1..s {
            x = &x * &x % n;
            if &x == n_minus_one {
                return true;
            }
            if x.is_one() {
                return false;
            }
        }
        false
    }
}

impl PrimalityOracle for MillerRabin {
    fn is_probably_prime(&self, n: &BigUint) -> bool {
        if let Some(small) = n.to_u32() {
            if small < 2 {
                return false;
            }
            if small < SMALL_PRIME_LIMIT {
                return self.small_primes.binary_search(&small).is_ok();
            }
        }

        for &p in &self.small_primes {
            if (n % p).is_zero() {
                return false;
            }
        }

        let limit = SMALL_PRIME_LIMIT as u64;
        if n.to_u64().is_some_and(|v| v < limit * limit) {
            return true;
        }

        let n_minus_one = n - 1u32;
        let s = n_minus_one.trailing_zeros().unwrap_or(0);
        let d = &n_minus_one >> s;

        self.small_primes
            .iter()
            .take(self.rounds)
            .all(|&base| self.passes_round(n, &n_minus_one, &d, s, base))
    }
}

/// Sieve of Eratosthenes, primes strictly below `limit`.
fn sieve_primes(limit: u32) -> Vec<u32> {
    let limit = limit as usize;
    let mut composite = vec![false; limit];
    let mut primes = Vec::new();
    for i in 2..limit {
        if composite[i] {
            continue;
        }
        primes.push(i as u32);
        let mut j = i * i;
        while j < limit {
            composite[j] = true;
            j += i;
        }
    }
    primes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(value: u64) -> BigUint {
        BigUint::from(value)
    }

    #[test]
    fn test_sieve() {
        let primes = sieve_primes(SMALL_PRIME_LIMIT);
        assert_eq!(primes.len(), 168);
        assert_eq!(&primes[..5], &[2, 3, 5, 7, 11]);
        assert_eq!(*primes.last().unwrap(), 997);
    }

    #[test]
    fn test_small_numbers() {
        let oracle = MillerRabin::default();
        let expected = [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31];
        for n in 0..32u64 {
            assert_eq!(oracle.is_probably_prime(&big(n)), expected.contains(&n), "n = {}", n);
        }
        assert!(oracle.is_probably_prime(&big(997)));
        assert!(!oracle.is_probably_prime(&big(999)));
        assert!(oracle.is_probably_prime(&big(1009)));
        assert!(oracle.is_probably_prime(&big(999_983)));
    }

    #[test]
    fn test_pseudoprimes_rejected() {
        let oracle = MillerRabin::default();
        // Carmichael numbers and strong pseudoprimes to small bases.
        for n in [561u64, 41041, 825265, 3215031751] {
            assert!(!oracle.is_probably_prime(&big(n)), "n = {}", n);
        }
    }

    #[test]
    fn test_more_rounds_catch_strong_pseudoprime() {
        // Strong pseudoprime to each of the first eleven prime bases.
        let n = big(3825123056546413051);
        assert!(MillerRabin::new(11).is_probably_prime(&n));
        assert!(!MillerRabin::new(12).is_probably_prime(&n));
    }

    #[test]
    fn test_large_primes() {
        let oracle = MillerRabin::default();
        let one = BigUint::one();
        let mersenne_127 = (&one << 127u32) - 1u32;
        assert!(oracle.is_probably_prime(&mersenne_127));
        assert!(!oracle.is_probably_prime(&(&mersenne_127 + 2u32)));

        let curve25519 = (&one << 255u32) - 19u32;
        assert!(oracle.is_probably_prime(&curve25519));
        assert!(!oracle.is_probably_prime(&((&one << 255u32) - 21u32)));
    }

    #[test]
    fn test_full_period_pair() {
        let oracle = MillerRabin::default();
        let a = BigUint::from(0xcba2723cca35d642u64);
        let m = (&a << 192u32) - 1u32;
        let p = &m >> 1u32;
        assert!(oracle.is_probably_prime(&m));
        assert!(oracle.is_probably_prime(&p));

        let a = BigUint::from(0xd1342543de82ef95u64);
        let m = (&a << 192u32) - 1u32;
        assert!(!oracle.is_probably_prime(&m));
    }

    #[test]
    fn test_rounds_clamped() {
        assert_eq!(MillerRabin::new(0).rounds(), 1);
        assert_eq!(MillerRabin::new(1000).rounds(), 168);
        assert_eq!(MillerRabin::default().rounds(), 10);
    }
}
