//! Primality testing, safe prime generation, and factorization.
//!
//! All routines operate on [`BigUint`] and are suitable for the moduli used by
//! this crate (tens to a few hundred bits). Primality is decided with trial
//! division by small primes followed by Miller-Rabin using those same primes
//! as witnesses, which is deterministic below `3.3 * 10^24` and
//! overwhelmingly likely to be correct above it.

use crate::Error;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use std::collections::BTreeSet;
use tracing::debug;

/// Primes used for trial division and as Miller-Rabin witnesses.
const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Number of leading [`SMALL_PRIMES`] used as Miller-Rabin witnesses.
const WITNESSES: usize = 24;

/// Maximum number of candidates drawn by [`safe_prime`] before giving up.
pub const MAX_SAFE_PRIME_ATTEMPTS: usize = 1 << 20;

/// Maximum number of Pollard rho steps [`prime_factors`] spends on one
/// composite before giving up.
pub const MAX_RHO_STEPS: usize = 1 << 20;

/// Returns `true` if `n` is prime.
pub fn is_prime(n: &BigUint) -> bool {
    if n < &BigUint::from(2u32) {
        return false;
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // Write n - 1 = d * 2^s with d odd
    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one
        .trailing_zeros()
        .expect("n - 1 is non-zero for n > 2");
    let d = &n_minus_one >> s;

    'witness: for &a in SMALL_PRIMES.iter().take(WITNESSES) {
        let mut x = BigUint::from(a).modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generates a safe prime `p` of exactly `bits` bits, such that `(p - 1) / 2`
/// is also prime.
///
/// Candidates are drawn as `p = 2q + 1` for a random `q` of `bits - 1` bits.
/// Fails with [`Error::SamplingExhausted`] after [`MAX_SAFE_PRIME_ATTEMPTS`]
/// candidates.
pub fn safe_prime(rng: &mut (impl RngCore + CryptoRng), bits: u64) -> Result<BigUint, Error> {
    // The smallest safe primes (5 and 7) have 3 bits.
    if bits < 3 {
        return Err(Error::InvalidBits(bits));
    }
    let low = BigUint::one() << (bits - 2);
    let high = BigUint::one() << (bits - 1);
    for attempt in 1..=MAX_SAFE_PRIME_ATTEMPTS {
        let mut q = rng.gen_biguint_range(&low, &high);

        // Only q = 2 (for p = 5) is an even candidate worth testing.
        if bits > 3 {
            q.set_bit(0, true);
        }
        if !is_prime(&q) {
            continue;
        }
        let p = (&q << 1u32) + 1u32;
        if is_prime(&p) {
            debug!(bits, attempt, "generated safe prime");
            return Ok(p);
        }
    }
    Err(Error::SamplingExhausted(MAX_SAFE_PRIME_ATTEMPTS))
}

/// Returns the distinct prime factors of `n` in ascending order.
///
/// Small factors are removed by trial division and whatever remains is split
/// with Pollard's rho. Returns an empty vector for `n < 2`.
///
/// Fails with [`Error::SamplingExhausted`] if a composite cofactor survives
/// [`MAX_RHO_STEPS`] steps of Pollard's rho.
pub fn prime_factors(n: &BigUint) -> Result<Vec<BigUint>, Error> {
    factor(n, MAX_RHO_STEPS)
}

fn factor(n: &BigUint, max_steps: usize) -> Result<Vec<BigUint>, Error> {
    let mut factors = BTreeSet::new();
    if n < &BigUint::from(2u32) {
        return Ok(Vec::new());
    }

    let mut rest = n.clone();
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if !(&rest % &p).is_zero() {
            continue;
        }
        while (&rest % &p).is_zero() {
            rest /= &p;
        }
        factors.insert(p);
    }

    let mut pending = vec![rest];
    while let Some(m) = pending.pop() {
        if m.is_one() {
            continue;
        }
        if is_prime(&m) {
            factors.insert(m);
            continue;
        }
        let d = pollard_rho(&m, max_steps).ok_or_else(|| {
            debug!(bits = m.bits(), max_steps, "factorization exhausted");
            Error::SamplingExhausted(max_steps)
        })?;
        pending.push(&m / &d);
        pending.push(d);
    }
    Ok(factors.into_iter().collect())
}

/// Finds a non-trivial factor of the odd composite `n` within `max_steps`
/// steps.
fn pollard_rho(n: &BigUint, max_steps: usize) -> Option<BigUint> {
    let one = BigUint::one();
    let mut c = BigUint::one();
    let mut steps = 0;
    loop {
        let step = |x: &BigUint| (x * x + &c) % n;
        let mut x = BigUint::from(2u32);
        let mut y = x.clone();
        let mut d = one.clone();
        while d.is_one() {
            if steps == max_steps {
                return None;
            }
            steps += 1;
            x = step(&x);
            y = step(&step(&y));
            let diff = if x > y { &x - &y } else { &y - &x };
            d = diff.gcd(n);
        }
        if &d != n {
            return Some(d);
        }

        // The cycle closed without splitting n, try another polynomial.
        c += 1u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use test_case::test_case;

    fn sieve(limit: usize) -> Vec<bool> {
        let mut prime = vec![true; limit];
        prime[0] = false;
        prime[1] = false;
        for i in 2..limit {
            if prime[i] {
                for j in (i * i..limit).step_by(i) {
                    prime[j] = false;
                }
            }
        }
        prime
    }

    #[test]
    fn test_is_prime_matches_sieve() {
        let expected = sieve(5000);
        for (n, &prime) in expected.iter().enumerate() {
            assert_eq!(is_prime(&BigUint::from(n)), prime, "n = {n}");
        }
    }

    #[test_case(65537u64, true; "fermat prime")]
    #[test_case(2147483647u64, true; "mersenne prime")]
    #[test_case(3215031751u64, false; "strong pseudoprime to bases 2 3 5 7")]
    #[test_case(4294967297u64, false; "fifth fermat number")]
    fn test_is_prime_large(n: u64, expected: bool) {
        assert_eq!(is_prime(&BigUint::from(n)), expected);
    }

    #[test_case(3)]
    #[test_case(16)]
    #[test_case(64)]
    fn test_safe_prime(bits: u64) {
        let mut rng = StdRng::seed_from_u64(bits);
        let p = safe_prime(&mut rng, bits).unwrap();
        assert_eq!(p.bits(), bits);
        assert!(is_prime(&p));
        assert!(is_prime(&((&p - 1u32) >> 1u32)));
    }

    #[test]
    fn test_safe_prime_rejects_tiny_bits() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(safe_prime(&mut rng, 2), Err(Error::InvalidBits(2)));
    }

    #[test]
    fn test_prime_factors_small() {
        let factors = prime_factors(&BigUint::from(2038u32)).unwrap();
        assert_eq!(factors, vec![BigUint::from(2u32), BigUint::from(1019u32)]);

        let factors = prime_factors(&BigUint::from(2u32.pow(10) * 3u32.pow(4) * 7)).unwrap();
        assert_eq!(
            factors,
            vec![BigUint::from(2u32), BigUint::from(3u32), BigUint::from(7u32)]
        );
        assert!(prime_factors(&BigUint::one()).unwrap().is_empty());
    }

    #[test]
    fn test_prime_factors_needs_rho() {
        let n = BigUint::from(65537u64 * 2147483647u64 * 2);
        let factors = prime_factors(&n).unwrap();
        assert_eq!(
            factors,
            vec![
                BigUint::from(2u32),
                BigUint::from(65537u32),
                BigUint::from(2147483647u32)
            ]
        );
    }

    #[test]
    fn test_prime_factors_exhausted() {
        // 2^31 - 1 and 2^61 - 1 are both prime, so rho needs ~2^15 steps
        let m31 = BigUint::from(2147483647u64);
        let m61 = BigUint::from(2305843009213693951u64);
        let n = &m31 * &m61;
        assert_eq!(factor(&n, 1000), Err(Error::SamplingExhausted(1000)));
        assert_eq!(factor(&n, MAX_RHO_STEPS), Ok(vec![m31, m61]));
    }
}
