// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Probabilistic primality testing and random prime sampling.
//!
//! Candidates are first run through trial division against a small-prime
//! table, which rejects the bulk of composites before the expensive
//! Miller-Rabin witness loop.

use num_bigint_dig::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::RngCore;

use crate::{math, Error, Result};

/// All 168 primes below 1000, used for trial division.
const SMALL_PRIMES: &[u32] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181,
    191, 193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281,
    283, 293, 307, 311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397,
    401, 409, 419, 421, 431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503,
    509, 521, 523, 541, 547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613, 617, 619,
    631, 641, 643, 647, 653, 659, 661, 673, 677, 683, 691, 701, 709, 719, 727, 733, 739, 743,
    751, 757, 761, 769, 773, 787, 797, 809, 811, 821, 823, 827, 829, 839, 853, 857, 859, 863,
    877, 881, 883, 887, 907, 911, 919, 929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
];

/// Miller-Rabin primality test with `rounds` random witnesses.
///
/// Deterministic short-circuits handle n < 2, small primes and anything
/// divisible by a tabled prime. For the remaining candidates the
/// false-positive probability is at most `4^(-rounds)`; a genuine prime is
/// never rejected.
pub fn is_probable_prime<R: RngCore>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    if let Some(small) = n.to_u32() {
        if small < 2 {
            return false;
        }
        if SMALL_PRIMES.contains(&small) {
            return true;
        }
    }
    for &small in SMALL_PRIMES {
        if (n % small).is_zero() {
            return false;
        }
    }

    // n is odd and has no factor below 1000
    let two = BigUint::from(2u32);
    let n_minus_1 = n - 1u32;

    // n - 1 = d * 2^s with d odd
    let mut d = n_minus_1.clone();
    let mut s = 0usize;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let Ok(mut x) = math::modpow(&a, &d, n) else {
            return false;
        };
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Recommended Miller-Rabin round count for a candidate of `bits` bits.
///
/// FIPS 186-4 allows far fewer rounds at large sizes, but the floor here
/// stays at the cryptographic default of 20 rounds (error below 4^-20).
pub const fn recommended_rounds(bits: usize) -> usize {
    match bits {
        0..=256 => 40,
        _ => 20,
    }
}

/// Generate a random candidate of exactly `bits` bits: MSB set for the
/// exact width, LSB set so the candidate is odd.
pub(crate) fn random_candidate<R: RngCore>(bits: usize, rng: &mut R) -> BigUint {
    let mut candidate = rng.gen_biguint(bits);
    candidate |= BigUint::one() << (bits - 1);
    candidate |= BigUint::one();
    candidate
}

/// Sample a random probable prime of exactly `bits` bits.
///
/// ## Errors
///
/// Returns [`Error::InvalidParameter`] if `bits < 2` and
/// [`Error::GenerationExhausted`] once `max_attempts` candidates have been
/// drawn without success.
pub fn random_prime<R: RngCore>(
    bits: usize,
    rounds: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::InvalidParameter("prime bit length must be at least 2"));
    }

    for _ in 0..max_attempts {
        let candidate = random_candidate(bits, rng);
        if is_probable_prime(&candidate, rounds, rng) {
            return Ok(candidate);
        }
    }

    Err(Error::GenerationExhausted { attempts: max_attempts })
}
