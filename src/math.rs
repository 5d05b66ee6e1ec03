// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared big-integer arithmetic: modular exponentiation, extended Euclid,
//! modular inverses and the fixed-width byte codec used by every engine in
//! the crate.

use num_bigint_dig::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::{Error, Result};

/// Compute `base^exponent mod modulus` by iterative square-and-multiply.
///
/// The result is always in `[0, modulus)`. An exponent of zero yields
/// `1 mod modulus`, and a modulus of one yields zero.
///
/// ## Errors
///
/// Returns [`Error::InvalidParameter`] if `modulus` is zero.
pub fn modpow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::InvalidParameter("modulus must be positive"));
    }
    if modulus.is_one() {
        return Ok(BigUint::zero());
    }

    let mut result = BigUint::one();
    let mut base = base % modulus;
    let mut exponent = exponent.clone();

    while !exponent.is_zero() {
        if exponent.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exponent >>= 1;
    }

    Ok(result)
}

/// Extended Euclidean algorithm.
///
/// Returns `(g, x, y)` with `a*x + b*y = g = gcd(a, b)`. The Bezout
/// coefficients are signed; the iterative form keeps stack depth flat for
/// crypto-sized inputs.
pub fn extended_gcd(a: &BigUint, b: &BigUint) -> (BigUint, BigInt, BigInt) {
    let mut old_r = BigInt::from(a.clone());
    let mut r = BigInt::from(b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next);
        let next = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next);
        let next = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, next);
    }

    // old_r carries gcd(a, b), which is never negative
    let g = old_r.to_biguint().unwrap_or_default();
    (g, old_s, old_t)
}

/// Compute the multiplicative inverse of `a` modulo `modulus`, normalized
/// into `[0, modulus)`.
///
/// ## Errors
///
/// Returns [`Error::InvalidParameter`] if `modulus <= 1` and
/// [`Error::NoInverse`] if `gcd(a, modulus) != 1`.
pub fn modinv(a: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus <= &BigUint::one() {
        return Err(Error::InvalidParameter("modulus must be greater than 1"));
    }

    let (g, x, _) = extended_gcd(a, modulus);
    if !g.is_one() {
        return Err(Error::NoInverse);
    }

    let x = x.mod_floor(&BigInt::from(modulus.clone()));
    Ok(x.to_biguint().unwrap_or_default())
}

/// Encode `value` as exactly `width` big-endian bytes, left-padded with
/// zeros. Bijective with [`bytes_to_int`] for values in `[0, 256^width)`.
///
/// ## Errors
///
/// Returns [`Error::InvalidParameter`] if the value needs more than `width`
/// bytes.
pub fn int_to_bytes(value: &BigUint, width: usize) -> Result<Vec<u8>> {
    let raw = if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    };

    if raw.len() > width {
        return Err(Error::InvalidParameter("value does not fit requested width"));
    }

    let mut out = vec![0u8; width - raw.len()];
    out.extend_from_slice(&raw);
    Ok(out)
}

/// Decode big-endian bytes into an integer. The empty slice decodes to zero.
pub fn bytes_to_int(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}
