// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Finite-field Diffie-Hellman key agreement over a [`Group`].
//!
//! Both sides derive `g^(a*b) mod p` from their own exponent and the
//! peer's public value. The shared secret is raw group-element material;
//! run it through a KDF before using it as a symmetric key.

use num_bigint_dig::{BigUint, RandBigInt};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{math, Error, Group, Result};

/// Compute the public value `g^exponent mod p` for a private exponent.
pub fn public_value(group: &Group, exponent: &BigUint) -> Result<BigUint> {
    math::modpow(group.g(), exponent, group.p())
}

/// Combine a private exponent with a peer's public value into the shared
/// secret `peer^exponent mod p`.
///
/// ## Errors
///
/// Returns [`Error::InvalidParameter`] unless `1 < peer < p`; the identity
/// and out-of-range values would let a peer force a predictable secret.
pub fn derive_shared_secret(
    group: &Group,
    exponent: &BigUint,
    peer_public: &BigUint,
) -> Result<BigUint> {
    if peer_public <= &BigUint::from(1u32) || peer_public >= group.p() {
        return Err(Error::InvalidParameter("peer public value out of range"));
    }
    math::modpow(peer_public, exponent, group.p())
}

/// An ephemeral Diffie-Hellman keypair bound to its group.
///
/// The private exponent is zeroized on drop.
#[allow(missing_debug_implementations)]
#[derive(Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct DhKeyPair {
    #[zeroize(skip)]
    group: Group,
    exponent: BigUint,
    #[zeroize(skip)]
    public: BigUint,
}

impl DhKeyPair {
    /// Generate a keypair with a private exponent drawn uniformly from
    /// `[2, p - 2]`.
    pub fn generate<R: RngCore>(group: Group, rng: &mut R) -> Result<Self> {
        if group.p() <= &BigUint::from(4u32) {
            return Err(Error::InvalidParameter("group modulus too small for key agreement"));
        }

        let low = BigUint::from(2u32);
        let high = group.p() - 1u32; // exclusive, so exponent <= p - 2
        let exponent = rng.gen_biguint_range(&low, &high);
        let public = public_value(&group, &exponent)?;

        Ok(Self { group, exponent, public })
    }

    /// Return the group this keypair operates in.
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Return the public value to send to the peer.
    pub fn public_value(&self) -> &BigUint {
        &self.public
    }

    /// Derive the shared secret from the peer's public value.
    pub fn derive_shared_secret(&self, peer_public: &BigUint) -> Result<BigUint> {
        derive_shared_secret(&self.group, &self.exponent, peer_public)
    }
}
