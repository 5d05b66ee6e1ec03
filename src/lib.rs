// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Zahl
//!
//! Classical public-key cryptography over big integers: textbook RSA
//! encryption and signatures, finite-field Diffie-Hellman key agreement and
//! ElGamal encryption, built on a shared number-theoretic engine
//! (Miller-Rabin primality, safe-prime groups, modular arithmetic).
//!
//! ## Security
//!
//! The schemes are implemented in their textbook form: no OAEP/PSS padding,
//! no constant-time arithmetic, and RSA encryption is deterministic. Private
//! key material is zeroized on drop via the `zeroize` crate, but this crate
//! is meant for study and protocol prototyping, not for protecting real
//! secrets.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zahl::{decrypt_and_verify, sign_and_encrypt, HashFunction, RsaKeyPair};
//! use rand::rngs::OsRng;
//!
//! let alice = RsaKeyPair::generate(&mut OsRng).expect("key generation failed");
//! let bob = RsaKeyPair::generate(&mut OsRng).expect("key generation failed");
//!
//! let packet = sign_and_encrypt(
//!     b"hello bob",
//!     HashFunction::Sha256,
//!     alice.private_key(),
//!     bob.public_key(),
//! )
//! .expect("encryption failed");
//!
//! let message = decrypt_and_verify(
//!     &packet,
//!     HashFunction::Sha256,
//!     bob.private_key(),
//!     alice.public_key(),
//! )
//! .expect("decryption failed");
//! assert_eq!(message, b"hello bob");
//! ```

mod codec;
mod dh;
mod elgamal;
mod error;
mod group;
mod math;
mod prime;
mod rsa;
mod signature;

pub use dh::*;
pub use elgamal::*;
pub use error::*;
pub use group::*;
pub use math::{bytes_to_int, extended_gcd, int_to_bytes, modinv, modpow};
pub use prime::{is_probable_prime, random_prime, recommended_rounds};
pub use rsa::*;
pub use signature::*;
