// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Textbook RSA: keypair generation under NIST-style constraints, integer
//! encrypt/decrypt with a CRT fast path, and chunked byte-level APIs.
//!
//! No padding scheme is applied; identical plaintexts produce identical
//! ciphertexts. Callers needing semantic security should use the ElGamal
//! engine or layer a padding scheme on top.

use num_bigint_dig::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{codec, math, prime, Error, Result};

/// Restarts of the whole p/q/d derivation when d comes out too small.
/// A single pass succeeds except with negligible probability.
const MAX_KEYGEN_RESTARTS: usize = 64;

/// Public half of an RSA keypair: modulus `n = p*q` and exponent `e`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub(crate) n: BigUint,
    pub(crate) e: BigUint,
}

impl RsaPublicKey {
    /// Construct a public key from its components.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        if n <= BigUint::one() {
            return Err(Error::InvalidParameter("modulus must be greater than 1"));
        }
        if e < BigUint::from(3u32) || e.is_even() {
            return Err(Error::InvalidParameter("public exponent must be an odd integer >= 3"));
        }
        Ok(Self { n, e })
    }

    /// Return the public modulus `n`.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Return the public exponent `e`.
    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// Bit length of the modulus.
    pub fn bits(&self) -> usize {
        self.n.bits()
    }

    /// Encrypt a single message integer: `m^e mod n`.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::MessageTooLarge`] if `message >= n`.
    pub fn encrypt(&self, message: &BigUint) -> Result<BigUint> {
        if message >= &self.n {
            return Err(Error::MessageTooLarge);
        }
        math::modpow(message, &self.e, &self.n)
    }

    /// Encrypt arbitrary-length data by splitting it into blocks below the
    /// modulus. Returns the packed format understood by
    /// [`RsaPrivateKey::decrypt_bytes`].
    pub fn encrypt_bytes<P: AsRef<[u8]>>(&self, data: P) -> Result<Vec<u8>> {
        let data = data.as_ref();
        let width = codec::chunk_width(&self.n)?;

        let mut blocks = Vec::with_capacity(codec::expected_blocks(data.len() as u64, width));
        for chunk in data.chunks(width) {
            // a width-byte chunk is always below the modulus
            blocks.push(vec![self.encrypt(&math::bytes_to_int(chunk))?]);
        }

        Ok(codec::pack(data.len() as u64, &blocks))
    }
}

/// Private half of an RSA keypair.
///
/// Carries the factorization and precomputed CRT parameters; decryption
/// runs mod p and mod q separately. Sensitive fields are zeroized on drop.
#[allow(missing_debug_implementations)]
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct RsaPrivateKey {
    #[zeroize(skip)]
    pub(crate) public: RsaPublicKey,
    pub(crate) d: BigUint,
    pub(crate) p: BigUint,
    pub(crate) q: BigUint,
    pub(crate) d_p: BigUint,
    pub(crate) d_q: BigUint,
    pub(crate) q_inv: BigUint,
}

impl RsaPrivateKey {
    /// Return a reference to the associated public key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Apply the private exponent via the CRT:
    /// `m1 = v^d_p mod p`, `m2 = v^d_q mod q`,
    /// `h = q_inv * (m1 - m2) mod p`, result `m2 + q*h`.
    pub(crate) fn private_power(&self, value: &BigUint) -> Result<BigUint> {
        let m1 = math::modpow(value, &self.d_p, &self.p)?;
        let m2 = math::modpow(value, &self.d_q, &self.q)?;

        // guard the subtraction against underflow; m2 may exceed p
        let m2_mod_p = &m2 % &self.p;
        let diff = (&m1 + &self.p - m2_mod_p) % &self.p;
        let h = (&self.q_inv * diff) % &self.p;

        Ok(m2 + &self.q * h)
    }

    /// Decrypt a single ciphertext integer: `c^d mod n`.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::InvalidCiphertext`] if `ciphertext >= n`.
    pub fn decrypt(&self, ciphertext: &BigUint) -> Result<BigUint> {
        if ciphertext >= self.public.n() {
            return Err(Error::InvalidCiphertext);
        }
        self.private_power(ciphertext)
    }

    /// Decrypt packed multi-block data produced by
    /// [`RsaPublicKey::encrypt_bytes`].
    pub fn decrypt_bytes<P: AsRef<[u8]>>(&self, packed: P) -> Result<Vec<u8>> {
        let (plaintext_len, blocks) = codec::unpack(packed.as_ref(), 1)?;
        let width = codec::chunk_width(self.public.n())?;

        let mut decrypted = Vec::with_capacity(blocks.len());
        for block in &blocks {
            decrypted.push(self.decrypt(&block[0])?);
        }

        codec::rebuild_plaintext(plaintext_len, width, &decrypted)
    }
}

/// A complete RSA keypair. Secret material is zeroized when dropped.
#[allow(missing_debug_implementations)]
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct RsaKeyPair {
    #[zeroize(skip)]
    public: RsaPublicKey,
    secret: RsaPrivateKey,
}

impl RsaKeyPair {
    /// Generate a keypair with default parameters (2048-bit modulus,
    /// e = 65537).
    pub fn generate<R: RngCore>(rng: &mut R) -> Result<Self> {
        RsaKeyPairBuilder::new().generate(rng)
    }

    /// Generate a keypair with a custom modulus size.
    pub fn generate_with_size<R: RngCore>(bits: usize, rng: &mut R) -> Result<Self> {
        RsaKeyPairBuilder::new().bit_length(bits).generate(rng)
    }

    /// Assemble a keypair from caller-supplied primes.
    ///
    /// The factors are validated as distinct probable primes and `e` must
    /// be invertible mod `lcm(p-1, q-1)`; the generation-time size
    /// constraints do not apply, so this also serves tiny textbook keys.
    pub fn from_primes<R: RngCore>(
        p: BigUint,
        q: BigUint,
        e: BigUint,
        rng: &mut R,
    ) -> Result<Self> {
        if p == q {
            return Err(Error::InvalidParameter("prime factors must be distinct"));
        }
        let rounds = prime::recommended_rounds(p.bits().max(q.bits()));
        if !prime::is_probable_prime(&p, rounds, rng) || !prime::is_probable_prime(&q, rounds, rng)
        {
            return Err(Error::InvalidParameter("factor is not prime"));
        }
        if e < BigUint::from(3u32) || e.is_even() {
            return Err(Error::InvalidParameter("public exponent must be an odd integer >= 3"));
        }

        let lambda = (&p - 1u32).lcm(&(&q - 1u32));
        let d = math::modinv(&e, &lambda)?;
        Self::assemble(p, q, e, d)
    }

    fn assemble(p: BigUint, q: BigUint, e: BigUint, d: BigUint) -> Result<Self> {
        let d_p = &d % (&p - 1u32);
        let d_q = &d % (&q - 1u32);
        let q_inv = math::modinv(&q, &p)?;

        let public = RsaPublicKey::new(&p * &q, e)?;
        let secret = RsaPrivateKey { public: public.clone(), d, p, q, d_p, d_q, q_inv };
        Ok(Self { public, secret })
    }

    /// Return the public key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Return the private key.
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.secret
    }
}

/// Builder for generating RSA keypairs with configurable parameters.
#[derive(Debug)]
pub struct RsaKeyPairBuilder {
    bit_length: usize,
    public_exponent: BigUint,
    rounds: Option<usize>,
    max_attempts: usize,
}

impl RsaKeyPairBuilder {
    /// Minimum recommended for production (NIST/ENISA standard).
    pub const MIN_SECURE_BITS: usize = 2048;

    /// Absolute minimum enforced in production builds.
    /// Can be bypassed with the `allow-weak-keys` feature flag.
    #[cfg(not(feature = "allow-weak-keys"))]
    const ABSOLUTE_MIN_BITS: usize = 512;

    #[cfg(feature = "allow-weak-keys")]
    const ABSOLUTE_MIN_BITS: usize = 128;

    /// Create a builder with default parameters.
    pub fn new() -> Self {
        Self {
            bit_length: 2048,
            public_exponent: BigUint::from(65537u32),
            rounds: None,
            max_attempts: 30_000,
        }
    }

    /// Set the desired modulus bit length.
    pub fn bit_length(mut self, bits: usize) -> Self {
        self.bit_length = bits;
        self
    }

    /// Set the public exponent (default 65537).
    pub fn public_exponent(mut self, e: BigUint) -> Self {
        self.public_exponent = e;
        self
    }

    /// Override the Miller-Rabin round count.
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = Some(rounds);
        self
    }

    /// Override the candidate cap per prime search (default 30000).
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Generate the keypair.
    pub fn generate<R: RngCore>(self, rng: &mut R) -> Result<RsaKeyPair> {
        if self.bit_length < Self::ABSOLUTE_MIN_BITS {
            return Err(Error::InsufficientBits {
                min: Self::ABSOLUTE_MIN_BITS,
                actual: self.bit_length,
            });
        }
        if self.bit_length < Self::MIN_SECURE_BITS {
            eprintln!(
                "⚠️  SECURITY WARNING: {}-bit key is cryptographically weak!",
                self.bit_length
            );
            eprintln!("⚠️  Use {} bits minimum for production", Self::MIN_SECURE_BITS);
        }

        let e = self.public_exponent;
        if e < BigUint::from(3u32) || e.is_even() {
            return Err(Error::InvalidParameter("public exponent must be an odd integer >= 3"));
        }
        // NIST wants e strictly between 2^16 and 2^256; warn, don't enforce
        if e <= (BigUint::one() << 16) || e >= (BigUint::one() << 256) {
            eprintln!("⚠️  public exponent outside the NIST window (2^16, 2^256)");
        }

        let p_size = (self.bit_length + 1) / 2;
        let q_size = self.bit_length - p_size;

        // candidate >= sqrt(2) * 2^(size-1) keeps n at exactly bit_length
        let min_p = (BigUint::one() << (2 * p_size - 1)).sqrt();
        let min_q = (BigUint::one() << (2 * q_size - 1)).sqrt();
        let min_d = BigUint::one() << (self.bit_length / 2);
        let min_distance = if self.bit_length / 2 > 100 {
            Some(BigUint::one() << (self.bit_length / 2 - 100))
        } else {
            None
        };

        let rounds = self.rounds.unwrap_or_else(|| prime::recommended_rounds(p_size));

        for _ in 0..MAX_KEYGEN_RESTARTS {
            let p = sample_prime(p_size, &min_p, &e, None, rounds, self.max_attempts, rng)?;
            let q = sample_prime(
                q_size,
                &min_q,
                &e,
                Some((&p, min_distance.as_ref())),
                rounds,
                self.max_attempts,
                rng,
            )?;

            // Carmichael's lambda keeps d small without losing correctness
            let lambda = (&p - 1u32).lcm(&(&q - 1u32));
            let d = math::modinv(&e, &lambda)?;
            if d <= min_d {
                continue;
            }

            return RsaKeyPair::assemble(p, q, e.clone(), d);
        }

        Err(Error::GenerationExhausted { attempts: MAX_KEYGEN_RESTARTS })
    }
}

impl Default for RsaKeyPairBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample a probable prime of exactly `bits` bits satisfying the RSA
/// side conditions: at least `min`, `gcd(e, candidate - 1) = 1`, and when
/// `avoid` is given, far enough from (or at least distinct from) the other
/// factor.
fn sample_prime<R: RngCore>(
    bits: usize,
    min: &BigUint,
    e: &BigUint,
    avoid: Option<(&BigUint, Option<&BigUint>)>,
    rounds: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<BigUint> {
    for _ in 0..max_attempts {
        let candidate = prime::random_candidate(bits, rng);
        if &candidate < min {
            continue;
        }
        if !(&candidate - 1u32).gcd(e).is_one() {
            continue;
        }
        if let Some((other, min_distance)) = avoid {
            let distance = if other > &candidate {
                other - &candidate
            } else {
                &candidate - other
            };
            match min_distance {
                Some(min_distance) if &distance < min_distance => continue,
                None if distance.is_zero() => continue,
                _ => {}
            }
        }
        if prime::is_probable_prime(&candidate, rounds, rng) {
            return Ok(candidate);
        }
    }

    Err(Error::GenerationExhausted { attempts: max_attempts })
}
