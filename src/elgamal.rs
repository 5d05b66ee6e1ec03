// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ElGamal encryption over a [`Group`].
//!
//! Every encryption draws a fresh ephemeral exponent, so encrypting the
//! same plaintext twice yields different ciphertexts. The scheme is
//! malleable by construction; pair it with a signature when integrity
//! matters.

use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{codec, math, Error, Group, Result};

/// An ElGamal ciphertext pair `(c1, c2) = (g^k, m * beta^k)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalCiphertext {
    pub c1: BigUint,
    pub c2: BigUint,
}

/// Public half of an ElGamal keypair: the group and `beta = g^a mod p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalPublicKey {
    pub(crate) group: Group,
    pub(crate) beta: BigUint,
}

impl ElGamalPublicKey {
    /// Construct a public key from its components.
    pub fn new(group: Group, beta: BigUint) -> Result<Self> {
        if beta.is_zero() || &beta >= group.p() {
            return Err(Error::InvalidParameter("public value out of range"));
        }
        Ok(Self { group, beta })
    }

    /// Return the group this key operates in.
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Return the public value `beta`.
    pub fn beta(&self) -> &BigUint {
        &self.beta
    }

    /// Encrypt a single message integer with a fresh ephemeral exponent.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::MessageTooLarge`] if `message >= p`.
    pub fn encrypt<R: RngCore>(&self, message: &BigUint, rng: &mut R) -> Result<ElGamalCiphertext> {
        let p = self.group.p();
        if message >= p {
            return Err(Error::MessageTooLarge);
        }

        // k uniform in [1, p - 2]
        let k = rng.gen_biguint_range(&BigUint::one(), &(p - 1u32));
        let c1 = math::modpow(self.group.g(), &k, p)?;
        let c2 = (message * math::modpow(&self.beta, &k, p)?) % p;

        Ok(ElGamalCiphertext { c1, c2 })
    }

    /// Encrypt arbitrary-length data by splitting it into blocks below the
    /// modulus, each block under its own ephemeral exponent. Returns the
    /// packed format understood by [`ElGamalPrivateKey::decrypt_bytes`].
    pub fn encrypt_bytes<R: RngCore, P: AsRef<[u8]>>(&self, data: P, rng: &mut R) -> Result<Vec<u8>> {
        let data = data.as_ref();
        let width = codec::chunk_width(self.group.p())?;

        let mut blocks = Vec::with_capacity(codec::expected_blocks(data.len() as u64, width));
        for chunk in data.chunks(width) {
            let ciphertext = self.encrypt(&math::bytes_to_int(chunk), rng)?;
            blocks.push(vec![ciphertext.c1, ciphertext.c2]);
        }

        Ok(codec::pack(data.len() as u64, &blocks))
    }
}

/// Private half of an ElGamal keypair. The exponent is zeroized on drop.
#[allow(missing_debug_implementations)]
#[derive(Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct ElGamalPrivateKey {
    #[zeroize(skip)]
    pub(crate) group: Group,
    pub(crate) a: BigUint,
}

impl ElGamalPrivateKey {
    /// Decrypt a ciphertext pair: `m = c2 * (c1^a)^-1 mod p`.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::InvalidCiphertext`] if either component is outside
    /// the group.
    pub fn decrypt(&self, ciphertext: &ElGamalCiphertext) -> Result<BigUint> {
        let p = self.group.p();
        if ciphertext.c1.is_zero() || &ciphertext.c1 >= p || &ciphertext.c2 >= p {
            return Err(Error::InvalidCiphertext);
        }

        let s = math::modpow(&ciphertext.c1, &self.a, p)?;
        // s is nonzero for prime p, so the inverse exists
        let m = (&ciphertext.c2 * math::modinv(&s, p)?) % p;
        Ok(m)
    }

    /// Decrypt packed multi-block data produced by
    /// [`ElGamalPublicKey::encrypt_bytes`].
    pub fn decrypt_bytes<P: AsRef<[u8]>>(&self, packed: P) -> Result<Vec<u8>> {
        let (plaintext_len, blocks) = codec::unpack(packed.as_ref(), 2)?;
        let width = codec::chunk_width(self.group.p())?;

        let mut decrypted = Vec::with_capacity(blocks.len());
        for block in &blocks {
            let ciphertext = ElGamalCiphertext { c1: block[0].clone(), c2: block[1].clone() };
            decrypted.push(self.decrypt(&ciphertext)?);
        }

        codec::rebuild_plaintext(plaintext_len, width, &decrypted)
    }
}

/// A complete ElGamal keypair.
#[allow(missing_debug_implementations)]
pub struct ElGamalKeyPair {
    public: ElGamalPublicKey,
    secret: ElGamalPrivateKey,
}

impl ElGamalKeyPair {
    /// Generate a keypair over `group` with `a` drawn uniformly from
    /// `[1, p - 2]`.
    pub fn generate<R: RngCore>(group: Group, rng: &mut R) -> Result<Self> {
        if group.p() <= &BigUint::from(3u32) {
            return Err(Error::InvalidParameter("group modulus too small for encryption"));
        }

        let a = rng.gen_biguint_range(&BigUint::one(), &(group.p() - 1u32));
        let beta = math::modpow(group.g(), &a, group.p())?;

        let public = ElGamalPublicKey { group: group.clone(), beta };
        let secret = ElGamalPrivateKey { group, a };
        Ok(Self { public, secret })
    }

    /// Assemble a keypair from a known private exponent.
    pub fn from_exponent(group: Group, a: BigUint) -> Result<Self> {
        if a.is_zero() || a >= group.p() - 1u32 {
            return Err(Error::InvalidParameter("private exponent out of range"));
        }

        let beta = math::modpow(group.g(), &a, group.p())?;
        let public = ElGamalPublicKey { group: group.clone(), beta };
        let secret = ElGamalPrivateKey { group, a };
        Ok(Self { public, secret })
    }

    /// Return the public key.
    pub fn public_key(&self) -> &ElGamalPublicKey {
        &self.public
    }

    /// Return the private key.
    pub fn private_key(&self) -> &ElGamalPrivateKey {
        &self.secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StandardGroup;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    // p = 23 with full-order generator 5
    fn tiny_group() -> Group {
        Group::new(BigUint::from(23u32), BigUint::from(5u32)).unwrap()
    }

    #[test]
    fn known_answer_decryption() {
        // a = 6 gives beta = 5^6 mod 23 = 8; (10, 9) decrypts to 13
        let keypair = ElGamalKeyPair::from_exponent(tiny_group(), BigUint::from(6u32)).unwrap();
        assert_eq!(keypair.public_key().beta(), &BigUint::from(8u32));

        let ciphertext =
            ElGamalCiphertext { c1: BigUint::from(10u32), c2: BigUint::from(9u32) };
        assert_eq!(keypair.private_key().decrypt(&ciphertext).unwrap(), BigUint::from(13u32));
    }

    #[test]
    fn roundtrip_over_small_group() {
        let mut rng = rng();
        let keypair = ElGamalKeyPair::generate(tiny_group(), &mut rng).unwrap();

        for m in 0u32..23 {
            let m = BigUint::from(m);
            let c = keypair.public_key().encrypt(&m, &mut rng).unwrap();
            assert_eq!(keypair.private_key().decrypt(&c).unwrap(), m);
        }
    }

    #[test]
    fn repeated_encryption_randomizes_ciphertext() {
        let mut rng = rng();
        let group = StandardGroup::Modp1536.group();
        let keypair = ElGamalKeyPair::generate(group, &mut rng).unwrap();

        let m = BigUint::from(0xC0FFEEu32);
        let first = keypair.public_key().encrypt(&m, &mut rng).unwrap();
        let second = keypair.public_key().encrypt(&m, &mut rng).unwrap();
        assert_ne!(first, second);
        assert_eq!(keypair.private_key().decrypt(&first).unwrap(), m);
        assert_eq!(keypair.private_key().decrypt(&second).unwrap(), m);
    }

    #[test]
    fn oversized_message_rejected() {
        let mut rng = rng();
        let keypair = ElGamalKeyPair::generate(tiny_group(), &mut rng).unwrap();
        assert_eq!(
            keypair.public_key().encrypt(&BigUint::from(23u32), &mut rng),
            Err(Error::MessageTooLarge)
        );
    }

    #[test]
    fn out_of_group_ciphertext_rejected() {
        let mut rng = rng();
        let keypair = ElGamalKeyPair::generate(tiny_group(), &mut rng).unwrap();
        let p = keypair.public_key().group().p().clone();

        for (c1, c2) in [
            (BigUint::zero(), BigUint::from(9u32)),
            (p.clone(), BigUint::from(9u32)),
            (BigUint::from(10u32), p),
        ] {
            let ciphertext = ElGamalCiphertext { c1, c2 };
            assert_eq!(
                keypair.private_key().decrypt(&ciphertext),
                Err(Error::InvalidCiphertext)
            );
        }
    }

    #[test]
    fn encrypt_bytes_roundtrip() {
        let mut rng = rng();
        let group = StandardGroup::Modp1536.group();
        let keypair = ElGamalKeyPair::generate(group, &mut rng).unwrap();
        let message = b"\x00leading zero, several blocks of padding text".repeat(12);

        let packed = keypair.public_key().encrypt_bytes(&message, &mut rng).unwrap();
        let plaintext = keypair.private_key().decrypt_bytes(&packed).unwrap();
        assert_eq!(plaintext, message);
    }

    #[test]
    fn encrypt_bytes_empty_input() {
        let mut rng = rng();
        let group = StandardGroup::Modp1536.group();
        let keypair = ElGamalKeyPair::generate(group, &mut rng).unwrap();

        let packed = keypair.public_key().encrypt_bytes(b"", &mut rng).unwrap();
        assert!(keypair.private_key().decrypt_bytes(&packed).unwrap().is_empty());
    }

    #[test]
    fn truncated_packet_rejected() {
        let mut rng = rng();
        let group = StandardGroup::Modp1536.group();
        let keypair = ElGamalKeyPair::generate(group, &mut rng).unwrap();

        let packed = keypair.public_key().encrypt_bytes(b"attack at dawn", &mut rng).unwrap();
        assert_eq!(
            keypair.private_key().decrypt_bytes(&packed[..packed.len() - 3]),
            Err(Error::InvalidCiphertext)
        );
    }

    #[test]
    fn from_exponent_validates_range() {
        assert!(ElGamalKeyPair::from_exponent(tiny_group(), BigUint::zero()).is_err());
        assert!(ElGamalKeyPair::from_exponent(tiny_group(), BigUint::from(22u32)).is_err());
        assert!(ElGamalKeyPair::from_exponent(tiny_group(), BigUint::from(21u32)).is_ok());
    }
}
