// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RSA signatures over FIPS 180-4 digests, plus the combined
//! sign-then-encrypt flow.
//!
//! A signature is the raw private-key power of the message digest; there
//! is no encoding layer like PSS or PKCS#1 v1.5. Verification recomputes
//! the digest and compares it against the public-key power of the
//! signature.

use num_bigint_dig::BigUint;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::{math, Error, Result, RsaPrivateKey, RsaPublicKey};

/// Hash functions available for signing, all from the SHA-2 family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFunction {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashFunction {
    /// Digest length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashFunction::Sha224 => 28,
            HashFunction::Sha256 => 32,
            HashFunction::Sha384 => 48,
            HashFunction::Sha512 => 64,
        }
    }

    /// Hash `data` and return the digest bytes.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashFunction::Sha224 => Sha224::digest(data).to_vec(),
            HashFunction::Sha256 => Sha256::digest(data).to_vec(),
            HashFunction::Sha384 => Sha384::digest(data).to_vec(),
            HashFunction::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// Sign `message` by hashing it and applying the private key.
///
/// ## Errors
///
/// Returns [`Error::MessageTooLarge`] if the digest, read as an integer,
/// is not below the modulus. This only happens for moduli smaller than
/// the digest itself; any production-sized key signs every digest.
pub fn sign(message: &[u8], hash: HashFunction, key: &RsaPrivateKey) -> Result<BigUint> {
    let digest = math::bytes_to_int(&hash.digest(message));
    if &digest >= key.public_key().n() {
        return Err(Error::MessageTooLarge);
    }
    key.private_power(&digest)
}

/// Verify a signature over `message`.
///
/// Any failure mode, including an out-of-range signature, reports as a
/// plain `false`.
pub fn verify(
    message: &[u8],
    signature: &BigUint,
    hash: HashFunction,
    key: &RsaPublicKey,
) -> bool {
    if signature >= key.n() {
        return false;
    }
    let Ok(recovered) = math::modpow(signature, key.e(), key.n()) else {
        return false;
    };
    recovered == math::bytes_to_int(&hash.digest(message))
}

/// Sign `message` with the sender's private key, then encrypt signature
/// and message together for the recipient.
///
/// Payload layout before encryption: `[u32 BE signature length]`, the
/// signature's minimal big-endian bytes, then the message.
pub fn sign_and_encrypt(
    message: &[u8],
    hash: HashFunction,
    sender: &RsaPrivateKey,
    recipient: &RsaPublicKey,
) -> Result<Vec<u8>> {
    let signature = sign(message, hash, sender)?;
    let signature_bytes = signature.to_bytes_be();

    let mut payload = Vec::with_capacity(4 + signature_bytes.len() + message.len());
    payload.extend_from_slice(&(signature_bytes.len() as u32).to_be_bytes());
    payload.extend_from_slice(&signature_bytes);
    payload.extend_from_slice(message);

    recipient.encrypt_bytes(&payload)
}

/// Decrypt a packet produced by [`sign_and_encrypt`] and verify its
/// embedded signature. Returns the plaintext message.
///
/// ## Errors
///
/// Returns [`Error::InvalidCiphertext`] if decryption fails or the
/// payload is malformed, and [`Error::SignatureVerification`] if the
/// signature does not match.
pub fn decrypt_and_verify(
    packet: &[u8],
    hash: HashFunction,
    recipient: &RsaPrivateKey,
    sender: &RsaPublicKey,
) -> Result<Vec<u8>> {
    let payload = recipient.decrypt_bytes(packet)?;

    if payload.len() < 4 {
        return Err(Error::InvalidCiphertext);
    }
    let signature_len = u32::from_be_bytes(payload[..4].try_into().unwrap()) as usize;
    if payload.len() - 4 < signature_len {
        return Err(Error::InvalidCiphertext);
    }

    let signature = math::bytes_to_int(&payload[4..4 + signature_len]);
    let message = payload[4 + signature_len..].to_vec();

    if !verify(&message, &signature, hash, sender) {
        return Err(Error::SignatureVerification);
    }
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RsaKeyPair;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(85)
    }

    fn keypair(rng: &mut StdRng, seed_bits: usize) -> RsaKeyPair {
        RsaKeyPair::generate_with_size(seed_bits, rng).unwrap()
    }

    #[test]
    fn sha256_known_vector() {
        // FIPS 180-4 test vector for "abc"
        let digest = HashFunction::Sha256.digest(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_lengths_match_variants() {
        for hash in [
            HashFunction::Sha224,
            HashFunction::Sha256,
            HashFunction::Sha384,
            HashFunction::Sha512,
        ] {
            assert_eq!(hash.digest(b"zahl").len(), hash.output_len());
        }
    }

    #[test]
    fn sign_verify_roundtrip() {
        let mut rng = rng();
        let keypair = keypair(&mut rng, 512);
        let message = b"signed and sealed";

        for hash in [HashFunction::Sha224, HashFunction::Sha256, HashFunction::Sha384] {
            let signature = sign(message, hash, keypair.private_key()).unwrap();
            assert!(verify(message, &signature, hash, keypair.public_key()));
        }
    }

    #[test]
    fn tampered_message_fails_verification() {
        let mut rng = rng();
        let keypair = keypair(&mut rng, 512);

        let signature = sign(b"original", HashFunction::Sha256, keypair.private_key()).unwrap();
        assert!(!verify(b"0riginal", &signature, HashFunction::Sha256, keypair.public_key()));
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let mut rng = rng();
        let keypair = keypair(&mut rng, 512);
        let message = b"original";

        let signature = sign(message, HashFunction::Sha256, keypair.private_key()).unwrap();
        let flipped = &signature ^ &BigUint::from(1u32);
        assert!(!verify(message, &flipped, HashFunction::Sha256, keypair.public_key()));
    }

    #[test]
    fn wrong_hash_fails_verification() {
        let mut rng = rng();
        let keypair = keypair(&mut rng, 512);
        let message = b"original";

        let signature = sign(message, HashFunction::Sha256, keypair.private_key()).unwrap();
        assert!(!verify(message, &signature, HashFunction::Sha384, keypair.public_key()));
    }

    #[test]
    fn out_of_range_signature_rejected() {
        let mut rng = rng();
        let keypair = keypair(&mut rng, 512);
        let oversized = keypair.public_key().n().clone();
        assert!(!verify(b"anything", &oversized, HashFunction::Sha256, keypair.public_key()));
    }

    #[test]
    fn digest_wider_than_modulus_rejected() {
        let mut rng = rng();
        // n = 3233 is far below any SHA-2 digest
        let tiny = RsaKeyPair::from_primes(
            BigUint::from(61u32),
            BigUint::from(53u32),
            BigUint::from(17u32),
            &mut rng,
        )
        .unwrap();
        assert_eq!(
            sign(b"abc", HashFunction::Sha256, tiny.private_key()),
            Err(Error::MessageTooLarge)
        );
    }

    #[test]
    fn sign_and_encrypt_roundtrip() {
        let mut rng = rng();
        let sender = keypair(&mut rng, 512);
        let recipient = keypair(&mut rng, 512);
        let message = b"confidential and authenticated";

        let packet = sign_and_encrypt(
            message,
            HashFunction::Sha256,
            sender.private_key(),
            recipient.public_key(),
        )
        .unwrap();
        let recovered = decrypt_and_verify(
            &packet,
            HashFunction::Sha256,
            recipient.private_key(),
            sender.public_key(),
        )
        .unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn combined_flow_detects_wrong_sender() {
        let mut rng = rng();
        let sender = keypair(&mut rng, 512);
        let impostor = keypair(&mut rng, 512);
        let recipient = keypair(&mut rng, 512);

        let packet = sign_and_encrypt(
            b"who sent this?",
            HashFunction::Sha256,
            sender.private_key(),
            recipient.public_key(),
        )
        .unwrap();
        assert_eq!(
            decrypt_and_verify(
                &packet,
                HashFunction::Sha256,
                recipient.private_key(),
                impostor.public_key(),
            ),
            Err(Error::SignatureVerification)
        );
    }

    #[test]
    fn combined_flow_detects_tampering() {
        let mut rng = rng();
        let sender = keypair(&mut rng, 512);
        let recipient = keypair(&mut rng, 512);

        let packet = sign_and_encrypt(
            b"untouched",
            HashFunction::Sha256,
            sender.private_key(),
            recipient.public_key(),
        )
        .unwrap();

        let mut tampered = packet.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 1;
        assert!(decrypt_and_verify(
            &tampered,
            HashFunction::Sha256,
            recipient.private_key(),
            sender.public_key(),
        )
        .is_err());
    }
}
