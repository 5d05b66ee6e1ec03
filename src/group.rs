// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multiplicative group construction: random safe-prime groups with a
//! generator search, and the fixed RFC 3526 MODP groups.

use num_bigint_dig::BigUint;
use num_traits::One;
use rand::RngCore;

use crate::{math, prime, Error, Result};

/// Candidates tried by [`find_generator`] before giving up. For a genuine
/// safe prime above 5 the very first few candidates already succeed.
const GENERATOR_SEARCH_LIMIT: u32 = 4096;

/// A multiplicative group `(Z/pZ)*` described by a prime modulus `p` and a
/// base element `g`. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub(crate) p: BigUint,
    pub(crate) g: BigUint,
}

impl Group {
    /// Construct a group from raw parameters.
    ///
    /// Validation is deliberately light (`p > 1`, `2 <= g < p`) so callers
    /// can assemble demo groups such as `(7883, 2)`; primality of `p` is the
    /// caller's responsibility.
    pub fn new(p: BigUint, g: BigUint) -> Result<Self> {
        if p <= BigUint::one() {
            return Err(Error::InvalidParameter("group modulus must be greater than 1"));
        }
        if g < BigUint::from(2u32) || g >= p {
            return Err(Error::InvalidParameter("generator must satisfy 2 <= g < p"));
        }
        Ok(Self { p, g })
    }

    /// Return the prime modulus `p`.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Return the generator `g`.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Bit length of the modulus.
    pub fn bits(&self) -> usize {
        self.p.bits()
    }
}

/// Generate a random safe prime `p = 2q + 1` with `q` prime and `p` of
/// exactly `bits` bits. Returns `(p, q)`.
///
/// `q` is drawn at `bits - 1` bits with its top bit set, so the doubling
/// lands `p` on the requested width.
///
/// ## Errors
///
/// Returns [`Error::InvalidParameter`] if `bits < 3` and
/// [`Error::GenerationExhausted`] once `max_attempts` candidates have been
/// drawn without success.
pub fn random_safe_prime<R: RngCore>(
    bits: usize,
    rounds: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<(BigUint, BigUint)> {
    if bits < 3 {
        return Err(Error::InvalidParameter("safe prime bit length must be at least 3"));
    }

    for _ in 0..max_attempts {
        let q = prime::random_candidate(bits - 1, rng);
        if !prime::is_probable_prime(&q, rounds, rng) {
            continue;
        }
        let p = (&q << 1) | BigUint::one();
        if prime::is_probable_prime(&p, rounds, rng) {
            return Ok((p, q));
        }
    }

    Err(Error::GenerationExhausted { attempts: max_attempts })
}

/// Find the smallest generator of the full group `(Z/pZ)*` for a safe prime
/// `p = 2q + 1`.
///
/// Element orders divide `2q`, so a candidate with `g^q != 1` and
/// `g^2 != 1` has order exactly `2q`. Candidates are scanned from 2 upward;
/// the result is deterministic for a given group.
pub fn find_generator(p: &BigUint, q: &BigUint) -> Result<BigUint> {
    if *p != ((q << 1) | BigUint::one()) {
        return Err(Error::InvalidParameter("p must equal 2q + 1"));
    }

    let two = BigUint::from(2u32);
    for candidate in 2..GENERATOR_SEARCH_LIMIT {
        let g = BigUint::from(candidate);
        if &g >= p {
            break;
        }
        if !math::modpow(&g, q, p)?.is_one() && !math::modpow(&g, &two, p)?.is_one() {
            return Ok(g);
        }
    }

    Err(Error::GenerationExhausted { attempts: GENERATOR_SEARCH_LIMIT as usize })
}

/// Builder for random safe-prime groups.
#[derive(Debug)]
pub struct GroupBuilder {
    bits: usize,
    rounds: Option<usize>,
    max_attempts: Option<usize>,
}

impl GroupBuilder {
    /// Minimum recommended modulus size for production use.
    pub const MIN_SECURE_BITS: usize = 2048;

    /// Absolute minimum enforced in production builds.
    /// Can be bypassed with the `allow-weak-keys` feature flag.
    #[cfg(not(feature = "allow-weak-keys"))]
    const ABSOLUTE_MIN_BITS: usize = 512;

    #[cfg(feature = "allow-weak-keys")]
    const ABSOLUTE_MIN_BITS: usize = 128;

    /// Create a builder with default parameters (2048-bit modulus).
    pub fn new() -> Self {
        Self { bits: 2048, rounds: None, max_attempts: None }
    }

    /// Set the desired modulus bit length.
    pub fn bits(mut self, bits: usize) -> Self {
        self.bits = bits;
        self
    }

    /// Override the Miller-Rabin round count.
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = Some(rounds);
        self
    }

    /// Override the candidate cap for the safe-prime search
    /// (default `bits * bits`).
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Generate the group.
    pub fn build<R: RngCore>(self, rng: &mut R) -> Result<Group> {
        if self.bits < Self::ABSOLUTE_MIN_BITS {
            return Err(Error::InsufficientBits {
                min: Self::ABSOLUTE_MIN_BITS,
                actual: self.bits,
            });
        }
        if self.bits < Self::MIN_SECURE_BITS {
            eprintln!("⚠️  SECURITY WARNING: {}-bit group is cryptographically weak!", self.bits);
            eprintln!("⚠️  Use {} bits minimum for production", Self::MIN_SECURE_BITS);
        }

        let rounds = self.rounds.unwrap_or_else(|| prime::recommended_rounds(self.bits));
        let max_attempts = self.max_attempts.unwrap_or(self.bits * self.bits);

        let (p, q) = random_safe_prime(self.bits, rounds, max_attempts, rng)?;
        let g = find_generator(&p, &q)?;
        Group::new(p, g)
    }
}

impl Default for GroupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The MODP groups of RFC 3526, each a safe prime of the form
/// `2^b - 2^(b-64) - 1 + 2^64 * (floor(2^(b-130) * pi) + offset)` with
/// generator 2.
///
/// Note that 2 is a quadratic residue for these primes: it generates the
/// subgroup of order `q = (p - 1) / 2`, which is the subgroup standardized
/// for key exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardGroup {
    /// 1536-bit MODP group (RFC 3526, id 5).
    Modp1536,
    /// 2048-bit MODP group (RFC 3526, id 14).
    Modp2048,
    /// 3072-bit MODP group (RFC 3526, id 15).
    Modp3072,
    /// 4096-bit MODP group (RFC 3526, id 16).
    Modp4096,
}

const MODP_1536_HEX: &[u8] = b"ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e08\
              8a67cc74020bbea63b139b22514a08798e3404ddef9519b3cd3a431b\
              302b0a6df25f14374fe1356d6d51c245e485b576625e7ec6f44c42e9\
              a637ed6b0bff5cb6f406b7edee386bfb5a899fa5ae9f24117c4b1fe6\
              49286651ece45b3dc2007cb8a163bf0598da48361c55d39a69163fa8\
              fd24cf5f83655d23dca3ad961c62f356208552bb9ed529077096966d\
              670c354e4abc9804f1746c08ca237327ffffffffffffffff";

const MODP_2048_HEX: &[u8] = b"ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e08\
              8a67cc74020bbea63b139b22514a08798e3404ddef9519b3cd3a431b\
              302b0a6df25f14374fe1356d6d51c245e485b576625e7ec6f44c42e9\
              a637ed6b0bff5cb6f406b7edee386bfb5a899fa5ae9f24117c4b1fe6\
              49286651ece45b3dc2007cb8a163bf0598da48361c55d39a69163fa8\
              fd24cf5f83655d23dca3ad961c62f356208552bb9ed529077096966d\
              670c354e4abc9804f1746c08ca18217c32905e462e36ce3be39e772c\
              180e86039b2783a2ec07a28fb5c55df06f4c52c9de2bcbf695581718\
              3995497cea956ae515d2261898fa051015728e5a8aacaa68ffffffff\
              ffffffff";

const MODP_3072_HEX: &[u8] = b"ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e08\
              8a67cc74020bbea63b139b22514a08798e3404ddef9519b3cd3a431b\
              302b0a6df25f14374fe1356d6d51c245e485b576625e7ec6f44c42e9\
              a637ed6b0bff5cb6f406b7edee386bfb5a899fa5ae9f24117c4b1fe6\
              49286651ece45b3dc2007cb8a163bf0598da48361c55d39a69163fa8\
              fd24cf5f83655d23dca3ad961c62f356208552bb9ed529077096966d\
              670c354e4abc9804f1746c08ca18217c32905e462e36ce3be39e772c\
              180e86039b2783a2ec07a28fb5c55df06f4c52c9de2bcbf695581718\
              3995497cea956ae515d2261898fa051015728e5a8aaac42dad33170d\
              04507a33a85521abdf1cba64ecfb850458dbef0a8aea71575d060c7d\
              b3970f85a6e1e4c7abf5ae8cdb0933d71e8c94e04a25619dcee3d226\
              1ad2ee6bf12ffa06d98a0864d87602733ec86a64521f2b18177b200c\
              bbe117577a615d6c770988c0bad946e208e24fa074e5ab3143db5bfc\
              e0fd108e4b82d120a93ad2caffffffffffffffff";

const MODP_4096_HEX: &[u8] = b"ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e08\
              8a67cc74020bbea63b139b22514a08798e3404ddef9519b3cd3a431b\
              302b0a6df25f14374fe1356d6d51c245e485b576625e7ec6f44c42e9\
              a637ed6b0bff5cb6f406b7edee386bfb5a899fa5ae9f24117c4b1fe6\
              49286651ece45b3dc2007cb8a163bf0598da48361c55d39a69163fa8\
              fd24cf5f83655d23dca3ad961c62f356208552bb9ed529077096966d\
              670c354e4abc9804f1746c08ca18217c32905e462e36ce3be39e772c\
              180e86039b2783a2ec07a28fb5c55df06f4c52c9de2bcbf695581718\
              3995497cea956ae515d2261898fa051015728e5a8aaac42dad33170d\
              04507a33a85521abdf1cba64ecfb850458dbef0a8aea71575d060c7d\
              b3970f85a6e1e4c7abf5ae8cdb0933d71e8c94e04a25619dcee3d226\
              1ad2ee6bf12ffa06d98a0864d87602733ec86a64521f2b18177b200c\
              bbe117577a615d6c770988c0bad946e208e24fa074e5ab3143db5bfc\
              e0fd108e4b82d120a92108011a723c12a787e6d788719a10bdba5b26\
              99c327186af4e23c1a946834b6150bda2583e9ca2ad44ce8dbbbc2db\
              04de8ef92e8efc141fbecaa6287c59474e6bc05d99b2964fa090c3a2\
              233ba186515be7ed1f612970cee2d7afb81bdd762170481cd0069127\
              d5b05aa993b4ea988d8fddc186ffb7dc90a6c08f4df435c934063199\
              ffffffffffffffff";

impl StandardGroup {
    /// Bit length of the group modulus.
    pub fn bits(&self) -> usize {
        match self {
            StandardGroup::Modp1536 => 1536,
            StandardGroup::Modp2048 => 2048,
            StandardGroup::Modp3072 => 3072,
            StandardGroup::Modp4096 => 4096,
        }
    }

    /// Select a standard group by modulus bit length.
    pub fn from_bits(bits: usize) -> Option<Self> {
        match bits {
            1536 => Some(StandardGroup::Modp1536),
            2048 => Some(StandardGroup::Modp2048),
            3072 => Some(StandardGroup::Modp3072),
            4096 => Some(StandardGroup::Modp4096),
            _ => None,
        }
    }

    /// Materialize the group. The constants are pre-verified, so no runtime
    /// primality check is performed.
    pub fn group(&self) -> Group {
        let hex = match self {
            StandardGroup::Modp1536 => MODP_1536_HEX,
            StandardGroup::Modp2048 => MODP_2048_HEX,
            StandardGroup::Modp3072 => MODP_3072_HEX,
            StandardGroup::Modp4096 => MODP_4096_HEX,
        };
        let p = BigUint::parse_bytes(hex, 16).expect("RFC 3526 constant is valid hex");
        Group { p, g: BigUint::from(2u32) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint_dig::prime::probably_prime;
    use num_traits::One;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(23)
    }

    #[test]
    fn group_new_validates_parameters() {
        assert!(Group::new(BigUint::from(7883u32), BigUint::from(2u32)).is_ok());
        assert!(Group::new(BigUint::one(), BigUint::from(2u32)).is_err());
        assert!(Group::new(BigUint::from(23u32), BigUint::one()).is_err());
        assert!(Group::new(BigUint::from(23u32), BigUint::from(23u32)).is_err());
    }

    #[test]
    fn safe_prime_has_exact_bit_length() {
        let mut rng = rng();
        for bits in [16usize, 24, 48] {
            let (p, q) = random_safe_prime(bits, 20, bits * bits, &mut rng).unwrap();
            assert_eq!(p.bits(), bits, "p must be exactly {bits} bits");
            assert_eq!(p, (&q << 1) | BigUint::one());
            assert!(probably_prime(&p, 20));
            assert!(probably_prime(&q, 20));
        }
    }

    #[test]
    fn safe_prime_rejects_tiny_widths() {
        let mut rng = rng();
        assert!(matches!(
            random_safe_prime(2, 20, 100, &mut rng),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn safe_prime_reports_exhaustion() {
        let mut rng = rng();
        assert_eq!(
            random_safe_prime(32, 20, 0, &mut rng),
            Err(Error::GenerationExhausted { attempts: 0 })
        );
    }

    #[test]
    fn find_generator_smallest_full_order_element() {
        // 23 = 2 * 11 + 1; 2, 3 and 4 all have order 11 or less
        let g = find_generator(&BigUint::from(23u32), &BigUint::from(11u32)).unwrap();
        assert_eq!(g, BigUint::from(5u32));
    }

    #[test]
    fn find_generator_output_has_order_2q() {
        let mut rng = rng();
        let (p, q) = random_safe_prime(32, 20, 2048, &mut rng).unwrap();
        let g = find_generator(&p, &q).unwrap();

        // order divides 2q; excluding 1, 2 and q leaves exactly 2q
        assert!(!math::modpow(&g, &q, &p).unwrap().is_one());
        assert!(!math::modpow(&g, &BigUint::from(2u32), &p).unwrap().is_one());
        assert!(math::modpow(&g, &(&q << 1), &p).unwrap().is_one());
    }

    #[test]
    fn find_generator_validates_pair() {
        assert!(matches!(
            find_generator(&BigUint::from(23u32), &BigUint::from(7u32)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn builder_enforces_hard_floor() {
        let mut rng = rng();
        let result = GroupBuilder::new().bits(64).build(&mut rng);
        assert!(matches!(result, Err(Error::InsufficientBits { .. })));
    }

    #[test]
    #[ignore] // 512-bit safe prime search, roughly 10-60s
    fn builder_generates_weak_demo_group() {
        let mut rng = rng();
        let group = GroupBuilder::new().bits(512).build(&mut rng).unwrap();
        assert_eq!(group.bits(), 512);
        assert!(probably_prime(group.p(), 20));
    }

    #[test]
    fn standard_groups_have_advertised_sizes() {
        for sg in [
            StandardGroup::Modp1536,
            StandardGroup::Modp2048,
            StandardGroup::Modp3072,
            StandardGroup::Modp4096,
        ] {
            let group = sg.group();
            assert_eq!(group.bits(), sg.bits());
            assert_eq!(group.g(), &BigUint::from(2u32));
            assert_eq!(StandardGroup::from_bits(sg.bits()), Some(sg));
        }
        assert_eq!(StandardGroup::from_bits(1024), None);
    }

    #[test]
    fn modp_2048_matches_published_constant() {
        let group = StandardGroup::Modp2048.group();
        let bytes = group.p().to_bytes_be();
        assert_eq!(hex::encode(&bytes[..16]), "ffffffffffffffffc90fdaa22168c234");
        assert_eq!(hex::encode(&bytes[bytes.len() - 8..]), "ffffffffffffffff");
    }

    #[test]
    fn standard_groups_are_safe_primes() {
        // q = (p - 1) / 2 must be prime as well; a handful of rounds keeps
        // this fast on the 4096-bit member
        for sg in [StandardGroup::Modp1536, StandardGroup::Modp4096] {
            let group = sg.group();
            let q = (group.p() - 1u32) >> 1;
            assert!(probably_prime(group.p(), 4));
            assert!(probably_prime(&q, 4));
        }
    }
}
