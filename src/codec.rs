// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Packed multi-block wire format shared by the byte-level RSA and ElGamal
//! APIs.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! [u8 version = 1][u32 block_count][u64 plaintext_len]
//!   for each block, values_per_block values:
//!     [u32 len][len bytes, minimal big-endian magnitude]
//! ```
//!
//! The plaintext length in the header lets decoding reconstruct every chunk
//! at its exact width, so leading and embedded zero bytes survive the
//! round trip.

use num_bigint_dig::BigUint;

use crate::{math, Error, Result};

pub(crate) const VERSION: u8 = 1;

/// Header: version byte, block count, plaintext length.
const HEADER_LEN: usize = 13;

/// Plaintext bytes carried per block under `modulus`: the largest width
/// whose values are guaranteed below the modulus.
pub(crate) fn chunk_width(modulus: &BigUint) -> Result<usize> {
    let width = modulus.bits().saturating_sub(1) / 8;
    if width == 0 {
        return Err(Error::InvalidParameter("modulus too small for byte-level blocks"));
    }
    Ok(width)
}

/// Number of blocks a plaintext of `plaintext_len` bytes splits into.
pub(crate) fn expected_blocks(plaintext_len: u64, width: usize) -> usize {
    if plaintext_len == 0 {
        0
    } else {
        plaintext_len.div_ceil(width as u64) as usize
    }
}

/// Serialize encrypted blocks into the packed format.
pub(crate) fn pack(plaintext_len: u64, blocks: &[Vec<BigUint>]) -> Vec<u8> {
    let mut packed = Vec::new();
    packed.push(VERSION);
    packed.extend_from_slice(&(blocks.len() as u32).to_be_bytes());
    packed.extend_from_slice(&plaintext_len.to_be_bytes());

    for block in blocks {
        for value in block {
            let bytes = value.to_bytes_be();
            packed.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            packed.extend_from_slice(&bytes);
        }
    }

    packed
}

/// Parse the packed format back into per-block value groups.
///
/// Any truncation, version mismatch, length inconsistency or trailing
/// garbage yields [`Error::InvalidCiphertext`].
pub(crate) fn unpack(packed: &[u8], values_per_block: usize) -> Result<(u64, Vec<Vec<BigUint>>)> {
    if packed.len() < HEADER_LEN {
        return Err(Error::InvalidCiphertext);
    }
    if packed[0] != VERSION {
        return Err(Error::InvalidCiphertext);
    }

    let block_count = u32::from_be_bytes(packed[1..5].try_into().unwrap()) as usize;
    let plaintext_len = u64::from_be_bytes(packed[5..13].try_into().unwrap());

    // every value carries at least its 4-byte length prefix; bail before
    // trusting a hostile block count
    let total_values = block_count
        .checked_mul(values_per_block)
        .ok_or(Error::InvalidCiphertext)?;
    let min_payload = total_values.checked_mul(4).ok_or(Error::InvalidCiphertext)?;
    if packed.len() - HEADER_LEN < min_payload {
        return Err(Error::InvalidCiphertext);
    }

    let mut offset = HEADER_LEN;
    let mut blocks = Vec::with_capacity(block_count);
    for _ in 0..block_count {
        let mut block = Vec::with_capacity(values_per_block);
        for _ in 0..values_per_block {
            if packed.len() - offset < 4 {
                return Err(Error::InvalidCiphertext);
            }
            let len = u32::from_be_bytes(packed[offset..offset + 4].try_into().unwrap()) as usize;
            offset += 4;
            if packed.len() - offset < len {
                return Err(Error::InvalidCiphertext);
            }
            block.push(BigUint::from_bytes_be(&packed[offset..offset + len]));
            offset += len;
        }
        blocks.push(block);
    }

    if offset != packed.len() {
        return Err(Error::InvalidCiphertext);
    }

    Ok((plaintext_len, blocks))
}

/// Reassemble decrypted block integers into the original plaintext, each
/// chunk at its exact width from the header length.
pub(crate) fn rebuild_plaintext(
    plaintext_len: u64,
    width: usize,
    blocks: &[BigUint],
) -> Result<Vec<u8>> {
    let expected = expected_blocks(plaintext_len, width);
    if blocks.len() != expected {
        return Err(Error::InvalidCiphertext);
    }

    let plaintext_len = plaintext_len as usize;
    let mut out = Vec::with_capacity(plaintext_len);
    for (index, value) in blocks.iter().enumerate() {
        let chunk_len = if index + 1 == expected {
            plaintext_len - width * (expected - 1)
        } else {
            width
        };
        let bytes = math::int_to_bytes(value, chunk_len).map_err(|_| Error::InvalidCiphertext)?;
        out.extend_from_slice(&bytes);
    }

    Ok(out)
}
