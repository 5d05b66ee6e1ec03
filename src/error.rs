// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Errors that can occur during cryptographic operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("no modular inverse exists: operands are not coprime")]
    NoInverse,

    #[error("insufficient bit length: must be at least {min} bits, got {actual}")]
    InsufficientBits { min: usize, actual: usize },

    #[error("ciphertext is invalid or corrupted")]
    InvalidCiphertext,

    #[error("message does not fit below the modulus")]
    MessageTooLarge,

    #[error("signature verification failed")]
    SignatureVerification,

    #[error("generation failed after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
