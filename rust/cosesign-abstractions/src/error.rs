// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error type shared by every COSE_Sign crate.
//!
//! Only conditions that stop a signature from being *evaluated* are errors.
//! A signature that was evaluated and did not match is reported as `Ok(false)`.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoseSignError {
    /// No key could be resolved for a signer.
    #[error("key not found")]
    KeyNotFound,

    /// The signer's protected `alg` header is missing or not supported.
    #[error("unknown algorithm: {alg}")]
    UnknownAlgorithm {
        /// The raw header value, or `none` when the header was absent.
        alg: String,
    },

    /// The `x5c` chain is absent, malformed, or does not reach a trusted root.
    #[error("certificate chain validation failed ({code}): {message}")]
    ChainValidation {
        /// Stable, machine-readable code (e.g. `CERT_CHAIN_UNTRUSTED_ROOT`).
        code: &'static str,
        message: String,
    },

    /// The caller's inputs do not fit the envelope (e.g. key count mismatch).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Key material could not be used with the signer's algorithm.
    #[error("invalid public key: {0}")]
    InvalidKey(String),

    /// A caller-supplied key resolver failed.
    #[error("key resolver failed: {0}")]
    Resolver(String),

    #[error("CBOR decode error: {0}")]
    Decode(String),

    #[error("CBOR encode error: {0}")]
    Encode(String),
}

impl CoseSignError {
    pub fn chain(code: &'static str, message: impl Into<String>) -> Self {
        CoseSignError::ChainValidation {
            code,
            message: message.into(),
        }
    }

    /// Stable error code for the chain-validation case.
    pub fn chain_code(&self) -> Option<&'static str> {
        match self {
            CoseSignError::ChainValidation { code, .. } => Some(code),
            _ => None,
        }
    }
}
