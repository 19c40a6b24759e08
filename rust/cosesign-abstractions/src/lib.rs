// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared interfaces and datatypes for the COSE_Sign Rust crates.
//!
//! This crate exists to prevent circular dependencies across:
//! - the CBOR model and codec (`cosesign-common`)
//! - verification (`cosesign-validation`)
//! - the X.509 chain verifier (`cosesign-x509`)
//!
//! It is intentionally kept small and stable.

pub mod algorithm;
pub mod error;
pub mod header;
pub mod key;
pub mod verifier;

pub use algorithm::CoseAlgorithm;
pub use error::CoseSignError;
pub use header::{HeaderKey, HeaderMap, HeaderValue, HEADER_LABEL_ALG, HEADER_LABEL_KID, HEADER_LABEL_X5CHAIN};
pub use key::VerificationKey;
pub use verifier::{BoxFuture, SignatureVerifier, X509ChainVerifier};
