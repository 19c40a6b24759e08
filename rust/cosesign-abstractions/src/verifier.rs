// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Collaborator contracts used by the COSE_Sign verifier.
//!
//! Both traits expose a synchronous method and an async counterpart whose
//! default implementation delegates to the synchronous path. Implementations
//! backed by remote services (HSMs, online chain builders) override the async
//! method instead.

pub use futures::future::BoxFuture;
use futures::FutureExt as _;

use crate::{CoseAlgorithm, CoseSignError, VerificationKey};

/// Raw signature primitive.
///
/// Contract:
/// - `Ok(true)`: the signature matches `message` under `key`.
/// - `Ok(false)`: the signature was evaluated and does not match (including
///   malformed signature bytes).
/// - `Err(...)`: the signature could not be evaluated (e.g. unusable key).
pub trait SignatureVerifier: Send + Sync {
    fn verify(
        &self,
        alg: CoseAlgorithm,
        key: &VerificationKey,
        signature: &[u8],
        message: &[u8],
    ) -> Result<bool, CoseSignError>;

    fn verify_async<'a>(
        &'a self,
        alg: CoseAlgorithm,
        key: &'a VerificationKey,
        signature: &'a [u8],
        message: &'a [u8],
    ) -> BoxFuture<'a, Result<bool, CoseSignError>> {
        async move { self.verify(alg, key, signature, message) }.boxed()
    }
}

/// X.509 path validation.
///
/// `chain_der` is leaf first. `trusted_roots` are PEM (or bare base64 DER)
/// certificates. On success, returns the leaf's public key.
pub trait X509ChainVerifier: Send + Sync {
    fn verify_chain(
        &self,
        chain_der: &[Vec<u8>],
        trusted_roots: &[String],
    ) -> Result<VerificationKey, CoseSignError>;

    fn verify_chain_async<'a>(
        &'a self,
        chain_der: &'a [Vec<u8>],
        trusted_roots: &'a [String],
    ) -> BoxFuture<'a, Result<VerificationKey, CoseSignError>> {
        async move { self.verify_chain(chain_der, trusted_roots) }.boxed()
    }
}
