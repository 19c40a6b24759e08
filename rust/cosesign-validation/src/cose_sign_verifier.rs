// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign verification.
//!
//! Each signer is checked independently over its own Sig_structure:
//! 1) Resolve the signer's key (direct, resolver, or `x5c` chain).
//! 2) Resolve the signer's `alg` from its protected headers.
//! 3) Build the Sig_structure bytes.
//! 4) Hand them to the signature primitive.
//!
//! Envelope verification runs one such check per signer concurrently and
//! combines them: the first error wins, otherwise every signer must be valid.

use std::sync::Arc;

use cosesign_abstractions::{CoseSignError, SignatureVerifier, VerificationKey, X509ChainVerifier};
use cosesign_common::{CoseSign, CoseSignature};
use cosesign_x509::{extract_x5c_chain, X5cChainVerifier};
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::key_resolver::{KeyOrResolver, VerificationKeys};
use crate::options::VerifyOptions;
use crate::signature_verifier::DefaultSignatureVerifier;

/// Verifies COSE_Sign envelopes and their individual signers.
///
/// Holds no per-envelope state; one instance can serve any number of calls.
#[derive(Clone)]
pub struct CoseSignVerifier {
    signature_verifier: Arc<dyn SignatureVerifier>,
    chain_verifier: Arc<dyn X509ChainVerifier>,
    options: VerifyOptions,
}

impl Default for CoseSignVerifier {
    fn default() -> Self {
        Self::new(Arc::new(DefaultSignatureVerifier), Arc::new(X5cChainVerifier::default()))
    }
}

impl CoseSignVerifier {
    pub fn new(signature_verifier: Arc<dyn SignatureVerifier>, chain_verifier: Arc<dyn X509ChainVerifier>) -> Self {
        Self {
            signature_verifier,
            chain_verifier,
            options: VerifyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: VerifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify one signer over `payload`.
    ///
    /// `body_protected` is the envelope's protected header bytes; `None` is
    /// signed as an empty bstr. Returns the primitive's verdict unmodified.
    pub async fn verify_signature(
        &self,
        signer: &CoseSignature,
        key: KeyOrResolver<'_>,
        body_protected: Option<&[u8]>,
        payload: &[u8],
    ) -> Result<bool, CoseSignError> {
        let resolved;
        let key = match key {
            KeyOrResolver::Key(k) => k,
            KeyOrResolver::Resolver(resolver) => {
                resolved = resolver.resolve_async(signer).await?.ok_or(CoseSignError::KeyNotFound)?;
                &resolved
            }
        };

        let alg = signer.algorithm()?;
        let to_be_signed = signer.to_be_signed(body_protected, payload)?;

        self.signature_verifier
            .verify_async(alg, key, &signer.signature, &to_be_signed)
            .await
    }

    /// Validate the signer's `x5c` chain against `trusted_roots` and return the leaf key.
    pub async fn verify_x509_chain(
        &self,
        signer: &CoseSignature,
        trusted_roots: &[String],
    ) -> Result<VerificationKey, CoseSignError> {
        let chain = extract_x5c_chain(signer)?;
        self.chain_verifier.verify_chain_async(&chain, trusted_roots).await
    }

    /// Verify every signer of `envelope` with keys from `keys`.
    pub async fn verify(&self, envelope: &CoseSign, keys: &VerificationKeys) -> Result<bool, CoseSignError> {
        if let Some(empty) = self.check_empty(envelope)? {
            return Ok(empty);
        }

        let body = Some(envelope.protected_headers.encoded_map_cbor());
        let payload = envelope.payload.as_slice();

        let results = match keys {
            VerificationKeys::Positional(list) => {
                if list.len() != envelope.signatures.len() {
                    return Err(CoseSignError::Configuration(format!(
                        "expected {} verification keys, got {}",
                        envelope.signatures.len(),
                        list.len()
                    )));
                }
                try_join_all(
                    envelope
                        .signatures
                        .iter()
                        .zip(list)
                        .enumerate()
                        .map(|(index, (signer, key))| {
                            self.verify_logged(index, signer, KeyOrResolver::Key(key), body, payload)
                        }),
                )
                .await?
            }
            VerificationKeys::Resolver(resolver) => {
                try_join_all(envelope.signatures.iter().enumerate().map(|(index, signer)| {
                    self.verify_logged(index, signer, KeyOrResolver::Resolver(resolver.as_ref()), body, payload)
                }))
                .await?
            }
        };

        Ok(results.into_iter().all(|valid| valid))
    }

    /// Verify every signer of `envelope` with the key of its `x5c` chain.
    pub async fn verify_x509(&self, envelope: &CoseSign, trusted_roots: &[String]) -> Result<bool, CoseSignError> {
        if let Some(empty) = self.check_empty(envelope)? {
            return Ok(empty);
        }

        let body = Some(envelope.protected_headers.encoded_map_cbor());
        let payload = envelope.payload.as_slice();

        let results = try_join_all(envelope.signatures.iter().enumerate().map(|(index, signer)| async move {
            let key = self.verify_x509_chain(signer, trusted_roots).await.map_err(|e| {
                warn!(signer = index, error = %e, "signer chain rejected");
                e
            })?;
            self.verify_logged(index, signer, KeyOrResolver::Key(&key), body, payload).await
        }))
        .await?;

        Ok(results.into_iter().all(|valid| valid))
    }

    fn check_empty(&self, envelope: &CoseSign) -> Result<Option<bool>, CoseSignError> {
        if !envelope.signatures.is_empty() {
            return Ok(None);
        }
        if self.options.reject_empty_signatures {
            return Err(CoseSignError::Configuration("envelope has no signatures".to_string()));
        }
        debug!("envelope has no signatures; nothing to verify");
        Ok(Some(true))
    }

    async fn verify_logged(
        &self,
        index: usize,
        signer: &CoseSignature,
        key: KeyOrResolver<'_>,
        body_protected: Option<&[u8]>,
        payload: &[u8],
    ) -> Result<bool, CoseSignError> {
        let result = self.verify_signature(signer, key, body_protected, payload).await;
        match &result {
            Ok(valid) => debug!(signer = index, valid = *valid, "signer verified"),
            Err(e) => warn!(signer = index, error = %e, "signer could not be verified"),
        }
        result
    }
}
