// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use cosesign_abstractions::{CoseAlgorithm, CoseSignError, SignatureVerifier, VerificationKey};
use cosesign_common::CoseSign;
use cosesign_validation::{CoseSignVerifier, DefaultSignatureVerifier, VerificationKeys};

/// Parse a COSE_Sign structure from its CBOR encoding (tagged or untagged).
pub fn parse_cose_sign(input: &[u8]) -> Result<CoseSign, CoseSignError> {
    cosesign_common::parse_cose_sign(input)
}

/// Parse `cose_sign` and verify every signer with `keys`, using the default primitives.
pub async fn verify_cose_sign(cose_sign: &[u8], keys: &VerificationKeys) -> Result<bool, CoseSignError> {
    let envelope = parse_cose_sign(cose_sign)?;
    CoseSignVerifier::default().verify(&envelope, keys).await
}

/// Parse `cose_sign` and verify every signer with the key of its `x5c` chain.
///
/// `trusted_roots` are PEM certificates or bare base64 DER.
pub async fn verify_cose_sign_x509(cose_sign: &[u8], trusted_roots: &[String]) -> Result<bool, CoseSignError> {
    let envelope = parse_cose_sign(cose_sign)?;
    CoseSignVerifier::default().verify_x509(&envelope, trusted_roots).await
}

/// Verify a raw signature over precomputed Sig_structure bytes.
pub fn verify_sig_structure(
    alg: CoseAlgorithm,
    public_key_bytes: &[u8],
    sig_structure: &[u8],
    signature: &[u8],
) -> Result<bool, CoseSignError> {
    DefaultSignatureVerifier.verify(alg, &VerificationKey::new(public_key_bytes), signature, sig_structure)
}
