// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! X.509 chain validation for COSE `x5c`.
//!
//! The chain carried in a signer's `x5c` header (label 33) is built from the
//! leaf towards one of the caller-provided trusted roots. Each link is checked
//! by issuer/subject name and by verifying the child's signature with the
//! issuer's public key. On success the leaf's SubjectPublicKeyInfo (DER) is
//! returned as the signer's verification key.
//!
//! Every certificate on the path must be within its validity period, and
//! every issuer that is not itself a trusted root must be a CA allowed to
//! sign certificates. Revocation is not checked.

use cosesign_abstractions::{CoseSignError, VerificationKey, X509ChainVerifier};
use ed25519_dalek::pkcs8::DecodePublicKey as _;
use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha2::digest::const_oid::AssociatedOid;
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier as _;
use tracing::{debug, warn};

use crate::trusted_roots::decode_trusted_roots;

#[derive(Debug, Clone)]
pub struct X509ChainVerifyOptions {
    /// Maximum number of issuer links followed from the leaf.
    pub max_chain_depth: usize,
    /// Accept a leaf whose DER is itself one of the trusted roots.
    pub allow_leaf_as_trust_anchor: bool,
}

impl Default for X509ChainVerifyOptions {
    fn default() -> Self {
        Self {
            max_chain_depth: 16,
            allow_leaf_as_trust_anchor: true,
        }
    }
}

/// Default [`X509ChainVerifier`] backed by `x509-parser`.
#[derive(Debug, Clone, Default)]
pub struct X5cChainVerifier {
    options: X509ChainVerifyOptions,
}

impl X5cChainVerifier {
    pub fn new(options: X509ChainVerifyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &X509ChainVerifyOptions {
        &self.options
    }
}

impl X509ChainVerifier for X5cChainVerifier {
    fn verify_chain(
        &self,
        chain_der: &[Vec<u8>],
        trusted_roots: &[String],
    ) -> Result<VerificationKey, CoseSignError> {
        let result = validate_x5c_chain(chain_der, trusted_roots, &self.options);
        match &result {
            Ok(_) => debug!(chain_len = chain_der.len(), "x5c chain validated"),
            Err(e) => warn!(error = %e, "x5c chain validation failed"),
        }
        result
    }
}

#[derive(Debug, Clone)]
struct ParsedCert {
    der: Vec<u8>,
    subject_dn: String,
    issuer_dn: String,
    spki_der: Vec<u8>,
    tbs_der: Vec<u8>,
    signature_oid: String,
    signature: Vec<u8>,
    /// basicConstraints `cA` is set.
    is_ca: bool,
    /// keyUsage is absent or includes keyCertSign.
    can_sign_certs: bool,
    time_valid: bool,
}

fn parse_cert_der(der: &[u8]) -> Result<ParsedCert, String> {
    let (_, cert) = x509_parser::parse_x509_certificate(der).map_err(|e| format!("invalid cert DER: {e}"))?;

    Ok(ParsedCert {
        der: der.to_vec(),
        subject_dn: cert.tbs_certificate.subject.to_string(),
        issuer_dn: cert.tbs_certificate.issuer.to_string(),
        spki_der: cert.tbs_certificate.subject_pki.raw.to_vec(),
        // `x509-parser` keeps the raw DER for TBSCertificate; expose it via `AsRef`.
        tbs_der: cert.tbs_certificate.as_ref().to_vec(),
        signature_oid: cert.signature_algorithm.algorithm.to_string(),
        signature: cert.signature_value.data.to_vec(),
        is_ca: matches!(cert.basic_constraints(), Ok(Some(bc)) if bc.value.ca),
        can_sign_certs: match cert.key_usage() {
            Ok(Some(ku)) => ku.value.key_cert_sign(),
            Ok(None) => true,
            Err(_) => false,
        },
        time_valid: cert.validity().is_valid(),
    })
}

fn chain_invalid(message: String) -> CoseSignError {
    CoseSignError::chain("CERT_CHAIN_INVALID", message)
}

/// Checks that apply to an issuer once its name and signature have matched.
fn check_issuer(issuer: &ParsedCert, is_anchor: bool) -> Result<(), CoseSignError> {
    if !issuer.time_valid {
        return Err(chain_invalid(format!(
            "issuer certificate '{}' is outside its validity period",
            issuer.subject_dn
        )));
    }
    if is_anchor {
        return Ok(());
    }
    if !issuer.is_ca {
        return Err(chain_invalid(format!("issuer certificate '{}' is not a CA", issuer.subject_dn)));
    }
    if !issuer.can_sign_certs {
        return Err(chain_invalid(format!(
            "issuer certificate '{}' is not allowed to sign certificates",
            issuer.subject_dn
        )));
    }
    Ok(())
}

fn verify_rsa_pkcs1<D>(issuer_spki_der: &[u8], tbs_der: &[u8], signature: &[u8]) -> Result<(), String>
where
    D: sha2::Digest + AssociatedOid,
{
    let key = RsaPublicKey::from_public_key_der(issuer_spki_der).map_err(|e| format!("bad RSA public key: {e}"))?;
    let vk = pkcs1v15::VerifyingKey::<D>::new(key);
    let sig = pkcs1v15::Signature::try_from(signature).map_err(|e| format!("bad RSA signature bytes: {e}"))?;
    vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
}

fn verify_cert_signature(
    issuer_spki_der: &[u8],
    tbs_der: &[u8],
    signature_oid: &str,
    signature: &[u8],
) -> Result<(), String> {
    match signature_oid {
        // sha256WithRSAEncryption / sha384WithRSAEncryption / sha512WithRSAEncryption
        "1.2.840.113549.1.1.11" => verify_rsa_pkcs1::<Sha256>(issuer_spki_der, tbs_der, signature),
        "1.2.840.113549.1.1.12" => verify_rsa_pkcs1::<Sha384>(issuer_spki_der, tbs_der, signature),
        "1.2.840.113549.1.1.13" => verify_rsa_pkcs1::<Sha512>(issuer_spki_der, tbs_der, signature),

        // ecdsa-with-SHA256 / SHA384 / SHA512
        "1.2.840.10045.4.3.2" => {
            let pk = p256::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad P-256 issuer public key: {e}"))?;
            let ep = pk.to_encoded_point(false);
            let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| format!("bad P-256 issuer public key: {e}"))?;
            let sig = p256::ecdsa::Signature::from_der(signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }
        "1.2.840.10045.4.3.3" => {
            let pk = p384::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad P-384 issuer public key: {e}"))?;
            let ep = pk.to_encoded_point(false);
            let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| format!("bad P-384 issuer public key: {e}"))?;
            let sig = p384::ecdsa::Signature::from_der(signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }
        "1.2.840.10045.4.3.4" => {
            let pk = p521::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad P-521 issuer public key: {e}"))?;
            let ep = pk.to_encoded_point(false);
            let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| format!("bad P-521 issuer public key: {e}"))?;
            let sig = p521::ecdsa::Signature::from_der(signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }

        // id-Ed25519
        "1.3.101.112" => {
            let vk = ed25519_dalek::VerifyingKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad Ed25519 issuer public key: {e}"))?;
            let sig = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|e| format!("bad Ed25519 signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }

        _ => Err(format!("unsupported certificate signature algorithm OID: {signature_oid}")),
    }
}

/// Validate `x5c_certs_der` (leaf first) against `trusted_roots` and return the leaf key.
pub fn validate_x5c_chain(
    x5c_certs_der: &[Vec<u8>],
    trusted_roots: &[String],
    options: &X509ChainVerifyOptions,
) -> Result<VerificationKey, CoseSignError> {
    let leaf_der = match x5c_certs_der.first() {
        Some(der) if !der.is_empty() => der,
        _ => return Err(CoseSignError::chain("MISSING_X5C", "x5c header (label 33) not found or invalid")),
    };

    let leaf = parse_cert_der(leaf_der)
        .map_err(|e| CoseSignError::chain("INVALID_X5C", format!("x5c leaf certificate was invalid DER: {e}")))?;

    if trusted_roots.is_empty() {
        return Err(CoseSignError::chain(
            "CERT_CHAIN_NO_TRUST_ANCHORS",
            "at least one trusted root is required",
        ));
    }

    let mut anchors = Vec::new();
    for root_der in decode_trusted_roots(trusted_roots)? {
        let parsed = parse_cert_der(&root_der).map_err(|e| {
            CoseSignError::chain(
                "CERT_CHAIN_TRUST_ANCHOR_ERROR",
                format!("failed to parse a trusted root certificate: {e}"),
            )
        })?;
        anchors.push(parsed);
    }

    let mut provided_intermediates = Vec::new();
    for (index, der) in x5c_certs_der.iter().enumerate().skip(1) {
        if der.is_empty() {
            continue;
        }
        match parse_cert_der(der) {
            Ok(c) => provided_intermediates.push(c),
            Err(e) => debug!(index, error = %e, "skipping unparseable x5c intermediate"),
        }
    }

    if !leaf.time_valid {
        return Err(chain_invalid(format!(
            "leaf certificate '{}' is outside its validity period",
            leaf.subject_dn
        )));
    }

    let leaf_key = VerificationKey::new(leaf.spki_der.clone());

    // Special-case: leaf itself is a trusted root.
    if options.allow_leaf_as_trust_anchor && anchors.iter().any(|a| a.der == leaf.der) {
        return Ok(leaf_key);
    }

    // Attempt to build a chain leaf -> ... -> anchor.
    let mut current = leaf;
    for _ in 0..options.max_chain_depth {
        // Prefer issuers from the provided x5c intermediates, then fall back to trust anchors.
        // A candidate that matches but fails the issuer checks is skipped; its error is
        // reported only if no other candidate is acceptable.
        let mut rejected = None;
        let mut found = None;
        for issuer in provided_intermediates.iter().chain(anchors.iter()) {
            if issuer.subject_dn != current.issuer_dn {
                continue;
            }
            let signed_by_issuer =
                verify_cert_signature(&issuer.spki_der, &current.tbs_der, &current.signature_oid, &current.signature);
            if signed_by_issuer.is_err() {
                continue;
            }

            let is_anchor = anchors.iter().any(|a| a.der == issuer.der);

            // A self-signed certificate that is not a trusted root terminates the chain.
            if !is_anchor && issuer.der == current.der {
                return Err(CoseSignError::chain(
                    "CERT_CHAIN_UNTRUSTED_ROOT",
                    "certificate chain ends in an untrusted root",
                ));
            }

            match check_issuer(issuer, is_anchor) {
                Ok(()) => {
                    found = Some((issuer.clone(), is_anchor));
                    break;
                }
                Err(e) => {
                    debug!(issuer = %issuer.subject_dn, error = %e, "skipping unacceptable issuer");
                    rejected.get_or_insert(e);
                }
            }
        }

        let Some((issuer, is_anchor)) = found else {
            return Err(rejected.unwrap_or_else(|| {
                CoseSignError::chain("CERT_CHAIN_UNTRUSTED_ROOT", "certificate chain ends in an untrusted root")
            }));
        };

        if is_anchor {
            return Ok(leaf_key);
        }

        current = issuer;
    }

    Err(CoseSignError::chain(
        "CERT_CHAIN_BUILD_ERROR",
        format!("failed to build certificate chain within {} links", options.max_chain_depth),
    ))
}
