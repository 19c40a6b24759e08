// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Default cryptographic primitive for COSE signatures.
//!
//! Public key inputs are intentionally flexible to support common calling patterns:
//! - DER X.509 certificate (the SubjectPublicKeyInfo is extracted)
//! - DER SubjectPublicKeyInfo (SPKI)
//! - Algorithm-specific raw public key bytes (EdDSA and ML-DSA only)
//!
//! A signature that cannot be decoded for the algorithm counts as a mismatch
//! (`Ok(false)`); a key that cannot be decoded is an error.

use cosesign_abstractions::{CoseAlgorithm, CoseSignError, SignatureVerifier, VerificationKey};
use ed25519_dalek::pkcs8::DecodePublicKey as _;
use ml_dsa::{MlDsa44, MlDsa65, MlDsa87};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::pss;
use rsa::RsaPublicKey;
use sha2::digest::const_oid::AssociatedOid;
use sha2::digest::FixedOutputReset;
use sha2::{Digest, Sha256, Sha384, Sha512};
use signature::Verifier;
use x509_parser::prelude::FromDer as _;

/// [`SignatureVerifier`] covering every [`CoseAlgorithm`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSignatureVerifier;

impl DefaultSignatureVerifier {
    pub fn new() -> Self {
        Self
    }
}

impl SignatureVerifier for DefaultSignatureVerifier {
    fn verify(
        &self,
        alg: CoseAlgorithm,
        key: &VerificationKey,
        signature: &[u8],
        message: &[u8],
    ) -> Result<bool, CoseSignError> {
        let key = key.as_bytes();
        match alg {
            CoseAlgorithm::ES256 => verify_ecdsa_p256(key, message, signature),
            CoseAlgorithm::ES384 => verify_ecdsa_p384(key, message, signature),
            CoseAlgorithm::ES512 => verify_ecdsa_p521(key, message, signature),
            CoseAlgorithm::EdDSA => verify_ed25519(key, message, signature),
            CoseAlgorithm::PS256 => verify_rsa_pss::<Sha256>(key, message, signature),
            CoseAlgorithm::PS384 => verify_rsa_pss::<Sha384>(key, message, signature),
            CoseAlgorithm::PS512 => verify_rsa_pss::<Sha512>(key, message, signature),
            CoseAlgorithm::RS256 => verify_rsa_pkcs1::<Sha256>(key, message, signature),
            CoseAlgorithm::RS384 => verify_rsa_pkcs1::<Sha384>(key, message, signature),
            CoseAlgorithm::RS512 => verify_rsa_pkcs1::<Sha512>(key, message, signature),
            // When key material is DER SPKI/cert, the SPKI algorithm OID is checked
            // so a mismatched key is reported instead of silently failing.
            CoseAlgorithm::MLDsa44 => verify_ml_dsa::<MlDsa44>(key, message, signature, "2.16.840.1.101.3.4.3.17"),
            CoseAlgorithm::MLDsa65 => verify_ml_dsa::<MlDsa65>(key, message, signature, "2.16.840.1.101.3.4.3.18"),
            CoseAlgorithm::MLDsa87 => verify_ml_dsa::<MlDsa87>(key, message, signature, "2.16.840.1.101.3.4.3.19"),
        }
    }
}

fn invalid_key(what: &str, e: impl std::fmt::Display) -> CoseSignError {
    CoseSignError::InvalidKey(format!("bad {what} public key: {e}"))
}

/// Normalize ECDSA/RSA/EdDSA key inputs to SPKI DER.
///
/// If the caller supplies a DER certificate, its SPKI DER is extracted.
fn extract_spki_der_from_der_key_or_cert(der: &[u8]) -> Vec<u8> {
    if let Ok((_, cert)) = x509_parser::parse_x509_certificate(der) {
        // `raw` is the DER encoding of the SPKI structure inside the certificate.
        return cert.tbs_certificate.subject_pki.raw.to_vec();
    }
    der.to_vec()
}

/// Verify ES256 (P-256 ECDSA).
fn verify_ecdsa_p256(pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, CoseSignError> {
    // Normalize input into SPKI DER, then decode into the curve public key type.
    let spki = extract_spki_der_from_der_key_or_cert(pub_bytes);
    let pk = p256::PublicKey::from_public_key_der(&spki).map_err(|e| invalid_key("P-256", e))?;

    // Convert to SEC1 encoded point bytes expected by the ECDSA verifying key.
    let ep = pk.to_encoded_point(false);
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes()).map_err(|e| invalid_key("P-256", e))?;

    // COSE carries ECDSA signatures as the raw `r || s` concatenation.
    let Ok(signature) = p256::ecdsa::Signature::from_slice(sig) else {
        return Ok(false);
    };
    Ok(vk.verify(msg, &signature).is_ok())
}

/// Verify ES384 (P-384 ECDSA).
fn verify_ecdsa_p384(pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, CoseSignError> {
    let spki = extract_spki_der_from_der_key_or_cert(pub_bytes);
    let pk = p384::PublicKey::from_public_key_der(&spki).map_err(|e| invalid_key("P-384", e))?;
    let ep = pk.to_encoded_point(false);
    let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes()).map_err(|e| invalid_key("P-384", e))?;
    let Ok(signature) = p384::ecdsa::Signature::from_slice(sig) else {
        return Ok(false);
    };
    Ok(vk.verify(msg, &signature).is_ok())
}

/// Verify ES512 (P-521 ECDSA).
fn verify_ecdsa_p521(pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, CoseSignError> {
    let spki = extract_spki_der_from_der_key_or_cert(pub_bytes);
    let pk = p521::PublicKey::from_public_key_der(&spki).map_err(|e| invalid_key("P-521", e))?;
    let ep = pk.to_encoded_point(false);
    let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes()).map_err(|e| invalid_key("P-521", e))?;
    let Ok(signature) = p521::ecdsa::Signature::from_slice(sig) else {
        return Ok(false);
    };
    Ok(vk.verify(msg, &signature).is_ok())
}

/// Verify EdDSA (Ed25519). Accepts SPKI/cert DER or the raw 32-byte key.
fn verify_ed25519(pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, CoseSignError> {
    let vk = match <[u8; ed25519_dalek::PUBLIC_KEY_LENGTH]>::try_from(pub_bytes) {
        Ok(raw) => ed25519_dalek::VerifyingKey::from_bytes(&raw).map_err(|e| invalid_key("Ed25519", e))?,
        Err(_) => {
            let spki = extract_spki_der_from_der_key_or_cert(pub_bytes);
            ed25519_dalek::VerifyingKey::from_public_key_der(&spki).map_err(|e| invalid_key("Ed25519", e))?
        }
    };
    let Ok(signature) = ed25519_dalek::Signature::from_slice(sig) else {
        return Ok(false);
    };
    Ok(vk.verify(msg, &signature).is_ok())
}

/// Decode an RSA public key from DER certificate or DER SPKI.
fn rsa_public_key(pub_bytes: &[u8]) -> Result<RsaPublicKey, CoseSignError> {
    let spki = extract_spki_der_from_der_key_or_cert(pub_bytes);
    RsaPublicKey::from_public_key_der(&spki).map_err(|e| invalid_key("RSA", e))
}

/// Verify RS256/384/512 (RSASSA-PKCS1v1.5).
fn verify_rsa_pkcs1<D>(pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, CoseSignError>
where
    D: Digest + AssociatedOid,
{
    let vk = pkcs1v15::VerifyingKey::<D>::new(rsa_public_key(pub_bytes)?);
    let Ok(signature) = pkcs1v15::Signature::try_from(sig) else {
        return Ok(false);
    };
    Ok(vk.verify(msg, &signature).is_ok())
}

/// Verify PS256/384/512 (RSASSA-PSS).
fn verify_rsa_pss<D>(pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> Result<bool, CoseSignError>
where
    D: Digest + FixedOutputReset,
{
    let vk = pss::VerifyingKey::<D>::new(rsa_public_key(pub_bytes)?);
    let Ok(signature) = pss::Signature::try_from(sig) else {
        return Ok(false);
    };
    Ok(vk.verify(msg, &signature).is_ok())
}

/// Verify an ML-DSA signature.
///
/// ML-DSA keys are carried in different encodings depending on context:
/// - Raw encoded verifying key bytes (what `ml-dsa` expects for `EncodedVerifyingKey`)
/// - DER SPKI or DER X.509 certificate (the `subjectPublicKey` BIT STRING is extracted)
fn verify_ml_dsa<P: ml_dsa::MlDsaParams>(
    public_key_bytes: &[u8],
    msg: &[u8],
    sig: &[u8],
    expected_spki_oid: &'static str,
) -> Result<bool, CoseSignError> {
    let (encoded_vk_bytes, spki_oid) = extract_ml_dsa_public_key_bytes_and_oid(public_key_bytes);

    if let Some(oid) = spki_oid.as_deref() {
        if oid != expected_spki_oid {
            return Err(CoseSignError::InvalidKey(format!(
                "unexpected public key algorithm OID: expected {expected_spki_oid}, got {oid}"
            )));
        }
    }

    let enc_vk = ml_dsa::EncodedVerifyingKey::<P>::try_from(encoded_vk_bytes.as_slice())
        .map_err(|_| CoseSignError::InvalidKey("bad ML-DSA public key bytes".to_string()))?;
    let vk = ml_dsa::VerifyingKey::<P>::decode(&enc_vk);

    let Ok(signature) = ml_dsa::Signature::<P>::try_from(sig) else {
        return Ok(false);
    };
    Ok(vk.verify(msg, &signature).is_ok())
}

/// Extract ML-DSA public key bytes from either DER cert/SPKI or raw key bytes.
///
/// The OID is returned only when DER decoding succeeded.
fn extract_ml_dsa_public_key_bytes_and_oid(der_or_raw: &[u8]) -> (Vec<u8>, Option<String>) {
    if let Ok((_, cert)) = x509_parser::parse_x509_certificate(der_or_raw) {
        let spki = &cert.tbs_certificate.subject_pki;
        return (spki.subject_public_key.data.to_vec(), Some(spki.algorithm.algorithm.to_string()));
    }

    if let Ok((_, spki)) = x509_parser::x509::SubjectPublicKeyInfo::from_der(der_or_raw) {
        return (spki.subject_public_key.data.to_vec(), Some(spki.algorithm.algorithm.to_string()));
    }

    (der_or_raw.to_vec(), None)
}
