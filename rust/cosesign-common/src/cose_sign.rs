// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign parsing, encoding, and Sig_structure construction.
//!
//! COSE_Sign is defined in RFC 9052 §4.1. The structure is:
//!
//! ```text
//! COSE_Sign = [ protected : bstr,
//!               unprotected : map,
//!               payload : bstr,
//!               signatures : [+ COSE_Signature] ]
//!
//! COSE_Signature = [ protected : bstr,
//!                    unprotected : map,
//!                    signature : bstr ]
//! ```
//!
//! Each signer covers its own `Sig_structure`:
//!
//! ```text
//! [ "Signature", body_protected, sign_protected, external_aad, payload ]
//! ```

use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};

use cosesign_abstractions::{CoseAlgorithm, CoseSignError, HeaderValue, HEADER_LABEL_ALG, HEADER_LABEL_KID};

use crate::header_map::{decode_header_map_from_decoder, encode_map_into, CoseHeaderMap};

/// Standard CBOR tag number used for COSE_Sign.
pub const COSE_SIGN_TAG: u64 = 98;

/// Context string for the per-signer Sig_structure of COSE_Sign.
pub const SIG_STRUCTURE_CONTEXT_SIGNATURE: &str = "Signature";

/// One signer of a COSE_Sign envelope.
///
/// The algorithm is not checked here; see [`CoseSignature::algorithm`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoseSignature {
    pub protected_headers: CoseHeaderMap,
    pub unprotected_headers: CoseHeaderMap,
    pub signature: Vec<u8>,
}

impl CoseSignature {
    pub fn new(
        protected_headers: CoseHeaderMap,
        unprotected_headers: CoseHeaderMap,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            protected_headers,
            unprotected_headers,
            signature,
        }
    }

    /// Resolve the signer's `alg` from its protected headers.
    ///
    /// Missing or unsupported values yield `UnknownAlgorithm` carrying the raw value.
    pub fn algorithm(&self) -> Result<CoseAlgorithm, CoseSignError> {
        match self.protected_headers.get(HEADER_LABEL_ALG) {
            None => Err(CoseSignError::UnknownAlgorithm { alg: "none".to_string() }),
            Some(HeaderValue::Int(v)) => {
                CoseAlgorithm::from_i64(*v).ok_or_else(|| CoseSignError::UnknownAlgorithm { alg: v.to_string() })
            }
            Some(other) => Err(CoseSignError::UnknownAlgorithm { alg: other.to_string() }),
        }
    }

    /// `kid` header (label 4), protected first, then unprotected.
    pub fn key_id(&self) -> Option<&[u8]> {
        self.protected_headers
            .get_bytes(HEADER_LABEL_KID)
            .or_else(|| self.unprotected_headers.get_bytes(HEADER_LABEL_KID))
    }

    /// Encode the Sig_structure this signer covers.
    ///
    /// `body_protected` of `None` contributes an empty bstr. External AAD is always empty.
    pub fn to_be_signed(&self, body_protected: Option<&[u8]>, payload: &[u8]) -> Result<Vec<u8>, CoseSignError> {
        encode_signature_sig_structure(
            body_protected.unwrap_or(&[]),
            self.protected_headers.encoded_map_cbor(),
            payload,
        )
    }
}

/// A COSE_Sign envelope: payload plus an ordered list of signers.
///
/// Signer order matters: positional keys are matched by index.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseSign {
    pub protected_headers: CoseHeaderMap,
    pub unprotected_headers: CoseHeaderMap,
    pub payload: Vec<u8>,
    pub signatures: Vec<CoseSignature>,
}

impl CoseSign {
    pub fn new(
        protected_headers: CoseHeaderMap,
        unprotected_headers: CoseHeaderMap,
        payload: Vec<u8>,
        signatures: Vec<CoseSignature>,
    ) -> Self {
        Self {
            protected_headers,
            unprotected_headers,
            payload,
            signatures,
        }
    }

    /// Decode an envelope from its CBOR encoding. See [`parse_cose_sign`].
    pub fn decode(input: &[u8]) -> Result<Self, CoseSignError> {
        parse_cose_sign(input)
    }

    /// Encode the untagged wire form.
    pub fn encode(&self) -> Result<Vec<u8>, CoseSignError> {
        let mut out = Vec::with_capacity(64 + self.payload.len() + 96 * self.signatures.len());
        self.encode_into(&mut out).map_err(CoseSignError::Encode)?;
        Ok(out)
    }

    /// Encode with the COSE_Sign tag (98) prefix.
    pub fn encode_tagged(&self) -> Result<Vec<u8>, CoseSignError> {
        let mut out = Vec::with_capacity(66 + self.payload.len() + 96 * self.signatures.len());
        Encoder::new(&mut out)
            .tag(Tag::new(COSE_SIGN_TAG))
            .map_err(|e| CoseSignError::Encode(e.to_string()))?;
        self.encode_into(&mut out).map_err(CoseSignError::Encode)?;
        Ok(out)
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), String> {
        {
            let mut enc = Encoder::new(&mut *out);
            enc.array(4).map_err(|e| e.to_string())?;
            enc.bytes(self.protected_headers.encoded_map_cbor())
                .map_err(|e| e.to_string())?;
        }
        encode_map_into(self.unprotected_headers.map(), out)?;
        {
            let mut enc = Encoder::new(&mut *out);
            enc.bytes(&self.payload).map_err(|e| e.to_string())?;
            enc.array(self.signatures.len() as u64)
                .map_err(|e| e.to_string())?;
        }
        for sig in &self.signatures {
            {
                let mut enc = Encoder::new(&mut *out);
                enc.array(3).map_err(|e| e.to_string())?;
                enc.bytes(sig.protected_headers.encoded_map_cbor())
                    .map_err(|e| e.to_string())?;
            }
            encode_map_into(sig.unprotected_headers.map(), out)?;
            Encoder::new(&mut *out)
                .bytes(&sig.signature)
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

/// Parse a COSE_Sign structure from its CBOR encoding.
///
/// This parser is deliberately strict:
/// - Rejects empty input.
/// - Accepts an optional COSE_Sign tag (98), but rejects any other tag.
/// - Requires array lengths of exactly 4 (envelope) and 3 (signer).
/// - Rejects indefinite-length arrays/maps.
/// - Rejects detached (`null`) payloads.
/// - Rejects trailing bytes.
///
/// Signer algorithms are not inspected; unsupported ones surface at verification.
pub fn parse_cose_sign(input: &[u8]) -> Result<CoseSign, CoseSignError> {
    parse_inner(input).map_err(CoseSignError::Decode)
}

fn parse_inner(input: &[u8]) -> Result<CoseSign, String> {
    if input.is_empty() {
        return Err("empty input".to_string());
    }

    let mut dec = Decoder::new(input);

    if matches!(dec.datatype().map_err(|e| e.to_string())?, Type::Tag) {
        let tag = dec.tag().map_err(|e| format!("failed to read CBOR tag: {e}"))?;
        if tag != Tag::new(COSE_SIGN_TAG) {
            return Err("unexpected CBOR tag (expected COSE_Sign tag 98 or no tag)".to_string());
        }
    }

    let len = dec
        .array()
        .map_err(|e| format!("top-level item is not an array: {e}"))?
        .ok_or_else(|| "indefinite-length arrays are not supported".to_string())?;

    if len != 4 {
        return Err("array length was not 4".to_string());
    }

    let (protected_headers, unprotected_headers) = decode_headers(&mut dec, "body")?;

    let payload = match dec.datatype().map_err(|e| e.to_string())? {
        Type::Bytes => dec
            .bytes()
            .map_err(|e| format!("failed to read payload (bstr): {e}"))?
            .to_vec(),
        Type::Null => return Err("detached payloads are not supported".to_string()),
        _ => return Err("failed to read payload (bstr)".to_string()),
    };

    let count = dec
        .array()
        .map_err(|e| format!("signatures item is not an array: {e}"))?
        .ok_or_else(|| "indefinite-length arrays are not supported".to_string())?;

    let mut signatures = Vec::with_capacity(count.min(16) as usize);
    for index in 0..count {
        let sig_len = dec
            .array()
            .map_err(|e| format!("signature {index} is not an array: {e}"))?
            .ok_or_else(|| "indefinite-length arrays are not supported".to_string())?;
        if sig_len != 3 {
            return Err(format!("signature {index} array length was not 3"));
        }

        let (protected, unprotected) = decode_headers(&mut dec, "signature")?;
        let signature = dec
            .bytes()
            .map_err(|e| format!("failed to read signature {index} (bstr): {e}"))?
            .to_vec();

        signatures.push(CoseSignature::new(protected, unprotected, signature));
    }

    if dec.position() != input.len() {
        return Err("trailing bytes after COSE_Sign".to_string());
    }

    Ok(CoseSign::new(protected_headers, unprotected_headers, payload, signatures))
}

fn decode_headers(dec: &mut Decoder<'_>, layer: &str) -> Result<(CoseHeaderMap, CoseHeaderMap), String> {
    // protected headers (bstr); the bytes are kept verbatim.
    let protected_bstr = dec
        .bytes()
        .map_err(|e| format!("failed to read {layer} protected headers (bstr): {e}"))?
        .to_vec();
    let protected = CoseHeaderMap::protected_from_encoded(protected_bstr).map_err(|e| match e {
        CoseSignError::Decode(m) => format!("failed to parse {layer} protected headers: {m}"),
        other => other.to_string(),
    })?;

    if !matches!(dec.datatype().map_err(|e| e.to_string())?, Type::Map | Type::MapIndef) {
        return Err(format!("{layer} unprotected headers are not a map"));
    }
    let unprotected_map = decode_header_map_from_decoder(dec)
        .map_err(|e| format!("failed to parse {layer} unprotected headers map: {e}"))?;

    Ok((protected, CoseHeaderMap::new_unprotected(unprotected_map)))
}

/// Encode the COSE Sig_structure bytes for one COSE_Sign signer.
pub fn encode_signature_sig_structure(
    body_protected: &[u8],
    sign_protected: &[u8],
    payload: &[u8],
) -> Result<Vec<u8>, CoseSignError> {
    let mut out = Vec::with_capacity(32 + body_protected.len() + sign_protected.len() + payload.len());
    {
        let mut enc = Encoder::new(&mut out);
        enc.array(5).map_err(encode_error)?;
        enc.str(SIG_STRUCTURE_CONTEXT_SIGNATURE).map_err(encode_error)?;
        enc.bytes(body_protected).map_err(encode_error)?;
        enc.bytes(sign_protected).map_err(encode_error)?;
        enc.bytes(&[]).map_err(encode_error)?; // external_aad empty bstr
        enc.bytes(payload).map_err(encode_error)?;
    }
    Ok(out)
}

fn encode_error(e: impl std::fmt::Display) -> CoseSignError {
    CoseSignError::Encode(e.to_string())
}
