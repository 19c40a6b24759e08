// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Decoding of caller-supplied trusted root certificates.
//!
//! Each entry is either PEM text (one or more `CERTIFICATE` blocks) or the
//! bare base64 encoding of a DER certificate.

use base64::Engine as _;
use cosesign_abstractions::CoseSignError;
use x509_parser::pem::parse_x509_pem;

const PEM_BEGIN: &str = "-----BEGIN";

/// Decode trusted roots into DER certificates.
///
/// Fails with `CERT_CHAIN_TRUST_ANCHOR_ERROR` if any entry cannot be decoded.
pub fn decode_trusted_roots(trusted_roots: &[String]) -> Result<Vec<Vec<u8>>, CoseSignError> {
    let mut out = Vec::with_capacity(trusted_roots.len());
    for (index, root) in trusted_roots.iter().enumerate() {
        if root.contains(PEM_BEGIN) {
            let before = out.len();
            let mut rest = root.as_bytes();
            while contains_pem_header(rest) {
                let (next, pem) = parse_x509_pem(rest).map_err(|e| trust_anchor_error(index, e))?;
                if pem.label == "CERTIFICATE" {
                    out.push(pem.contents);
                }
                rest = next;
            }
            if out.len() == before {
                return Err(trust_anchor_error(index, "no CERTIFICATE block found"));
            }
        } else {
            let compact: String = root.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            let der = base64::engine::general_purpose::STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| trust_anchor_error(index, e))?;
            if der.is_empty() {
                return Err(trust_anchor_error(index, "empty certificate"));
            }
            out.push(der);
        }
    }
    Ok(out)
}

fn contains_pem_header(bytes: &[u8]) -> bool {
    bytes.windows(PEM_BEGIN.len()).any(|w| w == PEM_BEGIN.as_bytes())
}

fn trust_anchor_error(index: usize, e: impl std::fmt::Display) -> CoseSignError {
    CoseSignError::chain(
        "CERT_CHAIN_TRUST_ANCHOR_ERROR",
        format!("failed to decode trusted root {index}: {e}"),
    )
}
