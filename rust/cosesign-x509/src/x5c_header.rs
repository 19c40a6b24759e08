// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use cosesign_abstractions::{CoseSignError, HeaderValue, HEADER_LABEL_X5CHAIN};
use cosesign_common::CoseSignature;

/// Extracts a signer's `x5c` header (label 33) as DER certificate bytes, leaf first.
///
/// COSE (RFC 9360) allows `x5c` (aka `x5chain`) to be:
/// - a single CBOR bstr when only one certificate is present
/// - an array of CBOR bstr values when multiple certificates are present
///
/// The protected header wins when both maps carry the label.
pub fn extract_x5c_chain(signer: &CoseSignature) -> Result<Vec<Vec<u8>>, CoseSignError> {
    let value = signer
        .protected_headers
        .get(HEADER_LABEL_X5CHAIN)
        .or_else(|| signer.unprotected_headers.get(HEADER_LABEL_X5CHAIN))
        .ok_or_else(|| CoseSignError::chain("MISSING_X5C", "x5c header (label 33) not found"))?;

    let certs_der = match value {
        HeaderValue::Bytes(b) => vec![b.clone()],
        HeaderValue::Array(items) => {
            let mut certs_der = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    HeaderValue::Bytes(b) => certs_der.push(b.clone()),
                    _ => return Err(CoseSignError::chain("INVALID_X5C", "x5c must be a bstr or an array of bstr")),
                }
            }
            certs_der
        }
        _ => return Err(CoseSignError::chain("INVALID_X5C", "x5c must be a bstr or an array of bstr")),
    };

    match certs_der.first() {
        None => Err(CoseSignError::chain("MISSING_X5C", "x5c chain is empty")),
        Some(leaf) if leaf.is_empty() => Err(CoseSignError::chain(
            "MISSING_X5C",
            "x5c leaf certificate bytes were empty",
        )),
        Some(_) => Ok(certs_der),
    }
}
