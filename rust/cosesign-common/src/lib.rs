// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign data model and its canonical CBOR encoding.

pub mod cose_sign;
pub mod header_map;

pub use cosesign_abstractions::{CoseAlgorithm, CoseSignError, HeaderKey, HeaderMap, HeaderValue};

pub use cose_sign::{
    encode_signature_sig_structure, parse_cose_sign, CoseSign, CoseSignature, COSE_SIGN_TAG,
    SIG_STRUCTURE_CONTEXT_SIGNATURE,
};
pub use header_map::{encode_header_map, CoseHeaderMap, ProtectedHeader};
