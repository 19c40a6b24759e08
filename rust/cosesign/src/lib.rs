// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! High-level COSE_Sign verification facade.
//!
//! This crate is the primary Rust entry point for verifying COSE_Sign
//! (multi-signer) envelopes. Parsing, encoding and verification APIs are
//! exposed directly at the crate root.

mod api;

pub use cosesign_abstractions::{
    BoxFuture, CoseAlgorithm, CoseSignError, HeaderKey, HeaderMap, HeaderValue, SignatureVerifier,
    VerificationKey, X509ChainVerifier, HEADER_LABEL_ALG, HEADER_LABEL_KID, HEADER_LABEL_X5CHAIN,
};
pub use cosesign_common::{
    encode_header_map, encode_signature_sig_structure, CoseHeaderMap, CoseSign, CoseSignature, ProtectedHeader,
    COSE_SIGN_TAG,
};
pub use cosesign_validation::{
    CoseSignVerifier, DefaultSignatureVerifier, KeyOrResolver, KeyResolver, KeySet, VerificationKeys, VerifyOptions,
};
pub use cosesign_x509::{extract_x5c_chain, X509ChainVerifyOptions, X5cChainVerifier};

pub use api::{parse_cose_sign, verify_cose_sign, verify_cose_sign_x509, verify_sig_structure};
