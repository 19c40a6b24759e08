// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared fixtures for verification tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use cosesign_abstractions::VerificationKey;
use cosesign_common::{CoseHeaderMap, CoseSign, CoseSignature, HeaderKey, HeaderMap, HeaderValue};
use p256::ecdsa::SigningKey;
use p256::pkcs8::EncodePublicKey as _;
use signature::Signer as _;

pub fn new_p256_key() -> SigningKey {
    SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng)
}

pub fn p256_spki(sk: &SigningKey) -> VerificationKey {
    VerificationKey::new(sk.verifying_key().to_public_key_der().unwrap().as_bytes().to_vec())
}

/// `{ 1: alg, 4: kid }` (kid omitted when `None`).
pub fn headers(alg: i64, kid: Option<&[u8]>) -> HeaderMap {
    let mut m = BTreeMap::new();
    m.insert(HeaderKey::Int(1), HeaderValue::Int(alg));
    if let Some(kid) = kid {
        m.insert(HeaderKey::Int(4), HeaderValue::Bytes(kid.to_vec()));
    }
    m
}

pub fn body_protected() -> CoseHeaderMap {
    CoseHeaderMap::protected_from_map(BTreeMap::new()).unwrap()
}

/// Build a signer whose signature covers `payload` under [`body_protected`].
pub fn signer_with(
    protected: HeaderMap,
    unprotected: HeaderMap,
    payload: &[u8],
    sign: impl FnOnce(&[u8]) -> Vec<u8>,
) -> CoseSignature {
    let mut signer = CoseSignature::new(
        CoseHeaderMap::protected_from_map(protected).unwrap(),
        CoseHeaderMap::new_unprotected(unprotected),
        Vec::new(),
    );
    let tbs = signer
        .to_be_signed(Some(body_protected().encoded_map_cbor()), payload)
        .unwrap();
    signer.signature = sign(&tbs);
    signer
}

pub fn sign_p256(sk: &SigningKey, tbs: &[u8]) -> Vec<u8> {
    let sig: p256::ecdsa::Signature = sk.sign(tbs);
    sig.to_bytes().to_vec()
}

pub fn es256_signer(sk: &SigningKey, kid: Option<&[u8]>, payload: &[u8]) -> CoseSignature {
    signer_with(headers(-7, kid), BTreeMap::new(), payload, |tbs| sign_p256(sk, tbs))
}

pub fn envelope(payload: &[u8], signers: Vec<CoseSignature>) -> CoseSign {
    CoseSign::new(
        body_protected(),
        CoseHeaderMap::empty_unprotected(),
        payload.to_vec(),
        signers,
    )
}
