// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Wire-level fixtures: COSE_Sign envelopes hand-built with `minicbor`.

#![allow(dead_code)]

use minicbor::Encoder;
use p256::ecdsa::SigningKey;
use p256::pkcs8::EncodePublicKey as _;
use signature::Signer as _;

pub struct TestSigner<'a> {
    pub protected: Vec<u8>,
    pub x5c: Option<&'a [u8]>,
    pub signature: Vec<u8>,
}

pub fn new_p256_key() -> SigningKey {
    SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng)
}

pub fn p256_spki(sk: &SigningKey) -> cosesign::VerificationKey {
    cosesign::VerificationKey::new(sk.verifying_key().to_public_key_der().unwrap().as_bytes().to_vec())
}

/// Protected header bytes `{ 4: kid, 1: alg }`, written in that (non-canonical) order.
pub fn encode_protected(alg: i64, kid: Option<&[u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut enc = Encoder::new(&mut out);
    enc.map(if kid.is_some() { 2 } else { 1 }).unwrap();
    if let Some(kid) = kid {
        enc.i64(4).unwrap();
        enc.bytes(kid).unwrap();
    }
    enc.i64(1).unwrap();
    enc.i64(alg).unwrap();
    out
}

pub fn sig_structure(body_protected: &[u8], sign_protected: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut enc = Encoder::new(&mut out);
    enc.array(5).unwrap();
    enc.str("Signature").unwrap();
    enc.bytes(body_protected).unwrap();
    enc.bytes(sign_protected).unwrap();
    enc.bytes(&[]).unwrap();
    enc.bytes(payload).unwrap();
    out
}

pub fn sign_es256(sk: &SigningKey, body_protected: &[u8], sign_protected: &[u8], payload: &[u8]) -> Vec<u8> {
    let sig: p256::ecdsa::Signature = sk.sign(&sig_structure(body_protected, sign_protected, payload));
    sig.to_bytes().to_vec()
}

pub fn encode_cose_sign(tagged: bool, body_protected: &[u8], payload: &[u8], signers: &[TestSigner<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut enc = Encoder::new(&mut out);
    if tagged {
        enc.tag(minicbor::data::Tag::new(98)).unwrap();
    }
    enc.array(4).unwrap();
    enc.bytes(body_protected).unwrap();
    enc.map(0).unwrap();
    enc.bytes(payload).unwrap();
    enc.array(signers.len() as u64).unwrap();
    for s in signers {
        enc.array(3).unwrap();
        enc.bytes(&s.protected).unwrap();
        match s.x5c {
            Some(leaf) => {
                enc.map(1).unwrap();
                enc.i64(33).unwrap();
                enc.bytes(leaf).unwrap();
            }
            None => {
                enc.map(0).unwrap();
            }
        }
        enc.bytes(&s.signature).unwrap();
    }
    out
}

/// A tagged envelope over `payload` signed by each key in order with ES256.
pub fn es256_envelope(payload: &[u8], keys: &[&SigningKey]) -> Vec<u8> {
    let body = [0xa0];
    let signers: Vec<TestSigner<'_>> = keys
        .iter()
        .map(|sk| {
            let protected = encode_protected(-7, None);
            let signature = sign_es256(sk, &body, &protected, payload);
            TestSigner { protected, x5c: None, signature }
        })
        .collect();
    encode_cose_sign(true, &body, payload, &signers)
}
