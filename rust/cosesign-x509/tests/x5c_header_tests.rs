// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tests for reading a signer's `x5c` header.

use std::collections::BTreeMap;

use cosesign_abstractions::{HeaderKey, HeaderMap, HeaderValue};
use cosesign_common::{CoseHeaderMap, CoseSignature};
use cosesign_x509::extract_x5c_chain;

fn x5c_map(value: HeaderValue) -> HeaderMap {
    let mut m = BTreeMap::new();
    m.insert(HeaderKey::Int(33), value);
    m
}

fn signer(protected: HeaderMap, unprotected: HeaderMap) -> CoseSignature {
    CoseSignature::new(
        CoseHeaderMap::protected_from_map(protected).unwrap(),
        CoseHeaderMap::new_unprotected(unprotected),
        vec![],
    )
}

#[test]
fn single_bstr_is_a_one_element_chain() {
    let s = signer(x5c_map(HeaderValue::Bytes(vec![0x30, 0x01])), BTreeMap::new());
    assert_eq!(extract_x5c_chain(&s).unwrap(), vec![vec![0x30, 0x01]]);
}

#[test]
fn array_keeps_leaf_first_order() {
    let chain = HeaderValue::Array(vec![HeaderValue::Bytes(vec![1]), HeaderValue::Bytes(vec![2])]);
    let s = signer(BTreeMap::new(), x5c_map(chain));
    assert_eq!(extract_x5c_chain(&s).unwrap(), vec![vec![1], vec![2]]);
}

#[test]
fn protected_header_wins_over_unprotected() {
    let s = signer(
        x5c_map(HeaderValue::Bytes(vec![0xaa])),
        x5c_map(HeaderValue::Bytes(vec![0xbb])),
    );
    assert_eq!(extract_x5c_chain(&s).unwrap(), vec![vec![0xaa]]);
}

#[test]
fn absent_or_empty_chain_is_missing() {
    let absent = signer(BTreeMap::new(), BTreeMap::new());
    assert_eq!(extract_x5c_chain(&absent).unwrap_err().chain_code(), Some("MISSING_X5C"));

    let empty_array = signer(x5c_map(HeaderValue::Array(vec![])), BTreeMap::new());
    assert_eq!(extract_x5c_chain(&empty_array).unwrap_err().chain_code(), Some("MISSING_X5C"));

    let empty_leaf = signer(x5c_map(HeaderValue::Bytes(vec![])), BTreeMap::new());
    assert_eq!(extract_x5c_chain(&empty_leaf).unwrap_err().chain_code(), Some("MISSING_X5C"));
}

#[test]
fn non_bstr_entries_are_invalid() {
    let wrong_type = signer(x5c_map(HeaderValue::Int(1)), BTreeMap::new());
    assert_eq!(extract_x5c_chain(&wrong_type).unwrap_err().chain_code(), Some("INVALID_X5C"));

    let mixed = HeaderValue::Array(vec![HeaderValue::Bytes(vec![1]), HeaderValue::Text("x".into())]);
    let mixed = signer(x5c_map(mixed), BTreeMap::new());
    assert_eq!(extract_x5c_chain(&mixed).unwrap_err().chain_code(), Some("INVALID_X5C"));
}
