// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE header map types.

use std::collections::BTreeMap;

/// Header label for the signature algorithm (`alg`).
pub const HEADER_LABEL_ALG: i64 = 1;

/// Header label for the key identifier (`kid`).
pub const HEADER_LABEL_KID: i64 = 4;

/// Header label for the X.509 certificate chain (`x5chain`, aka `x5c`).
pub const HEADER_LABEL_X5CHAIN: i64 = 33;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderKey {
    /// Integer label (the most common COSE header key form).
    Int(i64),
    /// Text label.
    Text(String),
    /// Any other label, kept as its encoded CBOR item.
    Raw(Vec<u8>),
}

impl From<i64> for HeaderKey {
    fn from(value: i64) -> Self {
        HeaderKey::Int(value)
    }
}

impl From<&str> for HeaderKey {
    fn from(value: &str) -> Self {
        HeaderKey::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Int(i64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<HeaderValue>),
    Map(HeaderMap),
    Bool(bool),
    Null,
    /// A CBOR item with no typed representation here (floats, tags, `undefined`,
    /// integers outside the `i64` range), kept as its encoded bytes.
    Raw(Vec<u8>),
}

impl HeaderValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HeaderValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[HeaderValue]> {
        match self {
            HeaderValue::Array(a) => Some(a.as_slice()),
            _ => None,
        }
    }
}

impl std::fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderValue::Int(i) => write!(f, "{i}"),
            HeaderValue::Bytes(b) => write!(f, "h'{}'", hex_string(b)),
            HeaderValue::Text(s) => write!(f, "\"{s}\""),
            HeaderValue::Array(a) => write!(f, "array({})", a.len()),
            HeaderValue::Map(m) => write!(f, "map({})", m.len()),
            HeaderValue::Bool(b) => write!(f, "{b}"),
            HeaderValue::Null => f.write_str("null"),
            HeaderValue::Raw(b) => write!(f, "cbor(h'{}')", hex_string(b)),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|x| format!("{x:02x}")).collect()
}

/// Decoded header parameters keyed by label.
///
/// Ordering here is only for lookups; wire ordering is decided by the encoder.
pub type HeaderMap = BTreeMap<HeaderKey, HeaderValue>;
