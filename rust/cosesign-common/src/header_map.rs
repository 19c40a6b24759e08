// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE header maps and their canonical CBOR form.
//!
//! COSE header parameters live in two header maps:
//! - Protected headers: encoded as a CBOR bstr containing a CBOR map
//! - Unprotected headers: encoded as an inline CBOR map
//!
//! Protected bytes received from the wire are kept verbatim: they are exactly
//! what the signer covered. Maps built locally are encoded once, using the
//! core deterministic encoding of RFC 8949 §4.2.1:
//! - definite lengths and shortest-form heads
//! - map entries ordered by the bytewise order of their encoded keys

use std::collections::BTreeMap;

use cosesign_abstractions::{CoseSignError, HeaderKey, HeaderMap, HeaderValue};
use minicbor::data::Type;
use minicbor::{Decoder, Encoder};

/// Protected header input: bytes as produced by a signer, or a map to encode.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtectedHeader {
    Encoded(Vec<u8>),
    Map(HeaderMap),
}

impl From<Vec<u8>> for ProtectedHeader {
    fn from(value: Vec<u8>) -> Self {
        ProtectedHeader::Encoded(value)
    }
}

impl From<HeaderMap> for ProtectedHeader {
    fn from(value: HeaderMap) -> Self {
        ProtectedHeader::Map(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoseHeaderMap {
    /// Protected: the bstr content covered by signatures. Unprotected: empty.
    encoded_map_cbor: Vec<u8>,

    /// Decoded map used for lookups.
    map: HeaderMap,
}

impl CoseHeaderMap {
    /// Build a protected header from either of its input forms.
    pub fn protected(header: impl Into<ProtectedHeader>) -> Result<Self, CoseSignError> {
        match header.into() {
            ProtectedHeader::Encoded(bytes) => Self::protected_from_encoded(bytes),
            ProtectedHeader::Map(map) => Self::protected_from_map(map),
        }
    }

    /// Keep signer-produced protected bytes verbatim, decoding them for lookups.
    ///
    /// A zero-length bstr is the COSE encoding of an empty protected map.
    pub fn protected_from_encoded(encoded_map_cbor: Vec<u8>) -> Result<Self, CoseSignError> {
        let map = decode_header_map_from_cbor(&encoded_map_cbor).map_err(CoseSignError::Decode)?;
        Ok(Self { encoded_map_cbor, map })
    }

    /// Canonically encode a locally built protected map.
    ///
    /// An empty map encodes to `0xa0`.
    pub fn protected_from_map(map: HeaderMap) -> Result<Self, CoseSignError> {
        let encoded_map_cbor = encode_header_map(&map)?;
        Ok(Self { encoded_map_cbor, map })
    }

    /// Construct an unprotected header map.
    ///
    /// Unprotected headers are not part of any to-be-signed structure, so
    /// `encoded_map_cbor` is empty.
    pub fn new_unprotected(map: HeaderMap) -> Self {
        Self {
            encoded_map_cbor: Vec::new(),
            map,
        }
    }

    pub fn empty_unprotected() -> Self {
        Self::new_unprotected(BTreeMap::new())
    }

    pub fn encoded_map_cbor(&self) -> &[u8] {
        &self.encoded_map_cbor
    }

    pub fn get(&self, key: i64) -> Option<&HeaderValue> {
        self.map.get(&HeaderKey::Int(key))
    }

    pub fn get_i64(&self, key: i64) -> Option<i64> {
        self.get(key).and_then(HeaderValue::as_i64)
    }

    pub fn get_bytes(&self, key: i64) -> Option<&[u8]> {
        self.get(key).and_then(HeaderValue::as_bytes)
    }

    pub fn get_array(&self, key: i64) -> Option<&[HeaderValue]> {
        self.get(key).and_then(HeaderValue::as_array)
    }

    pub fn map(&self) -> &HeaderMap {
        &self.map
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Canonically encode a header map.
pub fn encode_header_map(map: &HeaderMap) -> Result<Vec<u8>, CoseSignError> {
    let mut out = Vec::new();
    encode_map_into(map, &mut out).map_err(CoseSignError::Encode)?;
    Ok(out)
}

pub(crate) fn encode_map_into(map: &HeaderMap, out: &mut Vec<u8>) -> Result<(), String> {
    // Sort on encoded key bytes; BTreeMap order puts -1 before 1, CBOR puts 0x01 before 0x20.
    let mut entries = Vec::with_capacity(map.len());
    for (k, v) in map {
        let mut key = Vec::new();
        encode_key_into(k, &mut key)?;
        let mut value = Vec::new();
        encode_value_into(v, &mut value)?;
        entries.push((key, value));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    Encoder::new(&mut *out)
        .map(entries.len() as u64)
        .map_err(|e| e.to_string())?;
    for (key, value) in entries {
        out.extend_from_slice(&key);
        out.extend_from_slice(&value);
    }
    Ok(())
}

fn encode_key_into(key: &HeaderKey, out: &mut Vec<u8>) -> Result<(), String> {
    if let HeaderKey::Raw(item) = key {
        out.extend_from_slice(item);
        return Ok(());
    }

    let mut enc = Encoder::new(out);
    match key {
        HeaderKey::Int(i) => enc.i64(*i),
        HeaderKey::Text(s) => enc.str(s),
        HeaderKey::Raw(_) => return Ok(()),
    }
    .map_err(|e| e.to_string())?;
    Ok(())
}

fn encode_value_into(value: &HeaderValue, out: &mut Vec<u8>) -> Result<(), String> {
    match value {
        HeaderValue::Map(m) => return encode_map_into(m, out),
        HeaderValue::Array(items) => {
            Encoder::new(&mut *out)
                .array(items.len() as u64)
                .map_err(|e| e.to_string())?;
            for item in items {
                encode_value_into(item, out)?;
            }
            return Ok(());
        }
        HeaderValue::Raw(item) => {
            out.extend_from_slice(item);
            return Ok(());
        }
        _ => {}
    }

    let mut enc = Encoder::new(out);
    match value {
        HeaderValue::Int(i) => enc.i64(*i),
        HeaderValue::Bytes(b) => enc.bytes(b),
        HeaderValue::Text(s) => enc.str(s),
        HeaderValue::Bool(b) => enc.bool(*b),
        HeaderValue::Null => enc.null(),
        HeaderValue::Map(_) | HeaderValue::Array(_) | HeaderValue::Raw(_) => return Ok(()),
    }
    .map_err(|e| e.to_string())?;
    Ok(())
}

/// Maximum nesting of arrays and maps inside a header map.
pub const MAX_HEADER_NESTING_DEPTH: usize = 32;

/// Decode a header map from the CBOR bytes contained within a protected header bstr.
pub(crate) fn decode_header_map_from_cbor(bytes: &[u8]) -> Result<HeaderMap, String> {
    // Empty bstr means empty map for protected headers.
    if bytes.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut dec = Decoder::new(bytes);
    if !matches!(dec.datatype().map_err(|e| e.to_string())?, Type::Map | Type::MapIndef) {
        return Err("protected headers are not a map".to_string());
    }
    let map = decode_header_map_from_decoder(&mut dec)?;

    if dec.position() != bytes.len() {
        return Err("trailing bytes after header map".to_string());
    }

    Ok(map)
}

/// Decode a header map directly from a CBOR decoder.
///
/// This is used for unprotected headers, which appear inline.
pub(crate) fn decode_header_map_from_decoder(dec: &mut Decoder<'_>) -> Result<HeaderMap, String> {
    decode_map_at_depth(dec, 0)
}

fn decode_map_at_depth(dec: &mut Decoder<'_>, depth: usize) -> Result<HeaderMap, String> {
    let len = dec
        .map()
        .map_err(|e| format!("failed to read map: {e}"))?
        .ok_or_else(|| "indefinite-length maps are not supported".to_string())?;

    let mut map = BTreeMap::new();
    for _ in 0..len {
        let key = decode_header_key(dec)?;
        let value = decode_header_value(dec, depth + 1)?;
        if map.contains_key(&key) {
            return Err(format!("duplicate header label: {key:?}"));
        }
        map.insert(key, value);
    }

    Ok(map)
}

fn is_int(ty: Type) -> bool {
    matches!(
        ty,
        Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int | Type::U8 | Type::U16 | Type::U32 | Type::U64
    )
}

/// Copy the next item out of `dec` as its encoded bytes.
fn decode_raw_item(dec: &mut Decoder<'_>) -> Result<Vec<u8>, String> {
    let start = dec.position();
    dec.skip().map_err(|e| format!("failed to skip header item: {e}"))?;
    Ok(dec.input()[start..dec.position()].to_vec())
}

/// Decode an integer, or keep it raw when it does not fit `i64`.
fn decode_int_or_raw(dec: &mut Decoder<'_>) -> Result<Result<i64, Vec<u8>>, String> {
    let start = dec.position();
    match dec.i64() {
        Ok(i) => Ok(Ok(i)),
        Err(_) => {
            dec.set_position(start);
            decode_raw_item(dec).map(Err)
        }
    }
}

/// Decode a COSE header map key.
///
/// COSE keys are most often small integers, but may also be text. Anything
/// else is kept raw so the map still decodes.
fn decode_header_key(dec: &mut Decoder<'_>) -> Result<HeaderKey, String> {
    let ty = dec.datatype().map_err(|e| e.to_string())?;
    if is_int(ty) {
        return Ok(match decode_int_or_raw(dec)? {
            Ok(i) => HeaderKey::Int(i),
            Err(raw) => HeaderKey::Raw(raw),
        });
    }
    match ty {
        Type::String => {
            let s = dec
                .str()
                .map_err(|e| format!("failed to decode text header key: {e}"))?;
            Ok(HeaderKey::Text(s.to_string()))
        }
        Type::Array | Type::Map | Type::Tag => Err(format!("unsupported header key type: {ty:?}")),
        other => reject_indefinite(other)
            .and_then(|()| decode_raw_item(dec))
            .map(HeaderKey::Raw),
    }
}

/// Decode a COSE header map value.
///
/// Values without a typed representation are kept raw rather than failing the
/// whole map: header semantics (such as an unusable `alg`) are judged later.
fn decode_header_value(dec: &mut Decoder<'_>, depth: usize) -> Result<HeaderValue, String> {
    let ty = dec.datatype().map_err(|e| e.to_string())?;
    if is_int(ty) {
        return Ok(match decode_int_or_raw(dec)? {
            Ok(i) => HeaderValue::Int(i),
            Err(raw) => HeaderValue::Raw(raw),
        });
    }
    match ty {
        Type::Null => {
            dec.null().map_err(|e| e.to_string())?;
            Ok(HeaderValue::Null)
        }
        Type::Bool => {
            let b = dec.bool().map_err(|e| e.to_string())?;
            Ok(HeaderValue::Bool(b))
        }
        Type::Bytes => {
            let b = dec.bytes().map_err(|e| e.to_string())?;
            Ok(HeaderValue::Bytes(b.to_vec()))
        }
        Type::String => {
            let s = dec.str().map_err(|e| e.to_string())?;
            Ok(HeaderValue::Text(s.to_string()))
        }
        Type::Array => {
            check_depth(depth)?;
            let len = dec
                .array()
                .map_err(|e| format!("failed to read array: {e}"))?
                .ok_or_else(|| "indefinite-length arrays are not supported".to_string())?;
            let mut out = Vec::with_capacity(len.min(64) as usize);
            for _ in 0..len {
                out.push(decode_header_value(dec, depth + 1)?);
            }
            Ok(HeaderValue::Array(out))
        }
        Type::Map => {
            check_depth(depth)?;
            let nested = decode_map_at_depth(dec, depth)?;
            Ok(HeaderValue::Map(nested))
        }
        // Tags may wrap arbitrarily nested content, which `skip` would walk.
        Type::Tag => {
            check_depth(depth)?;
            let start = dec.position();
            dec.tag().map_err(|e| e.to_string())?;
            decode_header_value(dec, depth + 1)?;
            Ok(HeaderValue::Raw(dec.input()[start..dec.position()].to_vec()))
        }
        other => reject_indefinite(other)
            .and_then(|()| decode_raw_item(dec))
            .map(HeaderValue::Raw),
    }
}

fn check_depth(depth: usize) -> Result<(), String> {
    if depth >= MAX_HEADER_NESTING_DEPTH {
        return Err(format!("header nesting exceeds {MAX_HEADER_NESTING_DEPTH} levels"));
    }
    Ok(())
}

fn reject_indefinite(ty: Type) -> Result<(), String> {
    match ty {
        Type::ArrayIndef => Err("indefinite-length arrays are not supported".to_string()),
        Type::MapIndef => Err("indefinite-length maps are not supported".to_string()),
        Type::BytesIndef | Type::StringIndef => Err("indefinite-length strings are not supported".to_string()),
        Type::Break | Type::Unknown(_) => Err(format!("unsupported header item type: {ty:?}")),
        _ => Ok(()),
    }
}
