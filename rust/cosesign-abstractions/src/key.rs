// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Public key material handed to the signature primitive.
///
/// Accepted encodings depend on algorithm:
/// - ECDSA/RSA/EdDSA: DER SPKI or DER X.509 certificate.
/// - EdDSA: additionally the raw 32-byte Ed25519 public key.
/// - ML-DSA: raw encoded verifying key bytes OR DER SPKI/cert.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VerificationKey(Vec<u8>);

impl VerificationKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for VerificationKey {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for VerificationKey {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl AsRef<[u8]> for VerificationKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerificationKey({} bytes)", self.0.len())
    }
}
