// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Supported COSE algorithms (IANA COSE Algorithms registry).
///
/// Note: this enum includes provisional algorithm IDs used by this repo for ML-DSA.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum CoseAlgorithm {
    /// ECDSA w/ SHA-256 over P-256.
    ES256 = -7,
    /// ECDSA w/ SHA-384 over P-384.
    ES384 = -35,
    /// ECDSA w/ SHA-512 over P-521.
    ES512 = -36,
    /// EdDSA (Ed25519).
    EdDSA = -8,
    // Provisional COSE algorithm IDs used by this repo for ML-DSA (post-quantum).
    /// ML-DSA-44 (provisional COSE alg id used by this repo).
    MLDsa44 = -48,
    /// ML-DSA-65 (provisional COSE alg id used by this repo).
    MLDsa65 = -49,
    /// ML-DSA-87 (provisional COSE alg id used by this repo).
    MLDsa87 = -50,
    /// RSASSA-PSS w/ SHA-256.
    PS256 = -37,
    /// RSASSA-PSS w/ SHA-384.
    PS384 = -38,
    /// RSASSA-PSS w/ SHA-512.
    PS512 = -39,
    /// RSASSA-PKCS1v1.5 w/ SHA-256.
    RS256 = -257,
    /// RSASSA-PKCS1v1.5 w/ SHA-384.
    RS384 = -258,
    /// RSASSA-PKCS1v1.5 w/ SHA-512.
    RS512 = -259,
}

impl CoseAlgorithm {
    /// Map a COSE `alg` label to a known algorithm.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            -7 => Some(CoseAlgorithm::ES256),
            -35 => Some(CoseAlgorithm::ES384),
            -36 => Some(CoseAlgorithm::ES512),
            -8 => Some(CoseAlgorithm::EdDSA),
            -48 => Some(CoseAlgorithm::MLDsa44),
            -49 => Some(CoseAlgorithm::MLDsa65),
            -50 => Some(CoseAlgorithm::MLDsa87),
            -37 => Some(CoseAlgorithm::PS256),
            -38 => Some(CoseAlgorithm::PS384),
            -39 => Some(CoseAlgorithm::PS512),
            -257 => Some(CoseAlgorithm::RS256),
            -258 => Some(CoseAlgorithm::RS384),
            -259 => Some(CoseAlgorithm::RS512),
            _ => None,
        }
    }

    /// The COSE `alg` label.
    pub fn id(self) -> i64 {
        self as i64
    }

    /// The registered algorithm name, as handed to the signature primitive.
    pub fn name(self) -> &'static str {
        match self {
            CoseAlgorithm::ES256 => "ES256",
            CoseAlgorithm::ES384 => "ES384",
            CoseAlgorithm::ES512 => "ES512",
            CoseAlgorithm::EdDSA => "EdDSA",
            CoseAlgorithm::MLDsa44 => "ML-DSA-44",
            CoseAlgorithm::MLDsa65 => "ML-DSA-65",
            CoseAlgorithm::MLDsa87 => "ML-DSA-87",
            CoseAlgorithm::PS256 => "PS256",
            CoseAlgorithm::PS384 => "PS384",
            CoseAlgorithm::PS512 => "PS512",
            CoseAlgorithm::RS256 => "RS256",
            CoseAlgorithm::RS384 => "RS384",
            CoseAlgorithm::RS512 => "RS512",
        }
    }
}

impl std::fmt::Display for CoseAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
