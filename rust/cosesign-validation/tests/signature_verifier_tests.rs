// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tests for the default signature primitive across algorithms and key encodings.

use cosesign_abstractions::{CoseAlgorithm, CoseSignError, SignatureVerifier, VerificationKey};
use cosesign_validation::DefaultSignatureVerifier;
use ml_dsa::{KeyGen, MlDsa44, MlDsa87};
use p256::pkcs8::DecodePrivateKey as _;
use p256::pkcs8::EncodePublicKey as _;
use signature::SignatureEncoding as _;
use signature::Signer;

const MSG: &[u8] = b"to be signed";

fn verify(alg: CoseAlgorithm, key: &[u8], sig: &[u8], msg: &[u8]) -> Result<bool, CoseSignError> {
    DefaultSignatureVerifier.verify(alg, &VerificationKey::new(key.to_vec()), sig, msg)
}

#[test]
fn es256_accepts_spki_and_certificate_keys() {
    let certified = rcgen::generate_simple_self_signed(["example.test".to_string()]).unwrap();
    let sk = p256::ecdsa::SigningKey::from_pkcs8_der(&certified.key_pair.serialize_der()).unwrap();
    let spki = sk.verifying_key().to_public_key_der().unwrap().to_vec();

    let sig: p256::ecdsa::Signature = sk.sign(MSG);
    let sig = sig.to_bytes().to_vec();

    assert!(verify(CoseAlgorithm::ES256, &spki, &sig, MSG).unwrap());
    assert!(verify(CoseAlgorithm::ES256, certified.cert.der(), &sig, MSG).unwrap());
}

#[test]
fn es256_mismatches_are_false_not_errors() {
    let sk = p256::ecdsa::SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng);
    let other = p256::ecdsa::SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng);
    let spki = sk.verifying_key().to_public_key_der().unwrap().to_vec();
    let other_spki = other.verifying_key().to_public_key_der().unwrap().to_vec();

    let sig: p256::ecdsa::Signature = sk.sign(MSG);
    let sig = sig.to_bytes().to_vec();

    assert!(!verify(CoseAlgorithm::ES256, &other_spki, &sig, MSG).unwrap());
    assert!(!verify(CoseAlgorithm::ES256, &spki, &sig, b"other message").unwrap());

    let mut flipped = sig.clone();
    flipped[10] ^= 0x01;
    assert!(!verify(CoseAlgorithm::ES256, &spki, &flipped, MSG).unwrap());

    // Wrong length is a malformed signature, still a mismatch.
    assert!(!verify(CoseAlgorithm::ES256, &spki, &sig[..63], MSG).unwrap());
    assert!(!verify(CoseAlgorithm::ES256, &spki, &[], MSG).unwrap());
}

#[test]
fn undecodable_key_is_an_error() {
    let err = verify(CoseAlgorithm::ES256, &[1, 2, 3], &[0u8; 64], MSG).unwrap_err();
    assert!(matches!(err, CoseSignError::InvalidKey(_)));
    assert!(err.to_string().contains("P-256"));

    // A P-256 key handed to ES384.
    let sk = p256::ecdsa::SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng);
    let spki = sk.verifying_key().to_public_key_der().unwrap().to_vec();
    let err = verify(CoseAlgorithm::ES384, &spki, &[0u8; 96], MSG).unwrap_err();
    assert!(matches!(err, CoseSignError::InvalidKey(_)));

    let err = verify(CoseAlgorithm::RS256, &spki, &[0u8; 256], MSG).unwrap_err();
    assert!(matches!(err, CoseSignError::InvalidKey(_)));
}

#[test]
fn es384_and_es512_succeed() {
    #[allow(unused_imports)]
    use p521::elliptic_curve::sec1::ToEncodedPoint as _;

    let mut rng = p384::elliptic_curve::rand_core::OsRng;
    let sk = p384::ecdsa::SigningKey::random(&mut rng);
    let spki = sk.verifying_key().to_public_key_der().unwrap().to_vec();
    let sig: p384::ecdsa::Signature = sk.sign(MSG);
    assert!(verify(CoseAlgorithm::ES384, &spki, &sig.to_bytes(), MSG).unwrap());

    let mut rng = p521::elliptic_curve::rand_core::OsRng;
    let sk = p521::ecdsa::SigningKey::random(&mut rng);
    let vk = p521::ecdsa::VerifyingKey::from(&sk);
    let pk = p521::PublicKey::from_sec1_bytes(vk.to_encoded_point(false).as_bytes()).unwrap();
    let spki = pk.to_public_key_der().unwrap().to_vec();
    let sig: p521::ecdsa::Signature = sk.sign(MSG);
    assert!(verify(CoseAlgorithm::ES512, &spki, &sig.to_bytes(), MSG).unwrap());
    assert!(!verify(CoseAlgorithm::ES512, &spki, &sig.to_bytes(), b"tampered").unwrap());
}

#[test]
fn eddsa_accepts_raw_and_spki_keys() {
    use ed25519_dalek::pkcs8::EncodePublicKey as _;

    let sk = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
    let raw = sk.verifying_key().to_bytes();
    let spki = sk.verifying_key().to_public_key_der().unwrap().to_vec();
    let sig = sk.sign(MSG).to_bytes();

    assert!(verify(CoseAlgorithm::EdDSA, &raw, &sig, MSG).unwrap());
    assert!(verify(CoseAlgorithm::EdDSA, &spki, &sig, MSG).unwrap());
    assert!(!verify(CoseAlgorithm::EdDSA, &raw, &sig, b"tampered").unwrap());
    assert!(!verify(CoseAlgorithm::EdDSA, &raw, &sig[..32], MSG).unwrap());

    let err = verify(CoseAlgorithm::EdDSA, &[0u8; 7], &sig, MSG).unwrap_err();
    assert!(matches!(err, CoseSignError::InvalidKey(_)));
}

#[test]
fn rsa_pkcs1_and_pss_succeed() {
    use rsa::pkcs1v15;
    use rsa::pkcs8::EncodePublicKey;
    use rsa::pss;
    use signature::RandomizedSigner;

    let mut rng = rsa::rand_core::OsRng;
    let private_key = rsa::RsaPrivateKey::new(&mut rng, 2048).unwrap();
    let public_key_der = private_key.to_public_key().to_public_key_der().unwrap().to_vec();

    let rs256: pkcs1v15::Signature = pkcs1v15::SigningKey::<sha2::Sha256>::new(private_key.clone()).sign(MSG);
    assert!(verify(CoseAlgorithm::RS256, &public_key_der, &rs256.to_bytes(), MSG).unwrap());
    // Same key, different digest.
    assert!(!verify(CoseAlgorithm::RS384, &public_key_der, &rs256.to_bytes(), MSG).unwrap());

    let rs512: pkcs1v15::Signature = pkcs1v15::SigningKey::<sha2::Sha512>::new(private_key.clone()).sign(MSG);
    assert!(verify(CoseAlgorithm::RS512, &public_key_der, &rs512.to_bytes(), MSG).unwrap());

    let ps256: pss::Signature =
        pss::SigningKey::<sha2::Sha256>::new(private_key.clone()).sign_with_rng(&mut rng, MSG);
    assert!(verify(CoseAlgorithm::PS256, &public_key_der, &ps256.to_bytes(), MSG).unwrap());

    let ps384: pss::Signature = pss::SigningKey::<sha2::Sha384>::new(private_key).sign_with_rng(&mut rng, MSG);
    assert!(verify(CoseAlgorithm::PS384, &public_key_der, &ps384.to_bytes(), MSG).unwrap());
    assert!(!verify(CoseAlgorithm::PS384, &public_key_der, &ps384.to_bytes(), b"tampered").unwrap());
}

#[test]
fn ml_dsa_accepts_raw_encoded_keys() {
    let kp = MlDsa44::key_gen_internal(&Default::default());
    let sig: ml_dsa::Signature<MlDsa44> = kp.signing_key().sign(MSG);
    let sig = sig.encode().as_slice().to_vec();
    let vk = kp.verifying_key().encode().as_slice().to_vec();

    assert!(verify(CoseAlgorithm::MLDsa44, &vk, &sig, MSG).unwrap());
    assert!(!verify(CoseAlgorithm::MLDsa44, &vk, &sig, b"tampered").unwrap());
    assert!(!verify(CoseAlgorithm::MLDsa44, &vk, &sig[..10], MSG).unwrap());
}

#[test]
fn ml_dsa_rejects_key_of_wrong_size_or_oid() {
    let kp = MlDsa87::key_gen_internal(&Default::default());
    let sig: ml_dsa::Signature<MlDsa87> = kp.signing_key().sign(MSG);
    let sig = sig.encode().as_slice().to_vec();

    let err = verify(CoseAlgorithm::MLDsa87, &[0u8; 12], &sig, MSG).unwrap_err();
    assert!(matches!(err, CoseSignError::InvalidKey(_)));

    // Any non-ML-DSA certificate is rejected via OID mismatch.
    let certified = rcgen::generate_simple_self_signed(["example.test".to_string()]).unwrap();
    let err = verify(CoseAlgorithm::MLDsa87, certified.cert.der(), &sig, MSG).unwrap_err();
    assert!(err.to_string().contains("unexpected public key algorithm OID"));
}

#[test]
fn async_default_matches_sync() {
    let sk = p256::ecdsa::SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng);
    let key = VerificationKey::new(sk.verifying_key().to_public_key_der().unwrap().to_vec());
    let sig: p256::ecdsa::Signature = sk.sign(MSG);
    let sig = sig.to_bytes().to_vec();

    let verifier = DefaultSignatureVerifier::new();
    let ok = futures::executor::block_on(verifier.verify_async(CoseAlgorithm::ES256, &key, &sig, MSG)).unwrap();
    assert!(ok);
}
