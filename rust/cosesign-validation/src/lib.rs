// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

pub mod cose_sign_verifier;
pub mod key_resolver;
pub mod options;
pub mod signature_verifier;

pub use cose_sign_verifier::CoseSignVerifier;
pub use key_resolver::{KeyOrResolver, KeyResolver, KeySet, VerificationKeys};
pub use options::VerifyOptions;
pub use signature_verifier::DefaultSignatureVerifier;
