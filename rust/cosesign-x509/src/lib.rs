// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

pub mod trusted_roots;
pub mod x5c_header;
pub mod x5c_verifier;

pub use trusted_roots::decode_trusted_roots;
pub use x5c_header::extract_x5c_chain;
pub use x5c_verifier::{validate_x5c_chain, X509ChainVerifyOptions, X5cChainVerifier};
