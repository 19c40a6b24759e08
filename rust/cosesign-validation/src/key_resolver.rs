// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Key resolution for COSE_Sign signers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use cosesign_abstractions::{BoxFuture, CoseSignError, VerificationKey};
use cosesign_common::CoseSignature;
use futures::FutureExt as _;

/// Maps a signer to its verification key.
///
/// `Ok(None)` means the resolver has no key for this signer; verification then
/// fails with `KeyNotFound`. `Err` is reserved for resolver failures.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, signer: &CoseSignature) -> Result<Option<VerificationKey>, CoseSignError>;

    fn resolve_async<'a>(
        &'a self,
        signer: &'a CoseSignature,
    ) -> BoxFuture<'a, Result<Option<VerificationKey>, CoseSignError>> {
        async move { self.resolve(signer) }.boxed()
    }
}

impl<F> KeyResolver for F
where
    F: Fn(&CoseSignature) -> Result<Option<VerificationKey>, CoseSignError> + Send + Sync,
{
    fn resolve(&self, signer: &CoseSignature) -> Result<Option<VerificationKey>, CoseSignError> {
        self(signer)
    }
}

/// Key input for a single signer.
#[derive(Clone, Copy)]
pub enum KeyOrResolver<'a> {
    Key(&'a VerificationKey),
    Resolver(&'a dyn KeyResolver),
}

impl<'a> From<&'a VerificationKey> for KeyOrResolver<'a> {
    fn from(value: &'a VerificationKey) -> Self {
        KeyOrResolver::Key(value)
    }
}

/// Key input for a whole envelope.
#[derive(Clone)]
pub enum VerificationKeys {
    /// One key per signer, matched by index. The length must equal the signer count.
    Positional(Vec<VerificationKey>),
    /// A resolver consulted once per signer.
    Resolver(Arc<dyn KeyResolver>),
}

impl VerificationKeys {
    pub fn resolver(resolver: impl KeyResolver + 'static) -> Self {
        VerificationKeys::Resolver(Arc::new(resolver))
    }
}

impl From<Vec<VerificationKey>> for VerificationKeys {
    fn from(value: Vec<VerificationKey>) -> Self {
        VerificationKeys::Positional(value)
    }
}

impl fmt::Debug for VerificationKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationKeys::Positional(keys) => f.debug_tuple("Positional").field(keys).finish(),
            VerificationKeys::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// Resolver that looks signers up by their `kid` header.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<Vec<u8>, VerificationKey>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kid: impl Into<Vec<u8>>, key: VerificationKey) -> Option<VerificationKey> {
        self.keys.insert(kid.into(), key)
    }

    pub fn with_key(mut self, kid: impl Into<Vec<u8>>, key: VerificationKey) -> Self {
        self.insert(kid, key);
        self
    }

    pub fn get(&self, kid: &[u8]) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyResolver for KeySet {
    fn resolve(&self, signer: &CoseSignature) -> Result<Option<VerificationKey>, CoseSignError> {
        Ok(signer.key_id().and_then(|kid| self.get(kid)).cloned())
    }
}
