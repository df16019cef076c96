//! # Key Handler Registry
//!
//! Converting a JWK into a usable key pair is algorithm-specific and left to
//! the caller. Handlers are registered by algorithm (`alg`) or curve (`crv`)
//! and looked up for each key: `alg` first, then `crv`.
//!
//! Registering a known algorithm also binds the curves it implies, unless a
//! curve already has a handler of its own.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::VerificationMethod;
use crate::error::{tracerr, Error};
use crate::jwk::Jwk;

/// Curves implied by an algorithm.
const CURVE_ALIASES: [(&str, &[&str]); 5] = [
    ("EdDSA", &["Ed25519"]),
    ("ES256", &["P-256"]),
    ("ES256K", &["P-256K", "secp256k1"]),
    ("ES384", &["P-384"]),
    ("ES521", &["P-521"]),
];

/// A key pair produced by a [`KeyHandler`].
///
/// The crate only reads the key pair's ID and type, and only to log them.
pub trait KeyPair: Send + Sync {
    /// The key pair's ID, typically the verification method ID.
    fn id(&self) -> &str;

    /// The key pair's type, typically a verification suite name.
    fn key_type(&self) -> &str;
}

/// A JSON key pair object with `id` and `type` members.
impl KeyPair for Value {
    fn id(&self) -> &str {
        self.get("id").and_then(Self::as_str).unwrap_or_default()
    }

    fn key_type(&self) -> &str {
        self.get("type").and_then(Self::as_str).unwrap_or_default()
    }
}

/// Converts a verification method into a key pair.
///
/// Implemented for any `Fn(VerificationMethod) -> impl Future<Output =
/// anyhow::Result<K>>`, so async closures and functions can be registered
/// directly.
#[async_trait]
pub trait KeyHandler<K>: Send + Sync {
    /// Create a key pair from the method's public key.
    ///
    /// # Errors
    ///
    /// Any error is returned to the caller unchanged.
    async fn convert(&self, method: &VerificationMethod) -> anyhow::Result<K>;
}

#[async_trait]
impl<K, F, Fut> KeyHandler<K> for F
where
    K: Send + 'static,
    F: Fn(VerificationMethod) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<K>> + Send + 'static,
{
    async fn convert(&self, method: &VerificationMethod) -> anyhow::Result<K> {
        self(method.clone()).await
    }
}

/// Key handlers indexed by algorithm or curve.
pub struct Registry<K> {
    handlers: BTreeMap<String, Arc<dyn KeyHandler<K>>>,
}

impl<K> Default for Registry<K> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<K> fmt::Debug for Registry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("keys", &self.handlers.keys().collect::<Vec<_>>()).finish()
    }
}

impl<K> Registry<K> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to an algorithm (e.g. `EdDSA`) or curve (e.g.
    /// `Ed25519`).
    ///
    /// Replaces any handler already bound to `key`. When `key` is an algorithm
    /// with known curves, each curve without a handler is bound as well.
    ///
    /// # Errors
    ///
    /// Will fail with [`Error::InvalidArgument`] if `key` is empty.
    pub fn register(
        &mut self, key: impl Into<String>, handler: impl KeyHandler<K> + 'static,
    ) -> crate::Result<()> {
        let key = key.into();
        if key.is_empty() {
            tracerr!(Error::InvalidArgument, "handler key must be a non-empty algorithm or curve");
        }

        let handler: Arc<dyn KeyHandler<K>> = Arc::new(handler);
        let curves = CURVE_ALIASES.iter().find(|(alg, _)| *alg == key).map_or(&[][..], |(_, c)| *c);
        for curve in curves {
            if !self.handlers.contains_key(*curve) {
                tracing::debug!("binding curve {curve} to {key} handler");
                self.handlers.insert((*curve).to_string(), Arc::clone(&handler));
            }
        }

        tracing::debug!("registering handler for {key}");
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Find the handler for a key: by `alg`, then by `crv`.
    #[must_use]
    pub fn resolve(&self, jwk: &Jwk) -> Option<Arc<dyn KeyHandler<K>>> {
        [jwk.alg(), jwk.crv()]
            .into_iter()
            .flatten()
            .find_map(|key| self.handlers.get(key))
            .cloned()
    }

    /// Whether no handlers are registered.
    ///
    /// An empty registry is permissive: documents are built without key
    /// pairs. A populated registry is strict: every key must have a handler.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of bound algorithms and curves, aliases included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether a handler is bound to `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }
}
