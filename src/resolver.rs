//! # DID JWK Resolver
//!
//! Builds the DID document for a JWK and resolves `did:jwk` URLs back into
//! documents or verification methods. Both directions share one builder, so a
//! document resolved from a DID is identical to the one generated from its key.
//!
//! See:
//!
//! - <https://github.com/quartzjer/did-jwk/blob/main/spec.md>
//! - <https://w3c.github.io/did-resolution>

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Kind;
use crate::document::{Document, KeyPurpose, MethodType, VerificationMethod};
use crate::error::{tracerr, Error};
use crate::jwk::{Jwk, KeyUse};
use crate::registry::{KeyHandler, KeyPair, Registry};
use crate::resolution::Resolution;
use crate::url::{did_from_jwk, key_id, Url};
use crate::METHOD;

/// Resolver and document builder for the `did:jwk` method.
///
/// `K` is the key-pair type produced by registered handlers. Handlers must be
/// registered before the resolver is used: registration needs `&mut self`, so
/// it cannot overlap with resolution.
#[derive(Debug)]
pub struct DidJwk<K = Value> {
    registry: Registry<K>,
}

impl<K> Default for DidJwk<K> {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
        }
    }
}

impl<K: KeyPair + 'static> DidJwk<K> {
    /// Create a resolver with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The DID method name: `jwk`.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        METHOD
    }

    /// Register a handler to convert keys with the given algorithm or curve
    /// into key pairs. See [`Registry::register`].
    ///
    /// # Errors
    ///
    /// Will fail with [`Error::InvalidArgument`] if `key` is empty.
    pub fn use_handler(
        &mut self, key: impl Into<String>, handler: impl KeyHandler<K> + 'static,
    ) -> crate::Result<()> {
        self.registry.register(key, handler)
    }

    /// The resolver's handlers.
    #[must_use]
    pub const fn registry(&self) -> &Registry<K> {
        &self.registry
    }

    /// Create the DID document for a JWK.
    ///
    /// The DID is computed from the key as supplied. If any handlers are
    /// registered, the key is also converted into a key pair.
    ///
    /// # Errors
    ///
    /// Will fail with [`Error::UnsupportedKeyType`] if handlers are registered
    /// but none matches the key, or with [`Error::Handler`] if the matching
    /// handler fails.
    pub async fn from_jwk(&self, jwk: &Jwk, method_type: MethodType) -> crate::Result<Generated<K>> {
        let did = did_from_jwk(jwk)?;
        tracing::debug!("generating document for {did}");
        self.build(jwk, &did, method_type).await
    }

    /// Resolve a `did:jwk` DID into its document, or a `did:jwk` DID URL
    /// (`<did>#0`) into its verification method.
    ///
    /// The document's ID is the DID exactly as supplied.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if neither or both of `did` and `url` are
    ///   set, or the verification method type is not recognized.
    /// - [`Error::MalformedIdentifier`] if the URL is not a `did:jwk` URL.
    /// - [`Error::Decoding`] or [`Error::Parse`] if the embedded key cannot be
    ///   recovered.
    /// - [`Error::UnsupportedKeyType`] and [`Error::Handler`] as for
    ///   [`DidJwk::from_jwk`].
    pub async fn get(&self, options: GetOptions) -> crate::Result<Resource> {
        let did_url = match (options.did.as_deref(), options.url.as_deref()) {
            (Some(did_url), None) | (None, Some(did_url)) if !did_url.is_empty() => did_url,
            (Some(_), Some(_)) => {
                tracerr!(Error::InvalidArgument, "only one of `did` or `url` may be set");
            }
            _ => tracerr!(Error::InvalidArgument, "a non-empty `did` or `url` is required"),
        };
        let method_type = match options.verification_method_type.as_deref() {
            Some(name) => MethodType::from_str(name)?,
            None => MethodType::default(),
        };

        let url = Url::from_str(did_url)?;
        let jwk = url.jwk()?;
        tracing::debug!("resolving {url}");

        let generated = self.build(&jwk, &url.did, method_type).await?;
        if !url.is_key_url() {
            return Ok(Resource::Document(generated.document));
        }

        let kid = url.key_id();
        let Some(mut method) =
            generated.document.verification_method.into_iter().find(|vm| vm.id == kid)
        else {
            tracerr!(Error::NotFound, "verification method {kid} not found");
        };
        method.context = Some(Kind::from(method_type.suite_context()));
        Ok(Resource::VerificationMethod(method))
    }

    /// Resolve a `did:jwk` DID into a DID resolution result.
    ///
    /// Never fails: errors are reported in the result's resolution metadata.
    /// DID URLs (with a fragment) are rejected as `invalidDid`.
    pub async fn resolve(&self, did: &str) -> Resolution {
        let url = match Url::from_str(did) {
            Ok(url) if url.is_key_url() => {
                let err = Error::MalformedIdentifier(format!("expected a DID, not a DID URL: {did}"));
                tracing::error!("{err}");
                return Resolution::failed(&err);
            }
            Ok(url) => url,
            Err(e) => return Resolution::failed(&e),
        };

        let resolved = match url.jwk() {
            Ok(jwk) => self.build(&jwk, &url.did, MethodType::default()).await,
            Err(e) => Err(e),
        };
        match resolved {
            Ok(generated) => Resolution::resolved(&url, generated.document),
            Err(e) => Resolution::failed(&e),
        }
    }

    // Build the document for `jwk` under `did` and, when handlers are
    // registered, its key pair.
    async fn build(
        &self, jwk: &Jwk, did: &str, method_type: MethodType,
    ) -> crate::Result<Generated<K>> {
        let document = document(jwk, did, method_type);
        let mut key_pairs = HashMap::new();

        if !self.registry.is_empty() {
            let Some(handler) = self.registry.resolve(jwk) else {
                let msg = format!(
                    "no handler for alg {:?} or crv {:?}",
                    jwk.alg().unwrap_or_default(),
                    jwk.crv().unwrap_or_default()
                );
                tracing::warn!("{msg}");
                return Err(Error::UnsupportedKeyType(msg));
            };

            for method in &document.verification_method {
                let key_pair = handler.convert(method).await.map_err(Error::Handler)?;
                tracing::debug!(
                    "created {} key pair {} for {}",
                    key_pair.key_type(),
                    key_pair.id(),
                    method.id
                );
                key_pairs.insert(method.id.clone(), key_pair);
            }
        }

        Ok(Generated { document, key_pairs })
    }
}

// Convert a JWK to a DID document.
fn document(jwk: &Jwk, did: &str, method_type: MethodType) -> Document {
    let kid = key_id(did);

    let purposes = match jwk.usage() {
        Some(KeyUse::Signature) => KeyPurpose::SIGNING.to_vec(),
        Some(KeyUse::Encryption) => vec![KeyPurpose::KeyAgreement],
        Some(KeyUse::Other) | None => vec![],
    };

    let mut document = Document {
        context: method_type.context().into_iter().map(Kind::from).collect(),
        id: did.to_string(),
        verification_method: vec![VerificationMethod {
            context: None,
            id: kid.clone(),
            type_: method_type.to_string(),
            controller: did.to_string(),
            public_key_jwk: jwk.clone(),
        }],
        ..Document::default()
    };
    for purpose in purposes {
        *document.relationship_mut(purpose) = Some(vec![Kind::String(kid.clone())]);
    }
    document
}

/// Get the verification method the document designates for `purpose`.
///
/// The first entry of the purpose's verification relationship is used. A
/// reference is dereferenced against the document's verification methods. The
/// returned method carries the `@context` for its type.
///
/// # Errors
///
/// Will fail with [`Error::NotFound`] if the document has no method for the
/// purpose, or the method's type is not recognized.
pub fn public_method_for(
    document: &Document, purpose: KeyPurpose,
) -> crate::Result<VerificationMethod> {
    let method = match document.relationship(purpose).and_then(<[_]>::first) {
        Some(Kind::String(id)) => document.verification_method(id).cloned(),
        Some(Kind::Object(method)) => Some(method.clone()),
        None => None,
    };
    let Some(mut method) = method else {
        tracerr!(Error::NotFound, "no verification method for {purpose} in {}", document.id);
    };
    let Some(method_type) = method.method_type() else {
        tracerr!(Error::NotFound, "unsupported verification method type {}", method.type_);
    };

    method.context = Some(Kind::from(method_type.suite_context()));
    Ok(method)
}

/// A generated DID document and the key pairs created for it.
#[derive(Debug)]
pub struct Generated<K> {
    /// The DID document.
    pub document: Document,

    /// Key pairs by verification method ID. Empty when no handlers are
    /// registered.
    pub key_pairs: HashMap<String, K>,
}

impl<K> Generated<K> {
    /// The DID.
    #[must_use]
    pub fn did(&self) -> &str {
        &self.document.id
    }

    /// The key pair to use for `purpose`.
    ///
    /// Returns `None` when no key pair was created (no handlers registered).
    ///
    /// # Errors
    ///
    /// Will fail with [`Error::NotFound`] if the document has no verification
    /// method for the purpose.
    pub fn method_for(&self, purpose: KeyPurpose) -> crate::Result<Option<&K>> {
        let method = public_method_for(&self.document, purpose)?;
        Ok(self.key_pairs.get(&method.id))
    }
}

/// Options for [`DidJwk::get`].
///
/// `did` and `url` are aliases: set exactly one.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetOptions {
    /// The DID or DID URL to resolve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,

    /// Alias of `did`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Verification method type name. Defaults to `JsonWebKey`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method_type: Option<String>,
}

impl GetOptions {
    /// Options to resolve a DID or DID URL.
    #[must_use]
    pub fn did(did: impl Into<String>) -> Self {
        Self {
            did: Some(did.into()),
            ..Self::default()
        }
    }

    /// Options to resolve a DID or DID URL, given as `url`.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the verification method type.
    #[must_use]
    pub fn method_type(mut self, method_type: MethodType) -> Self {
        self.verification_method_type = Some(method_type.to_string());
        self
    }
}

/// The resource a `did:jwk` URL dereferences to.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Resource {
    /// The DID document, for a DID.
    Document(Document),

    /// The verification method, for a DID URL with fragment `0`.
    VerificationMethod(VerificationMethod),
}
