//! # DID JWK
//!
//! The `did:jwk` method embeds a public JSON Web Key directly in the
//! identifier: the method-specific ID is the base64url encoding of the key's
//! JSON serialization. Resolution is therefore a pure, local computation.
//! There is no ledger to consult beyond the identifier string itself.
//!
//! This crate converts between a JWK and its DID document, parses and
//! validates `did:jwk` URLs, and dispatches conversion of the embedded key into
//! an algorithm-specific key pair to handlers registered by the caller. It does
//! no cryptography of its own.
//!
//! See:
//!
//! - <https://github.com/quartzjer/did-jwk/blob/main/spec.md>
//! - <https://www.w3.org/TR/did-core>
//!
//! # Example
//!
//! ```rust,no_run
//! use vercre_didjwk::{GetOptions, Resource, driver};
//!
//! # async fn run() -> vercre_didjwk::Result<()> {
//! let resolver = driver();
//! let did = "did:jwk:eyJrdHkiOiJPS1AiLCJjcnYiOiJFZDI1NTE5IiwiYWxnIjoiRWREU0EiLCJ4IjoiaVBoQVlLcUlQSzlybmdfdWVkaHBYeklDMnZPTW44VnRHb29oZG5BVmxyQSJ9";
//!
//! let Resource::Document(doc) = resolver.get(GetOptions::did(did)).await? else {
//!     unreachable!("no fragment");
//! };
//! assert_eq!(doc.id, did);
//! # Ok(())
//! # }
//! ```

mod core;
mod document;
mod error;
mod jwk;
mod registry;
mod resolution;
mod resolver;
mod url;

pub use self::core::Kind;
pub use self::document::{Document, KeyPurpose, MethodType, VerificationMethod, DID_CONTEXT};
pub use self::error::{DecodeError, Error};
pub use self::jwk::{Jwk, KeyUse};
pub use self::registry::{KeyHandler, KeyPair, Registry};
pub use self::resolution::{
    DidParts, DocumentMetadata, Resolution, ResolutionMetadata, CONTENT_TYPE, RESOLUTION_CONTEXT,
};
pub use self::resolver::{public_method_for, DidJwk, Generated, GetOptions, Resource};
pub use self::url::{did_from_jwk, key_id, Url, FRAGMENT, PREFIX};

/// Result type for `did:jwk` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The DID method name, as registered with multi-method resolvers.
pub const METHOD: &str = "jwk";

/// Create a `did:jwk` resolver with an empty handler registry.
///
/// Matches the `driver()` convention of other DID method plugins. Key pairs
/// are untyped JSON objects; use [`DidJwk::new`] to choose a concrete key-pair
/// type. Register handlers with [`DidJwk::use_handler`] before resolving if key
/// pairs are wanted.
#[must_use]
pub fn driver() -> DidJwk {
    DidJwk::new()
}
