//! Encode a JWK as a `did:jwk` identifier and destructure `did:jwk` URLs.
//!
//! A `did:jwk` URL is of the form
//!
//! `did:jwk:<base64url(JSON(jwk))>[#0]`.
//!
//! The identifier always describes exactly one key, so the only fragment a
//! URL may carry is `0`.

use std::fmt::{self, Display};
use std::str::FromStr;

use base64ct::{Base64UrlUnpadded, Encoding};

use crate::error::{tracerr, DecodeError, Error};
use crate::jwk::Jwk;

/// Prefix shared by every `did:jwk` identifier.
pub const PREFIX: &str = "did:jwk:";

/// Fragment of the single verification method in a `did:jwk` document.
pub const FRAGMENT: &str = "0";

/// Compute the DID for a JWK.
///
/// The key is serialized exactly as supplied (member order included, no
/// canonicalization) and base64url-encoded without padding.
///
/// # Errors
///
/// Will fail with [`Error::InvalidArgument`] if the key cannot be serialized.
pub fn did_from_jwk(jwk: &Jwk) -> crate::Result<String> {
    let serialized = serde_json::to_vec(jwk)
        .map_err(|e| Error::InvalidArgument(format!("issue serializing key: {e}")))?;
    let encoded = Base64UrlUnpadded::encode_string(&serialized);
    Ok(format!("{PREFIX}{encoded}"))
}

/// The ID of the verification method in the DID document for `did`.
#[must_use]
pub fn key_id(did: &str) -> String {
    format!("{did}#{FRAGMENT}")
}

/// Structure of a `did:jwk` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Url {
    /// The DID: the URL up to (not including) any fragment, exactly as
    /// supplied.
    pub did: String,

    /// Fragment, if present. Always `0`.
    pub fragment: Option<String>,
}

impl FromStr for Url {
    type Err = Error;

    /// Parse a string into a `did:jwk` URL.
    ///
    /// # Errors
    ///
    /// Will fail with [`Error::MalformedIdentifier`] if the string does not
    /// start with `did:jwk:` or carries a fragment other than `0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (did, fragment) = match s.split_once('#') {
            Some((did, fragment)) => (did, Some(fragment)),
            None => (s, None),
        };
        if !did.starts_with(PREFIX) {
            tracerr!(Error::MalformedIdentifier, "DID must start with `{PREFIX}`: {did}");
        }
        if let Some(fragment) = fragment {
            if fragment != FRAGMENT {
                tracerr!(Error::MalformedIdentifier, "unsupported fragment `#{fragment}` in {s}");
            }
        }

        Ok(Self {
            did: did.to_string(),
            fragment: fragment.map(ToString::to_string),
        })
    }
}

impl Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.did)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl Url {
    /// The method-specific ID: the encoded key.
    #[must_use]
    pub fn method_specific_id(&self) -> &str {
        self.did.strip_prefix(PREFIX).unwrap_or(&self.did)
    }

    /// Decode the JWK embedded in the URL.
    ///
    /// Trailing `=` padding is tolerated.
    ///
    /// # Errors
    ///
    /// Will fail with [`Error::Decoding`] if the method-specific ID is not
    /// base64url-encoded UTF-8, or with [`Error::Parse`] if the decoded text is
    /// not a JSON object with the structure of a JWK.
    pub fn jwk(&self) -> crate::Result<Jwk> {
        let encoded = self.method_specific_id().trim_end_matches('=');
        let bytes = Base64UrlUnpadded::decode_vec(encoded).map_err(|e| {
            tracing::error!("issue decoding {}: {e}", self.did);
            DecodeError::from(e)
        })?;
        let json = String::from_utf8(bytes).map_err(|e| {
            tracing::error!("issue decoding {}: {e}", self.did);
            DecodeError::from(e)
        })?;
        serde_json::from_str(&json).map_err(|e| {
            tracing::error!("issue parsing key from {}: {e}", self.did);
            Error::Parse(e)
        })
    }

    /// Whether the URL addresses the verification method rather than the
    /// whole document.
    #[must_use]
    pub const fn is_key_url(&self) -> bool {
        self.fragment.is_some()
    }

    /// The ID of the verification method this URL's DID describes.
    #[must_use]
    pub fn key_id(&self) -> String {
        key_id(&self.did)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const DID: &str = "did:jwk:eyJrdHkiOiJPS1AiLCJjcnYiOiJFZDI1NTE5IiwiYWxnIjoiRWREU0EiLCJ4IjoiaVBoQVlLcUlQSzlybmdfdWVkaHBYeklDMnZPTW44VnRHb29oZG5BVmxyQSJ9";
    const JSON: &str = r#"{"kty":"OKP","crv":"Ed25519","alg":"EdDSA","x":"iPhAYKqIPK9rng_uedhpXzIC2vOMn8VtGoohdnAVlrA"}"#;

    #[test]
    fn encode() {
        let jwk: Jwk = serde_json::from_str(JSON).expect("should deserialize");
        assert_eq!(did_from_jwk(&jwk).expect("should encode"), DID);
        assert_eq!(key_id(DID), format!("{DID}#0"));
    }

    #[test]
    fn decode_is_byte_exact() {
        let url = Url::from_str(DID).expect("should parse");
        let jwk = url.jwk().expect("should decode");
        assert_eq!(serde_json::to_string(&jwk).expect("should serialize"), JSON);
        assert_eq!(did_from_jwk(&jwk).expect("should encode"), DID);
    }

    #[test]
    fn key_url() {
        let url = Url::from_str(&format!("{DID}#0")).expect("should parse");
        assert_eq!(url.did, DID);
        assert_eq!(url.fragment.as_deref(), Some("0"));
        assert!(url.is_key_url());
        assert_eq!(url.key_id(), format!("{DID}#0"));
        assert_eq!(url.to_string(), format!("{DID}#0"));
        assert_eq!(url.method_specific_id(), &DID[8..]);
    }

    #[test]
    fn bad_fragment() {
        for fragment in ["1", "", "key-0", "0#0"] {
            let result = Url::from_str(&format!("{DID}#{fragment}"));
            assert!(matches!(result, Err(Error::MalformedIdentifier(_))), "fragment {fragment:?}");
        }
    }

    #[test]
    fn bad_prefix() {
        for did in ["notdid:jwk:eyJrdHkiOiJPS1AifQ", "did:key:z6Mk", "did:jwk", "DID:JWK:abc"] {
            let result = Url::from_str(did);
            assert!(matches!(result, Err(Error::MalformedIdentifier(_))), "did {did:?}");
        }
    }

    #[test]
    fn padding_tolerated() {
        // `{"kty":"oct","k":"abc"}` encodes to a length needing one pad char
        let url = Url::from_str("did:jwk:eyJrdHkiOiJvY3QiLCJrIjoiYWJjIn0=").expect("should parse");
        let jwk = url.jwk().expect("should decode");
        assert_eq!(jwk.as_map(), json!({"kty": "oct", "k": "abc"}).as_object().unwrap());
    }

    #[test]
    fn not_base64() {
        let url = Url::from_str("did:jwk:not*base64!").expect("should parse");
        assert!(matches!(url.jwk(), Err(Error::Decoding(DecodeError::Base64(_)))));
    }

    #[test]
    fn not_utf8() {
        // 0xff 0xfe
        let url = Url::from_str("did:jwk:__4").expect("should parse");
        assert!(matches!(url.jwk(), Err(Error::Decoding(DecodeError::Utf8(_)))));
    }

    #[test]
    fn not_json() {
        // `{"kty":`
        let url = Url::from_str("did:jwk:eyJrdHkiOg").expect("should parse");
        assert!(matches!(url.jwk(), Err(Error::Parse(_))));
    }

    #[test]
    fn not_a_jwk() {
        // `[1,2]`
        let url = Url::from_str("did:jwk:WzEsMl0").expect("should parse");
        assert!(matches!(url.jwk(), Err(Error::Parse(_))));
    }
}
