//! # JSON Web Key
//!
//! An open JWK model. `did:jwk` identifiers are derived from the
//! exact serialization of the key as supplied, so members are kept verbatim and
//! in their original order. Only `kty`, `alg`, `crv` and `use` are interpreted,
//! and only for their structure (not their cryptographic validity).

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{tracerr, Error};

/// A JSON Web Key.
///
/// Requires a string `kty`. `alg`, `crv` and `use`, when present, must be
/// strings. Any other members are carried through untouched.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Jwk(Map<String, Value>);

impl Jwk {
    /// Key type, e.g. `OKP` or `EC`.
    #[must_use]
    pub fn kty(&self) -> &str {
        self.member("kty").unwrap_or_default()
    }

    /// Algorithm the key is intended for, e.g. `EdDSA` or `ES256`.
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.member("alg")
    }

    /// Curve, e.g. `Ed25519` or `P-256`.
    #[must_use]
    pub fn crv(&self) -> Option<&str> {
        self.member("crv")
    }

    /// Declared public key use: `sig` or `enc`.
    #[must_use]
    pub fn key_use(&self) -> Option<&str> {
        self.member("use")
    }

    /// Any member of the key.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The key's members, in their original order.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The intended use of the key, if it can be determined.
    ///
    /// Rules are tried in order and the first to produce a use wins:
    ///
    /// 1. the declared `use` member;
    /// 2. `enc` when `alg` is an ECDH key agreement algorithm;
    /// 3. the default use for the key's curve.
    #[must_use]
    pub fn usage(&self) -> Option<KeyUse> {
        USAGE_RULES.iter().find_map(|rule| rule(self))
    }

    fn member(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

impl TryFrom<Map<String, Value>> for Jwk {
    type Error = Error;

    fn try_from(members: Map<String, Value>) -> Result<Self, Self::Error> {
        match members.get("kty") {
            Some(Value::String(_)) => {}
            Some(_) => tracerr!(Error::InvalidArgument, "JWK member `kty` must be a string"),
            None => tracerr!(Error::InvalidArgument, "JWK is missing `kty`"),
        }
        for name in ["alg", "crv", "use"] {
            if members.get(name).is_some_and(|v| !v.is_string()) {
                tracerr!(Error::InvalidArgument, "JWK member `{name}` must be a string");
            }
        }
        Ok(Self(members))
    }
}

impl TryFrom<Value> for Jwk {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(members) = value else {
            tracerr!(Error::InvalidArgument, "JWK must be a JSON object");
        };
        Self::try_from(members)
    }
}

impl From<Jwk> for Map<String, Value> {
    fn from(jwk: Jwk) -> Self {
        jwk.0
    }
}

/// How a key is meant to be used, from the JWK `use` member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyUse {
    /// `sig`: signing and signature verification.
    Signature,

    /// `enc`: encryption and key agreement.
    Encryption,

    /// Declared with a value other than `sig` or `enc`. Implies no
    /// verification relationships.
    Other,
}

impl From<&str> for KeyUse {
    fn from(value: &str) -> Self {
        match value {
            "sig" => Self::Signature,
            "enc" => Self::Encryption,
            _ => Self::Other,
        }
    }
}

impl Display for KeyUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => write!(f, "sig"),
            Self::Encryption => write!(f, "enc"),
            Self::Other => write!(f, "other"),
        }
    }
}

type UsageRule = fn(&Jwk) -> Option<KeyUse>;

const USAGE_RULES: [UsageRule; 3] = [declared_use, key_agreement_alg, curve_default];

/// Default use by curve when nothing else indicates one.
const CURVE_USAGE: [(&str, KeyUse); 7] = [
    ("Ed25519", KeyUse::Signature),
    ("X25519", KeyUse::Encryption),
    ("P-256", KeyUse::Signature),
    ("P-256K", KeyUse::Signature),
    ("P-384", KeyUse::Signature),
    ("P-521", KeyUse::Signature),
    ("Bls12381G2", KeyUse::Signature),
];

fn declared_use(jwk: &Jwk) -> Option<KeyUse> {
    jwk.key_use().map(KeyUse::from)
}

fn key_agreement_alg(jwk: &Jwk) -> Option<KeyUse> {
    jwk.alg().filter(|alg| alg.starts_with("ECDH")).map(|_| KeyUse::Encryption)
}

fn curve_default(jwk: &Jwk) -> Option<KeyUse> {
    let crv = jwk.crv()?;
    CURVE_USAGE.iter().find(|(curve, _)| *curve == crv).map(|(_, key_use)| *key_use)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn jwk(value: Value) -> Jwk {
        Jwk::try_from(value).expect("should be a JWK")
    }

    #[test]
    fn preserves_member_order() {
        let raw = r#"{"kty":"OKP","crv":"Ed25519","alg":"EdDSA","x":"iPhAYKqIPK9rng_uedhpXzIC2vOMn8VtGoohdnAVlrA"}"#;
        let jwk: Jwk = serde_json::from_str(raw).expect("should deserialize");

        assert_eq!(serde_json::to_string(&jwk).expect("should serialize"), raw);
        assert_eq!(jwk.kty(), "OKP");
        assert_eq!(jwk.alg(), Some("EdDSA"));
        assert_eq!(jwk.crv(), Some("Ed25519"));
        assert_eq!(jwk.key_use(), None);
    }

    #[test]
    fn keeps_unknown_members() {
        let jwk = jwk(json!({"kty": "EC", "kid": "key-1", "ext": true, "key_ops": ["verify"]}));
        assert_eq!(jwk.get("kid"), Some(&json!("key-1")));
        assert_eq!(jwk.get("key_ops"), Some(&json!(["verify"])));
        assert_eq!(jwk.as_map().len(), 4);
    }

    #[test]
    fn rejects_bad_structure() {
        for value in [
            json!("not an object"),
            json!({"crv": "Ed25519"}),
            json!({"kty": 1}),
            json!({"kty": "OKP", "alg": 7}),
            json!({"kty": "OKP", "use": ["sig"]}),
        ] {
            let result = Jwk::try_from(value);
            assert!(matches!(result, Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn declared_use_wins() {
        // declared `sig` overrides both the ECDH algorithm and the X25519 default
        let key = jwk(json!({"kty": "OKP", "crv": "X25519", "alg": "ECDH-ES", "use": "sig"}));
        assert_eq!(key.usage(), Some(KeyUse::Signature));

        let key = jwk(json!({"kty": "OKP", "crv": "Ed25519", "use": "enc"}));
        assert_eq!(key.usage(), Some(KeyUse::Encryption));
    }

    #[test]
    fn unrecognized_use_is_authoritative() {
        let key = jwk(json!({"kty": "OKP", "crv": "Ed25519", "use": "wrap"}));
        assert_eq!(key.usage(), Some(KeyUse::Other));
    }

    #[test]
    fn ecdh_alg_before_curve() {
        let key = jwk(json!({"kty": "EC", "crv": "P-384", "alg": "ECDH-ES+A256KW"}));
        assert_eq!(key.usage(), Some(KeyUse::Encryption));

        let key = jwk(json!({"kty": "EC", "crv": "P-384", "alg": "ES384"}));
        assert_eq!(key.usage(), Some(KeyUse::Signature));
    }

    #[test]
    fn curve_defaults() {
        for (crv, expected) in CURVE_USAGE {
            assert_eq!(jwk(json!({"kty": "OKP", "crv": crv})).usage(), Some(expected));
        }
    }

    #[test]
    fn undetermined() {
        assert_eq!(jwk(json!({"kty": "oct", "k": "abc"})).usage(), None);
        assert_eq!(jwk(json!({"kty": "EC", "crv": "secp256k1"})).usage(), None);
    }
}
