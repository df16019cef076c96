//! # DID Document
//!
//! A DID Document is a JSON-LD document that contains information related to a
//! DID. A `did:jwk` document always holds exactly one verification method,
//! referenced by ID from the verification relationships the key's use allows.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Kind;
use crate::error::{tracerr, Error};
use crate::jwk::Jwk;

/// The DID core context. <https://www.w3.org/TR/did-core/#context>
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// DID Document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The context of the DID document.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// The DID for a particular DID subject.
    ///
    /// The subject is defined as the entity identified by the DID and described
    /// by the DID document.
    pub id: String,

    /// The set of verification methods for the DID subject.
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,

    /// The `authentication` verification relationship is used to specify how
    /// the DID subject is expected to be authenticated, for purposes such
    /// as logging into a website or in any sort of challenge-response
    /// protocol.
    ///
    /// <https://www.w3.org/TR/did-core/#authentication>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<Kind<VerificationMethod>>>,

    /// The `assertion_method` verification relationship is used to specify how
    /// the DID subject is expected to express claims, such as for the
    /// purposes of issuing a Verifiable Credential.
    ///
    /// <https://www.w3.org/TR/did-core/#assertion>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<Kind<VerificationMethod>>>,

    /// The `capability_invocation` verification relationship is used to specify
    /// a verification method that might be used by the DID subject to
    /// invoke a cryptographic capability, such as the authorization to
    /// update the DID Document.
    ///
    /// <https://www.w3.org/TR/did-core/#capability-invocation>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<Kind<VerificationMethod>>>,

    /// The `capability_delegation` verification relationship is used to specify
    /// a mechanism that might be used by the DID subject to delegate a
    /// cryptographic capability to another party, such as delegating the
    /// authority to access a specific HTTP API to a subordinate.
    ///
    /// <https://www.w3.org/TR/did-core/#capability-delegation>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<Kind<VerificationMethod>>>,

    /// The `key_agreement` verification relationship is used to specify how an
    /// entity can generate encryption material in order to transmit
    /// confidential information intended for the DID subject, such as for
    /// the purposes of establishing a secure communication channel with the
    /// recipient.
    ///
    /// <https://www.w3.org/TR/did-core/#key-agreement>
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<Kind<VerificationMethod>>>,
}

impl Document {
    /// Retrieve a verification method by its ID.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }

    /// The entries of a verification relationship.
    #[must_use]
    pub fn relationship(&self, purpose: KeyPurpose) -> Option<&[Kind<VerificationMethod>]> {
        let entries = match purpose {
            KeyPurpose::Authentication => &self.authentication,
            KeyPurpose::AssertionMethod => &self.assertion_method,
            KeyPurpose::CapabilityInvocation => &self.capability_invocation,
            KeyPurpose::CapabilityDelegation => &self.capability_delegation,
            KeyPurpose::KeyAgreement => &self.key_agreement,
        };
        entries.as_deref()
    }

    pub(crate) fn relationship_mut(
        &mut self, purpose: KeyPurpose,
    ) -> &mut Option<Vec<Kind<VerificationMethod>>> {
        match purpose {
            KeyPurpose::Authentication => &mut self.authentication,
            KeyPurpose::AssertionMethod => &mut self.assertion_method,
            KeyPurpose::CapabilityInvocation => &mut self.capability_invocation,
            KeyPurpose::CapabilityDelegation => &mut self.capability_delegation,
            KeyPurpose::KeyAgreement => &mut self.key_agreement,
        }
    }
}

/// A DID document can express verification methods, such as cryptographic
/// public keys, which can be used to authenticate or authorize interactions
/// with the DID subject or associated parties.
///
/// For `did:jwk` the key material is always a JWK.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Only set when the method is dereferenced on its own, outside of the
    /// containing document.
    #[serde(rename = "@context")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Kind<Value>>,

    /// A DID URL that identifies the verification method.
    pub id: String,

    /// The type of verification method.
    ///
    /// Kept as a string so documents from elsewhere can be inspected. See
    /// [`VerificationMethod::method_type`].
    #[serde(rename = "type")]
    pub type_: String,

    /// The DID of the controller of the verification method.
    pub controller: String,

    /// The public key.
    pub public_key_jwk: Jwk,
}

impl VerificationMethod {
    /// Infer the DID from the key ID.
    #[must_use]
    pub fn did(&self) -> &str {
        self.id.split('#').next().unwrap_or_default()
    }

    /// The method type, if it is one this crate recognizes.
    #[must_use]
    pub fn method_type(&self) -> Option<MethodType> {
        MethodType::from_name(&self.type_)
    }
}

/// Verification method types recognized for `did:jwk` documents.
///
/// Each type selects the JSON-LD contexts of the documents built with it.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub enum MethodType {
    /// JSON Web Key, as defined by the Controlled Identifiers specification.
    #[default]
    JsonWebKey,

    /// JSON Web Key, version 2020.
    JsonWebKey2020,
}

impl MethodType {
    /// Look up a method type by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "JsonWebKey" => Some(Self::JsonWebKey),
            "JsonWebKey2020" => Some(Self::JsonWebKey2020),
            _ => None,
        }
    }

    /// The context for methods of this type.
    #[must_use]
    pub const fn suite_context(self) -> &'static str {
        match self {
            Self::JsonWebKey => "https://w3id.org/security/jwk/v1",
            Self::JsonWebKey2020 => "https://w3id.org/security/suites/jws-2020/v1",
        }
    }

    /// The `@context` of a DID document whose methods have this type.
    #[must_use]
    pub const fn context(self) -> [&'static str; 2] {
        [DID_CONTEXT, self.suite_context()]
    }
}

impl Display for MethodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonWebKey => write!(f, "JsonWebKey"),
            Self::JsonWebKey2020 => write!(f, "JsonWebKey2020"),
        }
    }
}

impl FromStr for MethodType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(method_type) = Self::from_name(s) else {
            tracerr!(Error::InvalidArgument, "unsupported verification method type: {s}");
        };
        Ok(method_type)
    }
}

/// The purpose key material will be used for: the document's verification
/// relationships.
#[derive(Clone, Copy, Debug, Deserialize, Hash, PartialEq, Serialize, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KeyPurpose {
    /// The document's `authentication` field.
    Authentication,

    /// The document's `assertion_method` field.
    AssertionMethod,

    /// The document's `capability_invocation` field.
    CapabilityInvocation,

    /// The document's `capability_delegation` field.
    CapabilityDelegation,

    /// The document's `key_agreement` field.
    KeyAgreement,
}

impl KeyPurpose {
    /// Relationships granted to a signing (`sig`) key. Always populated
    /// together.
    pub const SIGNING: [Self; 4] = [
        Self::Authentication,
        Self::AssertionMethod,
        Self::CapabilityInvocation,
        Self::CapabilityDelegation,
    ];
}

impl Display for KeyPurpose {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::AssertionMethod => write!(f, "assertionMethod"),
            Self::CapabilityInvocation => write!(f, "capabilityInvocation"),
            Self::CapabilityDelegation => write!(f, "capabilityDelegation"),
            Self::KeyAgreement => write!(f, "keyAgreement"),
        }
    }
}

impl FromStr for KeyPurpose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authentication" => Ok(Self::Authentication),
            "assertionMethod" => Ok(Self::AssertionMethod),
            "capabilityInvocation" => Ok(Self::CapabilityInvocation),
            "capabilityDelegation" => Ok(Self::CapabilityDelegation),
            "keyAgreement" => Ok(Self::KeyAgreement),
            _ => tracerr!(Error::InvalidArgument, "unknown verification relationship: {s}"),
        }
    }
}
