//! # DID Resolution
//!
//! The result envelope defined by
//! [DID Resolution](https://w3c.github.io/did-resolution/#did-resolution-result).
//! Failures are reported in the metadata instead of as errors.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Error;
use crate::url::Url;
use crate::METHOD;

/// JSON-LD context of a DID resolution result.
pub const RESOLUTION_CONTEXT: &str = "https://w3id.org/did-resolution/v1";

/// Media type of a resolved `did:jwk` document.
pub const CONTENT_TYPE: &str = "application/did+ld+json";

/// DID resolution result.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// The resolution context.
    #[serde(rename = "@context")]
    pub context: String,

    /// The resolved document. Absent when resolution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document: Option<Document>,

    /// Metadata about the document. Always empty for `did:jwk`: the document
    /// cannot be updated or deactivated.
    pub did_document_metadata: DocumentMetadata,

    /// Metadata about the resolution process.
    pub did_resolution_metadata: ResolutionMetadata,
}

/// DID document metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Set to `true` if the DID has been deactivated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
}

/// DID resolution metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    /// Media type of the returned document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// DID resolution error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Human-readable description of `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// The resolved DID, broken into parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<DidParts>,
}

/// Parts of the resolved DID.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidParts {
    /// The DID as supplied.
    pub did_string: String,

    /// The encoded key.
    pub method_specific_id: String,

    /// Always `jwk`.
    pub method: String,
}

impl Resolution {
    pub(crate) fn resolved(url: &Url, document: Document) -> Self {
        Self {
            context: RESOLUTION_CONTEXT.to_string(),
            did_document: Some(document),
            did_document_metadata: DocumentMetadata::default(),
            did_resolution_metadata: ResolutionMetadata {
                content_type: Some(CONTENT_TYPE.to_string()),
                did: Some(DidParts {
                    did_string: url.did.clone(),
                    method_specific_id: url.method_specific_id().to_string(),
                    method: METHOD.to_string(),
                }),
                ..ResolutionMetadata::default()
            },
        }
    }

    pub(crate) fn failed(err: &Error) -> Self {
        Self {
            context: RESOLUTION_CONTEXT.to_string(),
            did_document: None,
            did_document_metadata: DocumentMetadata::default(),
            did_resolution_metadata: ResolutionMetadata {
                error: Some(err.code().to_string()),
                error_message: Some(err.to_string()),
                ..ResolutionMetadata::default()
            },
        }
    }

    /// Whether resolution succeeded.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.did_document.is_some()
    }
}
