//! # Errors
//!
//! Every failure the crate can detect maps to one variant of [`Error`]. Each
//! variant also maps to a W3C DID resolution error code (see
//! [`Error::code`]) so failures can be reported in resolution metadata.

use std::string::FromUtf8Error;

use thiserror::Error;

/// Log an error and return it from the enclosing function.
///
/// The message is formatted once, logged at `error` level and used as the
/// variant's payload.
macro_rules! tracerr {
    ($variant:path, $($msg:tt)*) => {{
        let msg = format!($($msg)*);
        tracing::error!("{msg}");
        return Err($variant(msg));
    }};
}
pub(crate) use tracerr;

/// Errors returned by `did:jwk` operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller supplied a missing or malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The identifier does not follow the `did:jwk` grammar: wrong prefix or
    /// an unsupported fragment.
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// The identifier payload is not valid base64url-encoded UTF-8.
    #[error("issue decoding identifier: {0}")]
    Decoding(#[from] DecodeError),

    /// The decoded identifier payload is not a JSON Web Key.
    #[error("issue parsing key: {0}")]
    Parse(#[source] serde_json::Error),

    /// The handler registry is populated but has no handler for the key's
    /// algorithm or curve.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// No verification method is available for the requested purpose.
    #[error("not found: {0}")]
    NotFound(String),

    /// A key handler failed. Passed through unchanged.
    #[error(transparent)]
    Handler(anyhow::Error),
}

/// The cause of a [`Error::Decoding`] failure.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload is not base64url.
    #[error("invalid base64url: {0}")]
    Base64(#[from] base64ct::Error),

    /// The decoded bytes are not UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

impl Error {
    /// The DID resolution error code for the error.
    ///
    /// <https://www.w3.org/TR/did-resolution/#errors>
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalidOptions",
            Self::MalformedIdentifier(_) | Self::Decoding(_) | Self::Parse(_) => "invalidDid",
            Self::UnsupportedKeyType(_) => "unsupportedPublicKeyType",
            Self::NotFound(_) => "notFound",
            Self::Handler(_) => "internalError",
        }
    }

    /// Render the error in `OAuth2`-compatible JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code(),
            "error_description": self.to_string(),
        })
    }
}
