//! Centralized error types for the cristal reference crate.
//!
//! Parsers and serializers return [`ReferenceError`]; configuration loading
//! returns [`ConfigError`]; the binary bubbles everything up as
//! [`CristalError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::reference::EntityType;

/// Top-level error type for the cristal binary.
#[derive(Debug, Error)]
pub enum CristalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Could not resolve `{input}` with the {backend} backend")]
    Unresolved { input: String, backend: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by reference parsers and serializers.
///
/// "No match" is not an error: parsers return `Ok(None)` for input that
/// belongs to another backend, so callers can try the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("Malformed reference `{input}`: {reason}")]
    Malformed { input: String, reason: String },

    #[error("Invalid percent-encoding in `{input}`")]
    InvalidEncoding { input: String },

    #[error("Serializing a {entity_type} reference is not implemented by the {backend} backend")]
    Unsupported {
        backend: &'static str,
        entity_type: EntityType,
    },

    #[error("Unknown backend type: {backend}")]
    UnknownBackend { backend: String },
}

impl ReferenceError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        ReferenceError::Malformed {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors related to configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration parsing failed")]
    ParseFailed(Box<figment::Error>),

    #[error("Failed to canonicalize path: {path}")]
    CanonicalizeFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No wikis configured")]
    NoWikis,

    #[error("Default wiki `{name}` is not configured")]
    UnknownDefaultWiki { name: String },

    #[error("Wiki `{name}` is not configured")]
    UnknownWiki { name: String },

    #[error("Wiki `{name}` uses an unknown backend: {backend}")]
    UnknownBackend { name: String, backend: String },

    #[error("Wiki `{name}` is missing {field}")]
    MissingField { name: String, field: &'static str },

    #[error("Wiki `{name}` has an invalid {field}: {value}")]
    InvalidUrl {
        name: String,
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Wiki `{name}` has an invalid scheme: {scheme}")]
    InvalidScheme { name: String, scheme: String },
}
