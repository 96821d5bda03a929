//! cristal - wiki entity references
//!
//! Parses, canonicalizes and serializes page, space and attachment
//! identifiers for XWiki, GitHub, Nextcloud and local filesystem wikis, and
//! converts them to and from backend URLs.

pub mod backend;
pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod context;
pub mod errors;
pub mod filesystem;
pub mod github;
pub mod hierarchy;
pub mod markdown;
pub mod nextcloud;
pub mod reference;
pub mod xwiki;

pub use backend::{Backend, BackendKind, BackendRegistry};
pub use config::{Config, WikiConfig};
pub use context::ConverterContext;
pub use errors::{ConfigError, CristalError, ReferenceError};
pub use hierarchy::{HierarchyItem, hierarchy};
pub use reference::{
    AttachmentReference, DocumentReference, EntityReference, EntityType, SpaceReference,
    WikiReference,
};
