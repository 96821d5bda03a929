//! Backend resolution.
//!
//! A [`Backend`] bundles the four codecs of one wiki. The
//! [`BackendRegistry`] maps backend-type strings (`XWiki`, `GitHub`,
//! `Nextcloud`, `FileSystem`) to constructors and builds a [`Backend`] from a
//! [`WikiConfig`] once, at startup.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::codec::{ReferenceParser, ReferenceSerializer, RemoteUrlParser, RemoteUrlSerializer};
use crate::config::WikiConfig;
use crate::constants::{DEFAULT_FS_SCHEME, DEFAULT_XWIKI_WIKI};
use crate::errors::ReferenceError;
use crate::filesystem::FileSystem;
use crate::github::GitHub;
use crate::nextcloud::Nextcloud;
use crate::xwiki::XWiki;

/// The backend types shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    XWiki,
    GitHub,
    Nextcloud,
    FileSystem,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::XWiki,
        BackendKind::GitHub,
        BackendKind::Nextcloud,
        BackendKind::FileSystem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::XWiki => "XWiki",
            BackendKind::GitHub => "GitHub",
            BackendKind::Nextcloud => "Nextcloud",
            BackendKind::FileSystem => "FileSystem",
        }
    }

    /// URL fields a [`WikiConfig`] of this kind must set.
    pub fn required_urls(self) -> &'static [&'static str] {
        match self {
            BackendKind::XWiki | BackendKind::GitHub => &["base_url", "base_rest_url"],
            BackendKind::Nextcloud => &["base_rest_url"],
            BackendKind::FileSystem => &[],
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ReferenceError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ReferenceError::UnknownBackend {
                backend: s.to_string(),
            })
    }
}

/// The resolved codecs of one wiki.
#[derive(Clone)]
pub struct Backend {
    backend_type: String,
    pub(crate) parser: Arc<dyn ReferenceParser>,
    pub(crate) serializer: Arc<dyn ReferenceSerializer>,
    pub(crate) url_parser: Arc<dyn RemoteUrlParser>,
    pub(crate) url_serializer: Arc<dyn RemoteUrlSerializer>,
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("backend_type", &self.backend_type)
            .finish_non_exhaustive()
    }
}

impl Backend {
    /// Wraps a type implementing all four codecs.
    pub fn new<C>(backend_type: impl Into<String>, codec: C) -> Self
    where
        C: ReferenceParser + ReferenceSerializer + RemoteUrlParser + RemoteUrlSerializer + 'static,
    {
        let codec = Arc::new(codec);
        Self {
            backend_type: backend_type.into(),
            parser: codec.clone(),
            serializer: codec.clone(),
            url_parser: codec.clone(),
            url_serializer: codec,
        }
    }

    /// Assembles a backend from independent codecs.
    pub fn from_parts(
        backend_type: impl Into<String>,
        parser: Arc<dyn ReferenceParser>,
        serializer: Arc<dyn ReferenceSerializer>,
        url_parser: Arc<dyn RemoteUrlParser>,
        url_serializer: Arc<dyn RemoteUrlSerializer>,
    ) -> Self {
        Self {
            backend_type: backend_type.into(),
            parser,
            serializer,
            url_parser,
            url_serializer,
        }
    }

    pub fn backend_type(&self) -> &str {
        &self.backend_type
    }
}

/// Builds a [`Backend`] from the configuration of one wiki.
pub type BackendConstructor = fn(&WikiConfig) -> Backend;

fn url_or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn xwiki(config: &WikiConfig) -> Backend {
    let codec = XWiki::new(url_or_empty(&config.base_url), url_or_empty(&config.base_rest_url))
        .with_wiki(config.wiki.as_deref().unwrap_or(DEFAULT_XWIKI_WIKI));
    Backend::new(BackendKind::XWiki.as_str(), codec)
}

fn github(config: &WikiConfig) -> Backend {
    let codec = GitHub::new(url_or_empty(&config.base_url), url_or_empty(&config.base_rest_url));
    Backend::new(BackendKind::GitHub.as_str(), codec)
}

fn nextcloud(config: &WikiConfig) -> Backend {
    Backend::new(
        BackendKind::Nextcloud.as_str(),
        Nextcloud::new(url_or_empty(&config.base_rest_url)),
    )
}

fn filesystem(config: &WikiConfig) -> Backend {
    let scheme = config.scheme.as_deref().unwrap_or(DEFAULT_FS_SCHEME);
    Backend::new(BackendKind::FileSystem.as_str(), FileSystem::new(scheme))
}

/// Maps lowercase backend-type names to constructors.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    constructors: BTreeMap<String, BackendConstructor>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(BackendKind::XWiki.as_str(), xwiki);
        registry.register(BackendKind::GitHub.as_str(), github);
        registry.register(BackendKind::Nextcloud.as_str(), nextcloud);
        registry.register(BackendKind::FileSystem.as_str(), filesystem);
        registry
    }
}

impl BackendRegistry {
    /// A registry without any backend.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the constructor for `backend_type`.
    pub fn register(&mut self, backend_type: &str, constructor: BackendConstructor) {
        self.constructors
            .insert(backend_type.to_ascii_lowercase(), constructor);
    }

    /// Registered backend types, lowercase and sorted.
    pub fn backend_types(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn resolve(&self, config: &WikiConfig) -> Result<Backend, ReferenceError> {
        let constructor = self
            .constructors
            .get(&config.backend.to_ascii_lowercase())
            .ok_or_else(|| ReferenceError::UnknownBackend {
                backend: config.backend.clone(),
            })?;
        tracing::debug!(wiki = %config.name, backend = %config.backend, "resolved backend");
        Ok(constructor(config))
    }
}
