use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::backend::BackendKind;
use crate::constants::{CONFIG_DIR, DEFAULT_FS_SCHEME};
use crate::errors::ConfigError;

static SCHEME_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*$").unwrap());

/// Configuration of a single wiki.
///
/// # Examples
///
/// ```toml
/// [wikis.docs]
/// backend = "XWiki"
/// base_url = "http://localhost:8080/xwiki"
/// base_rest_url = "http://localhost:8080/xwiki/rest"
/// wiki = "xwiki"
///
/// [wikis.notes]
/// backend = "FileSystem"
/// scheme = "cristalfs"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WikiConfig {
    /// Filled in from the key of the `[wikis]` table.
    #[serde(default)]
    pub name: String,
    /// Backend type, matched case-insensitively: "XWiki", "GitHub", "Nextcloud" or "FileSystem".
    pub backend: String,
    /// Web root of the wiki (XWiki) or raw content host (GitHub).
    #[serde(default)]
    pub base_url: Option<String>,
    /// REST or WebDAV root used for remote URLs.
    #[serde(default)]
    pub base_rest_url: Option<String>,
    /// XWiki wiki addressed by references without a wiki prefix.
    #[serde(default)]
    pub wiki: Option<String>,
    /// URL scheme of filesystem references.
    #[serde(default)]
    pub scheme: Option<String>,
}

impl WikiConfig {
    fn url_field(&self, field: &str) -> Option<&str> {
        match field {
            "base_url" => self.base_url.as_deref(),
            "base_rest_url" => self.base_rest_url.as_deref(),
            _ => None,
        }
    }

    /// Validates one wiki entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let kind: BackendKind =
            self.backend
                .parse()
                .map_err(|_| ConfigError::UnknownBackend {
                    name: self.name.clone(),
                    backend: self.backend.clone(),
                })?;

        for &field in kind.required_urls() {
            if self.url_field(field).is_none_or(str::is_empty) {
                return Err(ConfigError::MissingField {
                    name: self.name.clone(),
                    field,
                });
            }
        }

        for (field, value) in [
            ("base_url", &self.base_url),
            ("base_rest_url", &self.base_rest_url),
        ] {
            if let Some(value) = value {
                url::Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
                    name: self.name.clone(),
                    field,
                    value: value.clone(),
                    source,
                })?;
            }
        }

        if let Some(scheme) = &self.scheme
            && !SCHEME_NAME_RE.is_match(scheme)
        {
            return Err(ConfigError::InvalidScheme {
                name: self.name.clone(),
                scheme: scheme.clone(),
            });
        }

        Ok(())
    }
}

fn default_wiki_name() -> String {
    "local".to_string()
}

fn default_wikis() -> BTreeMap<String, WikiConfig> {
    let local = WikiConfig {
        name: default_wiki_name(),
        backend: BackendKind::FileSystem.to_string(),
        scheme: Some(DEFAULT_FS_SCHEME.to_string()),
        ..Default::default()
    };
    BTreeMap::from([(default_wiki_name(), local)])
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    /// Wiki used when a command does not name one.
    #[serde(default = "default_wiki_name")]
    pub default_wiki: String,
    /// Configured wikis, keyed by name.
    #[serde(default = "default_wikis")]
    pub wikis: BTreeMap<String, WikiConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            default_wiki: default_wiki_name(),
            wikis: default_wikis(),
        }
    }
}

impl Config {
    pub fn read(search_config_from: &Path) -> Result<Self, ConfigError> {
        let default_config = Config::default();
        let root_dir = Self::find_root_dir(search_config_from);
        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(default_config))
            .merge(Env::prefixed("CRISTAL_").split("__"))
            .merge(Toml::file(root_dir.join(CONFIG_DIR).join("config.toml")))
            .extract()
            .map_err(|e| ConfigError::ParseFailed(Box::new(e)))?;
        tracing::debug!("Loaded config: {:?}", &config);
        config.root_dir = root_dir;
        for (name, wiki) in config.wikis.iter_mut() {
            wiki.name = name.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - at least one wiki is configured
    /// - `default_wiki` names one of them
    /// - every wiki has a known backend, its required URLs, parseable URLs
    ///   and a well-formed scheme
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wikis.is_empty() {
            return Err(ConfigError::NoWikis);
        }

        if !self.wikis.contains_key(&self.default_wiki) {
            return Err(ConfigError::UnknownDefaultWiki {
                name: self.default_wiki.clone(),
            });
        }

        self.wikis.values().try_for_each(WikiConfig::validate)
    }

    /// The configuration of `name`, or of the default wiki.
    pub fn wiki(&self, name: Option<&str>) -> Result<&WikiConfig, ConfigError> {
        let name = name.unwrap_or(&self.default_wiki);
        self.wikis
            .get(name)
            .ok_or_else(|| ConfigError::UnknownWiki {
                name: name.to_string(),
            })
    }

    /// The nearest ancestor of `start` holding a `.cristal` directory, else
    /// the nearest holding `.git`, else the directory of `start` itself.
    fn find_root_dir(start: &Path) -> PathBuf {
        let dir = if start.is_dir() {
            start
        } else {
            start.parent().unwrap_or(start)
        };
        [CONFIG_DIR, ".git"]
            .iter()
            .find_map(|marker| {
                dir.ancestors()
                    .find(|ancestor| ancestor.join(marker).is_dir())
            })
            .unwrap_or(dir)
            .to_path_buf()
    }
}
