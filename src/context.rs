//! The converter context: the façade the rest of the application talks to.
//!
//! Every operation is total. "No match" and errors both come back as `None`;
//! errors are logged at `debug` level.

use std::fmt::Display;

use crate::backend::{Backend, BackendRegistry};
use crate::config::WikiConfig;
use crate::errors::ReferenceError;
use crate::reference::{EntityReference, EntityType};

/// Reference conversions for one resolved backend.
#[derive(Debug, Clone)]
pub struct ConverterContext {
    backend: Backend,
}

impl ConverterContext {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Resolves the backend of `config` through `registry`.
    pub fn from_config(
        registry: &BackendRegistry,
        config: &WikiConfig,
    ) -> Result<Self, ReferenceError> {
        registry.resolve(config).map(Self::new)
    }

    pub fn backend_type(&self) -> &str {
        self.backend.backend_type()
    }

    pub fn parse_reference(
        &self,
        reference: &str,
        hint: Option<EntityType>,
    ) -> Option<EntityReference> {
        self.settle("parse_reference", reference, self.backend.parser.parse(reference, hint))
    }

    pub fn serialize_reference(&self, reference: &EntityReference) -> Option<String> {
        self.settle(
            "serialize_reference",
            reference.entity_type(),
            self.backend.serializer.serialize(reference).map(Some),
        )
    }

    pub fn parse_reference_from_url(&self, url: &str) -> Option<EntityReference> {
        self.settle(
            "parse_reference_from_url",
            url,
            self.backend.url_parser.parse_url(url),
        )
    }

    pub fn get_url_from_reference(&self, reference: &EntityReference) -> Option<String> {
        self.settle(
            "get_url_from_reference",
            reference.entity_type(),
            self.backend.url_serializer.serialize_url(reference).map(Some),
        )
    }

    pub fn get_display_name(&self, reference: &EntityReference) -> Option<String> {
        self.backend.serializer.display_name(reference)
    }

    fn settle<T>(
        &self,
        operation: &str,
        input: impl Display,
        result: Result<Option<T>, ReferenceError>,
    ) -> Option<T> {
        match result {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                tracing::trace!(backend = self.backend_type(), operation, %input, "no match");
                None
            }
            Err(err) => {
                tracing::debug!(backend = self.backend_type(), operation, %input, "{err}");
                None
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::filesystem::FileSystem;
    use crate::github::GitHub;
    use crate::nextcloud::Nextcloud;
    use crate::xwiki::XWiki;
    use proptest::prelude::*;

    fn contexts() -> Vec<ConverterContext> {
        vec![
            ConverterContext::new(Backend::new(
                "XWiki",
                XWiki::new("http://h/xwiki", "http://h/xwiki/rest"),
            )),
            ConverterContext::new(Backend::new(
                "GitHub",
                GitHub::new("https://raw.example/a/p", "https://api.example/repos/a/p"),
            )),
            ConverterContext::new(Backend::new("Nextcloud", Nextcloud::new("https://dav.example/w"))),
            ConverterContext::new(Backend::new("FileSystem", FileSystem::default())),
        ]
    }

    fn hint() -> impl Strategy<Value = Option<EntityType>> {
        prop::option::of(prop_oneof![
            Just(EntityType::Wiki),
            Just(EntityType::Space),
            Just(EntityType::Document),
            Just(EntityType::Attachment),
        ])
    }

    proptest! {
        /// No input makes the façade panic
        #[test]
        fn prop_parse_never_panics(input in "\\PC{0,40}", hint in hint()) {
            for ctx in contexts() {
                let _ = ctx.parse_reference(&input, hint);
                let _ = ctx.parse_reference_from_url(&input);
            }
        }

        /// Whatever parses also serializes without panicking
        #[test]
        fn prop_serialize_parsed_never_panics(input in "[a-zA-Z0-9./:@\\\\%_ -]{0,30}") {
            for ctx in contexts() {
                if let Some(reference) = ctx.parse_reference(&input, None) {
                    let _ = ctx.serialize_reference(&reference);
                    let _ = ctx.get_url_from_reference(&reference);
                    let _ = ctx.get_display_name(&reference);
                }
            }
        }

        /// Parsing a serialized URL is idempotent
        #[test]
        fn prop_url_parse_is_idempotent(input in "[a-zA-Z0-9./@_-]{1,30}") {
            for ctx in contexts() {
                let Some(reference) = ctx.parse_reference(&input, None) else { continue };
                let Some(url) = ctx.get_url_from_reference(&reference) else { continue };
                let Some(first) = ctx.parse_reference_from_url(&url) else { continue };
                let again = ctx
                    .get_url_from_reference(&first)
                    .and_then(|url| ctx.parse_reference_from_url(&url));
                prop_assert_eq!(again, Some(first));
            }
        }
    }
}
