//! GitHub repository references.
//!
//! Documents are Markdown files and spaces are directories. The string form
//! is the repository path without the `.md` extension (`docs/guide/intro`);
//! attachments live next to their document in a hidden directory
//! (`docs/guide/.intro/attachments/diagram.png`).
//!
//! Remote URLs point at the contents API for documents and spaces
//! (`<base_rest_url>/contents/docs/guide/intro.md`) and at the raw content
//! host for attachments (`<base_url>/docs/guide/.intro/attachments/diagram.png`).

use crate::codec::{
    ReferenceParser, ReferenceSerializer, RemoteUrlParser, RemoteUrlSerializer, encode_path,
    split_segments, strip_base, strip_query,
};
use crate::constants::{ATTACHMENTS_SEGMENT, MARKDOWN_EXTENSION};
use crate::errors::ReferenceError;
use crate::reference::{
    AttachmentReference, DocumentReference, EntityReference, EntityType, SpaceReference,
};

const BACKEND: &str = "GitHub";
const CONTENTS_SEGMENT: &str = "contents";

/// Codecs for a GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHub {
    base_url: String,
    base_rest_url: String,
}

impl GitHub {
    /// `base_url` serves raw file content, `base_rest_url` is the repository
    /// endpoint of the REST API (`https://api.github.com/repos/<owner>/<repo>`).
    pub fn new(base_url: impl Into<String>, base_rest_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_rest_url: base_rest_url.into(),
        }
    }

    fn space(names: &[String]) -> Option<SpaceReference> {
        if names.is_empty() {
            None
        } else {
            Some(SpaceReference::new(None, names.iter().cloned()))
        }
    }

    fn document(spaces: &[String], name: &str) -> DocumentReference {
        DocumentReference::terminal(name, Self::space(spaces))
    }

    /// Matches `.../.<document>/attachments/<file>`.
    fn attachment(segments: &[String]) -> Option<AttachmentReference> {
        match segments {
            [spaces @ .., hidden, marker, file] if marker == ATTACHMENTS_SEGMENT => {
                let name = hidden.strip_prefix('.').filter(|name| !name.is_empty())?;
                Some(AttachmentReference::new(
                    file.clone(),
                    Self::document(spaces, name),
                ))
            }
            _ => None,
        }
    }

    /// Documents parsed from content paths lose one `.md` extension. Other
    /// files are not wiki content; extension-less paths are directories.
    fn content_entity(segments: &[String]) -> Option<EntityReference> {
        if let Some(attachment) = Self::attachment(segments) {
            return Some(attachment.into());
        }
        match segments.split_last() {
            Some((last, spaces)) => match last.strip_suffix(MARKDOWN_EXTENSION) {
                Some(name) if !name.is_empty() => Some(Self::document(spaces, name).into()),
                _ if has_extension(last) => None,
                _ => Some(SpaceReference::new(None, segments.iter().cloned()).into()),
            },
            None => Some(SpaceReference::default().into()),
        }
    }

    fn document_path(document: &DocumentReference) -> Vec<String> {
        let mut segments = document.space_names().to_vec();
        segments.push(document.name.clone());
        segments
    }

    fn attachment_path(attachment: &AttachmentReference) -> Vec<String> {
        let mut segments = attachment.document.space_names().to_vec();
        segments.push(format!(".{}", attachment.document.name));
        segments.push(ATTACHMENTS_SEGMENT.to_string());
        segments.push(attachment.name.clone());
        segments
    }

    fn unsupported(entity_type: EntityType) -> ReferenceError {
        ReferenceError::Unsupported {
            backend: BACKEND,
            entity_type,
        }
    }
}

impl ReferenceParser for GitHub {
    fn parse(
        &self,
        reference: &str,
        hint: Option<EntityType>,
    ) -> Result<Option<EntityReference>, ReferenceError> {
        let segments = split_segments(reference, reference)?;
        let Some((last, spaces)) = segments.split_last() else {
            return Err(ReferenceError::malformed(reference, "empty reference"));
        };
        let parsed: EntityReference = match hint {
            // Repositories are the wiki; they have no path form.
            Some(EntityType::Wiki) => return Ok(None),
            Some(EntityType::Space) => SpaceReference::new(None, segments.iter().cloned()).into(),
            Some(EntityType::Attachment) => Self::attachment(&segments)
                .ok_or_else(|| {
                    ReferenceError::malformed(reference, "expected `.<document>/attachments/<file>`")
                })?
                .into(),
            Some(EntityType::Document) => Self::document(spaces, last).into(),
            None => match Self::attachment(&segments) {
                Some(attachment) => attachment.into(),
                None => Self::document(spaces, last).into(),
            },
        };
        Ok(Some(parsed))
    }
}

impl ReferenceSerializer for GitHub {
    fn serialize(&self, reference: &EntityReference) -> Result<String, ReferenceError> {
        match reference {
            EntityReference::Wiki(_) => Err(Self::unsupported(EntityType::Wiki)),
            EntityReference::Space(space) if space.is_root() => {
                Err(Self::unsupported(EntityType::Space))
            }
            EntityReference::Space(space) => Ok(encode_path(&space.names)),
            EntityReference::Document(document) => Ok(encode_path(Self::document_path(document))),
            EntityReference::Attachment(attachment) => {
                Ok(encode_path(Self::attachment_path(attachment)))
            }
        }
    }
}

fn has_extension(file: &str) -> bool {
    file.rfind('.').is_some_and(|pos| pos > 0)
}

impl RemoteUrlParser for GitHub {
    fn parse_url(&self, url: &str) -> Result<Option<EntityReference>, ReferenceError> {
        let path = strip_query(url);
        if let Some(rest) = strip_base(path, &self.base_rest_url) {
            let segments = split_segments(url, rest)?;
            return match segments.split_first() {
                Some((contents, tail)) if contents == CONTENTS_SEGMENT => {
                    Ok(Self::content_entity(tail))
                }
                _ => Ok(None),
            };
        }
        if let Some(rest) = strip_base(path, &self.base_url) {
            let segments = split_segments(url, rest)?;
            if let Some(attachment) = Self::attachment(&segments) {
                return Ok(Some(attachment.into()));
            }
            return match segments.split_last() {
                Some((last, spaces)) => Ok(last
                    .strip_suffix(MARKDOWN_EXTENSION)
                    .filter(|name| !name.is_empty())
                    .map(|name| Self::document(spaces, name).into())),
                None => Ok(None),
            };
        }
        Ok(None)
    }
}

impl RemoteUrlSerializer for GitHub {
    fn serialize_url(&self, reference: &EntityReference) -> Result<String, ReferenceError> {
        let contents = format!(
            "{}/{CONTENTS_SEGMENT}",
            self.base_rest_url.trim_end_matches('/')
        );
        match reference {
            EntityReference::Wiki(_) => Err(Self::unsupported(EntityType::Wiki)),
            EntityReference::Space(space) if space.is_root() => Ok(contents),
            EntityReference::Space(space) => Ok(format!("{contents}/{}", encode_path(&space.names))),
            EntityReference::Document(document) => Ok(format!(
                "{contents}/{}{MARKDOWN_EXTENSION}",
                encode_path(Self::document_path(document))
            )),
            EntityReference::Attachment(attachment) => Ok(format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                encode_path(Self::attachment_path(attachment))
            )),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        // No leading dot, so documents never look like attachment directories
        "[a-zA-Z0-9 _/-][a-zA-Z0-9 ._/-]{0,10}"
            .prop_filter("reserved", |s| s != ATTACHMENTS_SEGMENT)
    }

    fn document() -> impl Strategy<Value = DocumentReference> {
        (prop::collection::vec(segment(), 0..4), segment()).prop_map(|(spaces, name)| {
            let space = if spaces.is_empty() {
                None
            } else {
                Some(SpaceReference::new(None, spaces))
            };
            DocumentReference::terminal(name, space)
        })
    }

    fn github() -> GitHub {
        GitHub::new(
            "https://raw.githubusercontent.com/a/p/main",
            "https://api.github.com/repos/a/p",
        )
    }

    proptest! {
        /// Document strings round-trip through the path form
        #[test]
        fn prop_document_string_round_trip(document in document()) {
            let gh = github();
            let reference: EntityReference = document.into();
            let serialized = gh.serialize(&reference).unwrap();
            prop_assert_eq!(gh.parse(&serialized, None).unwrap(), Some(reference));
        }

        /// Document URLs round-trip through the contents API
        #[test]
        fn prop_document_url_round_trip(document in document()) {
            let gh = github();
            let reference: EntityReference = document.into();
            let url = gh.serialize_url(&reference).unwrap();
            prop_assert_eq!(gh.parse_url(&url).unwrap(), Some(reference));
        }

        /// Attachment URLs round-trip through the raw content host
        #[test]
        fn prop_attachment_url_round_trip(document in document(), file in segment()) {
            let gh = github();
            let reference: EntityReference = AttachmentReference::new(file, document).into();
            let url = gh.serialize_url(&reference).unwrap();
            prop_assert_eq!(gh.parse_url(&url).unwrap(), Some(reference));
        }

        /// Query strings never leak into the parsed reference
        #[test]
        fn prop_query_never_leaks(document in document(), query in "[a-z]{1,6}=[a-z0-9]{1,6}") {
            let gh = github();
            let reference: EntityReference = document.into();
            let url = format!("{}?{}", gh.serialize_url(&reference).unwrap(), query);
            prop_assert_eq!(gh.parse_url(&url).unwrap(), Some(reference));
        }
    }
}
