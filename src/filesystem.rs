//! Local filesystem references.
//!
//! A document is a directory; the string form is its path relative to the
//! wiki root, with every segment percent-encoded (`Notes/Daily%20log`).
//! Attachments are stored under `<document>/attachments/<file>`. The remote
//! URL form prefixes the path with `<scheme>://` (`cristalfs://` by
//! default); paths carrying any other scheme belong to somebody else.

use crate::codec::{
    ReferenceParser, ReferenceSerializer, RemoteUrlParser, RemoteUrlSerializer, encode_path,
    split_segments, url_scheme,
};
use crate::constants::{ATTACHMENTS_SEGMENT, DEFAULT_FS_SCHEME};
use crate::errors::ReferenceError;
use crate::reference::{
    AttachmentReference, DocumentReference, EntityReference, EntityType, SpaceReference,
};

const BACKEND: &str = "FileSystem";

/// Builds a reference from decoded path segments.
///
/// Returns `None` for `attachments/<file>` with no document in front of it
/// and for wiki hints, which have no path form.
pub(crate) fn reference_from_segments(
    input: &str,
    segments: &[String],
    hint: Option<EntityType>,
) -> Result<Option<EntityReference>, ReferenceError> {
    if segments.is_empty() {
        return Err(ReferenceError::malformed(input, "empty path"));
    }
    let attachment = match segments {
        [document @ .., marker, file] if marker == ATTACHMENTS_SEGMENT => Some((document, file)),
        _ => None,
    };
    let parsed = match (hint, attachment) {
        (Some(EntityType::Wiki), _) => None,
        (Some(EntityType::Space), _) => {
            Some(SpaceReference::new(None, segments.iter().cloned()).into())
        }
        (Some(EntityType::Document), _) => Some(document_from_segments(segments).into()),
        (Some(EntityType::Attachment) | None, Some((document, file))) => {
            if document.is_empty() {
                None
            } else {
                Some(AttachmentReference::new(file.clone(), document_from_segments(document)).into())
            }
        }
        (Some(EntityType::Attachment), None) => {
            return Err(ReferenceError::malformed(
                input,
                "expected `<document>/attachments/<file>`",
            ));
        }
        (None, None) => Some(document_from_segments(segments).into()),
    };
    Ok(parsed)
}

fn document_from_segments(segments: &[String]) -> DocumentReference {
    match segments.split_last() {
        Some((name, [])) => DocumentReference::new(name.clone(), None),
        Some((name, spaces)) => DocumentReference::new(
            name.clone(),
            Some(SpaceReference::new(None, spaces.iter().cloned())),
        ),
        None => DocumentReference::new(String::new(), None),
    }
}

/// Encoded path of a reference, relative to the wiki root.
pub(crate) fn path_of(backend: &'static str, reference: &EntityReference) -> Result<String, ReferenceError> {
    match reference {
        EntityReference::Wiki(_) => Err(ReferenceError::Unsupported {
            backend,
            entity_type: EntityType::Wiki,
        }),
        EntityReference::Space(space) if space.is_root() => Err(ReferenceError::Unsupported {
            backend,
            entity_type: EntityType::Space,
        }),
        EntityReference::Space(space) => Ok(encode_path(&space.names)),
        EntityReference::Document(document) => Ok(encode_path(document_segments(document))),
        EntityReference::Attachment(attachment) => {
            let mut segments = document_segments(&attachment.document);
            segments.push(ATTACHMENTS_SEGMENT.to_string());
            segments.push(attachment.name.clone());
            Ok(encode_path(segments))
        }
    }
}

pub(crate) fn document_segments(document: &DocumentReference) -> Vec<String> {
    let mut segments = document.space_names().to_vec();
    segments.push(document.name.clone());
    segments
}

/// Codecs for a wiki stored on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSystem {
    scheme: String,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new(DEFAULT_FS_SCHEME)
    }
}

impl FileSystem {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The path part of `input`, or `None` when it carries a foreign scheme
    /// anywhere.
    fn local_path<'a>(&self, input: &'a str) -> Option<&'a str> {
        let path = match url_scheme(input) {
            Some(scheme) if scheme == self.scheme => &input[scheme.len() + 3..],
            Some(_) => return None,
            None => input,
        };
        (!path.contains("://")).then_some(path)
    }
}

impl ReferenceParser for FileSystem {
    fn parse(
        &self,
        reference: &str,
        hint: Option<EntityType>,
    ) -> Result<Option<EntityReference>, ReferenceError> {
        let Some(path) = self.local_path(reference) else {
            return Ok(None);
        };
        let segments = split_segments(reference, path)?;
        reference_from_segments(reference, &segments, hint)
    }
}

impl ReferenceSerializer for FileSystem {
    fn serialize(&self, reference: &EntityReference) -> Result<String, ReferenceError> {
        path_of(BACKEND, reference)
    }
}

impl RemoteUrlParser for FileSystem {
    fn parse_url(&self, url: &str) -> Result<Option<EntityReference>, ReferenceError> {
        if url_scheme(url) != Some(self.scheme.as_str()) {
            return Ok(None);
        }
        self.parse(url, None)
    }
}

impl RemoteUrlSerializer for FileSystem {
    fn serialize_url(&self, reference: &EntityReference) -> Result<String, ReferenceError> {
        Ok(format!("{}://{}", self.scheme, path_of(BACKEND, reference)?))
    }
}
