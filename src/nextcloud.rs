//! Nextcloud references.
//!
//! Reference strings follow the filesystem convention (see
//! [`crate::filesystem`]). Remote URLs are WebDAV URLs below the wiki root:
//! `<base_rest_url>/A/B/Page/page.json` for a document and
//! `<base_rest_url>/A/B/Page/attachments/file.png` for an attachment.

use crate::codec::{
    ReferenceParser, ReferenceSerializer, RemoteUrlParser, RemoteUrlSerializer, encode_path,
    split_segments, strip_base, strip_query,
};
use crate::constants::{ATTACHMENTS_SEGMENT, NEXTCLOUD_PAGE_FILE};
use crate::errors::ReferenceError;
use crate::filesystem::{document_segments, path_of, reference_from_segments};
use crate::reference::{
    AttachmentReference, DocumentReference, EntityReference, EntityType, SpaceReference,
};

const BACKEND: &str = "Nextcloud";

/// Codecs for a wiki stored in a Nextcloud folder.
#[derive(Debug, Clone)]
pub struct Nextcloud {
    base_rest_url: String,
}

impl Nextcloud {
    /// `base_rest_url` is the WebDAV URL of the wiki root folder.
    pub fn new(base_rest_url: impl Into<String>) -> Self {
        Self {
            base_rest_url: base_rest_url.into(),
        }
    }

    fn root(&self) -> &str {
        self.base_rest_url.trim_end_matches('/')
    }
}

fn document(segments: &[String]) -> Option<DocumentReference> {
    let (name, spaces) = segments.split_last()?;
    let space = if spaces.is_empty() {
        None
    } else {
        Some(SpaceReference::new(None, spaces.iter().cloned()))
    };
    Some(DocumentReference::new(name.clone(), space))
}

impl ReferenceParser for Nextcloud {
    fn parse(
        &self,
        reference: &str,
        hint: Option<EntityType>,
    ) -> Result<Option<EntityReference>, ReferenceError> {
        let segments = split_segments(reference, reference)?;
        reference_from_segments(reference, &segments, hint)
    }
}

impl ReferenceSerializer for Nextcloud {
    fn serialize(&self, reference: &EntityReference) -> Result<String, ReferenceError> {
        path_of(BACKEND, reference)
    }
}

impl RemoteUrlParser for Nextcloud {
    fn parse_url(&self, url: &str) -> Result<Option<EntityReference>, ReferenceError> {
        let Some(rest) = strip_base(strip_query(url), self.root()) else {
            return Ok(None);
        };
        let segments = split_segments(url, rest)?;
        let parsed = match segments.as_slice() {
            [] => None,
            [path @ .., marker, file] if marker == ATTACHMENTS_SEGMENT => {
                document(path).map(|doc| AttachmentReference::new(file.clone(), doc).into())
            }
            [path @ .., file] if file == NEXTCLOUD_PAGE_FILE => document(path).map(Into::into),
            names => Some(SpaceReference::new(None, names.iter().cloned()).into()),
        };
        Ok(parsed)
    }
}

impl RemoteUrlSerializer for Nextcloud {
    fn serialize_url(&self, reference: &EntityReference) -> Result<String, ReferenceError> {
        let root = self.root();
        match reference {
            EntityReference::Document(doc) => Ok(format!(
                "{root}/{}/{NEXTCLOUD_PAGE_FILE}",
                encode_path(document_segments(doc))
            )),
            other => Ok(format!("{root}/{}", path_of(BACKEND, other)?)),
        }
    }
}
