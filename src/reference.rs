//! The entity reference model.
//!
//! An [`EntityReference`] addresses a wiki, a (nested) space, a document or an
//! attachment. References are plain values: equality is structural and they
//! carry no backend-specific state. Backends convert them to and from strings
//! and URLs (see [`crate::codec`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminant of an [`EntityReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Wiki,
    Space,
    Document,
    Attachment,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Wiki => "wiki",
            EntityType::Space => "space",
            EntityType::Document => "document",
            EntityType::Attachment => "attachment",
        };
        f.write_str(name)
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wiki" => Ok(EntityType::Wiki),
            "space" => Ok(EntityType::Space),
            "document" => Ok(EntityType::Document),
            "attachment" => Ok(EntityType::Attachment),
            _ => Err(format!(
                "unknown entity type `{s}` (expected wiki, space, document or attachment)"
            )),
        }
    }
}

/// A wiki or repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WikiReference {
    pub name: String,
}

impl WikiReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A nested sequence of spaces, optionally anchored to a wiki.
///
/// `names` is ordered from the outermost space to the innermost one and may
/// be empty, in which case the reference denotes the root space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpaceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<WikiReference>,
    pub names: Vec<String>,
}

impl SpaceReference {
    pub fn new<I, S>(wiki: Option<WikiReference>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            wiki,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// True for the root space (no segments).
    pub fn is_root(&self) -> bool {
        self.names.is_empty()
    }

    /// The enclosing space, or `None` for a top-level or root space.
    pub fn parent_space(&self) -> Option<SpaceReference> {
        if self.names.len() < 2 {
            return None;
        }
        Some(SpaceReference {
            wiki: self.wiki.clone(),
            names: self.names[..self.names.len() - 1].to_vec(),
        })
    }

    /// Every space from the outermost to this one, each as its own reference.
    ///
    /// `A.B.C` yields `A`, `A.B`, `A.B.C`.
    pub fn prefixes(&self) -> impl Iterator<Item = SpaceReference> + '_ {
        (1..=self.names.len()).map(|len| SpaceReference {
            wiki: self.wiki.clone(),
            names: self.names[..len].to_vec(),
        })
    }
}

/// A page, optionally inside a space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<SpaceReference>,
    pub name: String,
    /// A terminal page has no child pages. Non-terminal pages also act as the
    /// container of the pages below them.
    #[serde(default)]
    pub terminal: bool,
}

impl DocumentReference {
    /// A non-terminal document.
    pub fn new(name: impl Into<String>, space: Option<SpaceReference>) -> Self {
        Self {
            space,
            name: name.into(),
            terminal: false,
        }
    }

    pub fn terminal(name: impl Into<String>, space: Option<SpaceReference>) -> Self {
        Self {
            space,
            name: name.into(),
            terminal: true,
        }
    }

    /// Space segments, empty when the document has no space.
    pub fn space_names(&self) -> &[String] {
        self.space.as_ref().map(|s| s.names.as_slice()).unwrap_or(&[])
    }

    pub fn wiki(&self) -> Option<&WikiReference> {
        self.space.as_ref().and_then(|s| s.wiki.as_ref())
    }
}

/// A file attached to a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentReference {
    pub document: DocumentReference,
    pub name: String,
}

impl AttachmentReference {
    pub fn new(name: impl Into<String>, document: DocumentReference) -> Self {
        Self {
            document,
            name: name.into(),
        }
    }
}

/// Any addressable wiki entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityReference {
    Wiki(WikiReference),
    Space(SpaceReference),
    Document(DocumentReference),
    Attachment(AttachmentReference),
}

impl EntityReference {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityReference::Wiki(_) => EntityType::Wiki,
            EntityReference::Space(_) => EntityType::Space,
            EntityReference::Document(_) => EntityType::Document,
            EntityReference::Attachment(_) => EntityType::Attachment,
        }
    }

    /// The name of the entity itself. For a space this is its innermost
    /// segment; the root space has no name.
    pub fn name(&self) -> Option<&str> {
        match self {
            EntityReference::Wiki(wiki) => Some(&wiki.name),
            EntityReference::Space(space) => space.names.last().map(String::as_str),
            EntityReference::Document(document) => Some(&document.name),
            EntityReference::Attachment(attachment) => Some(&attachment.name),
        }
    }

    /// The wiki this entity is anchored to, if any.
    pub fn wiki(&self) -> Option<&WikiReference> {
        match self {
            EntityReference::Wiki(wiki) => Some(wiki),
            EntityReference::Space(space) => space.wiki.as_ref(),
            EntityReference::Document(document) => document.wiki(),
            EntityReference::Attachment(attachment) => attachment.document.wiki(),
        }
    }

    /// The containing entity: attachment → document → space → parent space →
    /// wiki.
    pub fn parent(&self) -> Option<EntityReference> {
        match self {
            EntityReference::Wiki(_) => None,
            EntityReference::Space(space) => match space.parent_space() {
                Some(parent) => Some(parent.into()),
                None => space.wiki.clone().map(Into::into),
            },
            EntityReference::Document(document) => document.space.clone().map(Into::into),
            EntityReference::Attachment(attachment) => Some(attachment.document.clone().into()),
        }
    }

    pub fn as_document(&self) -> Option<&DocumentReference> {
        match self {
            EntityReference::Document(document) => Some(document),
            _ => None,
        }
    }
}

impl From<WikiReference> for EntityReference {
    fn from(value: WikiReference) -> Self {
        EntityReference::Wiki(value)
    }
}

impl From<SpaceReference> for EntityReference {
    fn from(value: SpaceReference) -> Self {
        EntityReference::Space(value)
    }
}

impl From<DocumentReference> for EntityReference {
    fn from(value: DocumentReference) -> Self {
        EntityReference::Document(value)
    }
}

impl From<AttachmentReference> for EntityReference {
    fn from(value: AttachmentReference) -> Self {
        EntityReference::Attachment(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(names: &[&str]) -> SpaceReference {
        SpaceReference::new(None, names.iter().copied())
    }

    #[test]
    fn test_structural_equality() {
        let a = DocumentReference::new("WebHome", Some(space(&["A", "B"])));
        let b = DocumentReference::new("WebHome", Some(space(&["A", "B"])));
        assert_eq!(a, b);

        let c = DocumentReference::terminal("WebHome", Some(space(&["A", "B"])));
        assert_ne!(a, c);

        let d = DocumentReference::new("WebHome", Some(space(&["B", "A"])));
        assert_ne!(a, d);
    }

    #[test]
    fn test_entity_type_matches_variant() {
        let wiki: EntityReference = WikiReference::new("xwiki").into();
        let space_ref: EntityReference = space(&["A"]).into();
        let document: EntityReference = DocumentReference::new("P", None).into();
        let attachment: EntityReference =
            AttachmentReference::new("f.png", DocumentReference::new("P", None)).into();

        assert_eq!(wiki.entity_type(), EntityType::Wiki);
        assert_eq!(space_ref.entity_type(), EntityType::Space);
        assert_eq!(document.entity_type(), EntityType::Document);
        assert_eq!(attachment.entity_type(), EntityType::Attachment);
    }

    #[test]
    fn test_root_space_has_no_name() {
        let root: EntityReference = SpaceReference::default().into();
        assert_eq!(root.name(), None);
        assert!(SpaceReference::default().is_root());
    }

    #[test]
    fn test_parent_chain() {
        let wiki = WikiReference::new("main");
        let doc = DocumentReference::new(
            "Page",
            Some(SpaceReference::new(Some(wiki.clone()), ["A", "B"])),
        );
        let attachment: EntityReference = AttachmentReference::new("f.txt", doc.clone()).into();

        let parent = attachment.parent().unwrap();
        assert_eq!(parent, EntityReference::Document(doc));

        let space_ref = parent.parent().unwrap();
        assert_eq!(space_ref.name(), Some("B"));

        let outer = space_ref.parent().unwrap();
        assert_eq!(outer.name(), Some("A"));

        assert_eq!(outer.parent(), Some(EntityReference::Wiki(wiki)));
    }

    #[test]
    fn test_space_prefixes() {
        let prefixes: Vec<_> = space(&["A", "B", "C"]).prefixes().collect();
        assert_eq!(prefixes, vec![space(&["A"]), space(&["A", "B"]), space(&["A", "B", "C"])]);
    }

    #[test]
    fn test_wiki_lookup_through_attachment() {
        let doc = DocumentReference::new(
            "P",
            Some(SpaceReference::new(Some(WikiReference::new("w")), ["S"])),
        );
        let attachment: EntityReference = AttachmentReference::new("a", doc).into();
        assert_eq!(attachment.wiki().map(|w| w.name.as_str()), Some("w"));
    }

    #[test]
    fn test_entity_type_from_str() {
        assert_eq!("Document".parse::<EntityType>(), Ok(EntityType::Document));
        assert_eq!("space".parse::<EntityType>(), Ok(EntityType::Space));
        assert!("page".parse::<EntityType>().is_err());
        for entity_type in [EntityType::Wiki, EntityType::Attachment] {
            assert_eq!(entity_type.to_string().parse(), Ok(entity_type));
        }
    }

    #[test]
    fn test_serde_tagged_representation() {
        let reference: EntityReference =
            DocumentReference::new("WebHome", Some(space(&["Main"]))).into();
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["name"], "WebHome");
        assert_eq!(json["space"]["names"][0], "Main");

        let back: EntityReference = serde_json::from_value(json).unwrap();
        assert_eq!(back, reference);
    }
}
