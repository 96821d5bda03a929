//! XWiki references.
//!
//! String form: `wiki:Space1.Space2.Page@attachment.png`. Inside a segment
//! the separators `.`, `:` and `@` are escaped with a backslash, and so is the
//! backslash itself. Parsing is right to left, like XWiki does it: the last
//! `@` splits off the attachment, the last `.` splits off the page, the last
//! `:` before it splits off the wiki.
//!
//! Remote URLs are REST URLs:
//! `<base_rest_url>/wikis/<wiki>/spaces/<s1>/spaces/<s2>/pages/<page>`.

use crate::codec::{
    COMPONENT, ReferenceParser, ReferenceSerializer, RemoteUrlParser, RemoteUrlSerializer,
    split_path, strip_base, strip_query,
};
use crate::constants::{DEFAULT_XWIKI_WIKI, WEB_HOME};
use crate::errors::ReferenceError;
use crate::reference::{
    AttachmentReference, DocumentReference, EntityReference, EntityType, SpaceReference,
    WikiReference,
};
use percent_encoding::{AsciiSet, utf8_percent_encode};

const ESCAPE: char = '\\';
const SPACE_SEPARATOR: char = '.';
const WIKI_SEPARATOR: char = ':';
const ATTACHMENT_SEPARATOR: char = '@';

/// Like [`COMPONENT`] but also encodes `.`, so escaped dots stay visible as
/// `%2E` in REST paths.
const REST_SEGMENT: &AsciiSet = &COMPONENT.add(b'.');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Char(char),
    Separator(char),
}

impl Token {
    fn as_char(self) -> char {
        match self {
            Token::Char(c) | Token::Separator(c) => c,
        }
    }
}

/// Splits the input into literal characters and unescaped separators.
///
/// A backslash always consumes the character that follows it, so a run of
/// backslashes is resolved pairwise from the left: `\\\.` is an escaped
/// backslash followed by an escaped dot. A trailing lone backslash is kept
/// as a literal.
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => tokens.push(Token::Char(chars.next().unwrap_or(ESCAPE))),
            SPACE_SEPARATOR | WIKI_SEPARATOR | ATTACHMENT_SEPARATOR => {
                tokens.push(Token::Separator(c))
            }
            _ => tokens.push(Token::Char(c)),
        }
    }
    tokens
}

fn literal(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.as_char()).collect()
}

fn last_separator(tokens: &[Token], separator: char) -> Option<usize> {
    tokens
        .iter()
        .rposition(|t| *t == Token::Separator(separator))
}

fn split_tokens(tokens: &[Token], separator: char) -> impl Iterator<Item = &[Token]> {
    tokens.split(move |t| *t == Token::Separator(separator))
}

/// Characters escaped in wiki and space names.
const SPACE_SPECIALS: &[char] = &[ESCAPE, SPACE_SEPARATOR, WIKI_SEPARATOR, ATTACHMENT_SEPARATOR];
/// Page names are split off before the wiki, so `:` stays literal.
const PAGE_SPECIALS: &[char] = &[ESCAPE, SPACE_SEPARATOR, ATTACHMENT_SEPARATOR];
const ATTACHMENT_SPECIALS: &[char] = &[ESCAPE, ATTACHMENT_SEPARATOR];

fn escape_with(segment: &str, specials: &[char]) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for c in segment.chars() {
        if specials.contains(&c) {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Escapes a wiki or space name for the dotted string form.
pub fn escape(segment: &str) -> String {
    escape_with(segment, SPACE_SPECIALS)
}

/// Splits on unescaped `separator`, keeping escape sequences verbatim.
fn split_unescaped(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == ESCAPE {
            chars.next();
        } else if c == separator {
            parts.push(&input[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

fn rest_segment(segment: &str) -> String {
    utf8_percent_encode(segment, REST_SEGMENT).to_string()
}

/// REST URL of a dotted document identifier.
///
/// The last unescaped dot becomes the `/pages/` boundary and every earlier
/// one a `/spaces/` boundary. Escape sequences are kept inside the segment
/// and percent-encoded with it. An identifier without any unescaped dot is a
/// page name on its own.
///
/// ```
/// use cristal::xwiki::rest_url;
///
/// assert_eq!(
///     rest_url("http://localhost:8080/xwiki/rest", "xwiki", "Space1.Space2.WebHome"),
///     "http://localhost:8080/xwiki/rest/wikis/xwiki/spaces/Space1/spaces/Space2/pages/WebHome"
/// );
/// assert_eq!(
///     rest_url("http://h/rest", "xwiki", r"Space1\.Space\2.Web/Home"),
///     "http://h/rest/wikis/xwiki/spaces/Space1%5C%2ESpace%5C2/pages/Web%2FHome"
/// );
/// ```
pub fn rest_url(base_rest_url: &str, wiki: &str, document_id: &str) -> String {
    let mut segments = split_unescaped(document_id, SPACE_SEPARATOR);
    let page = segments.pop().unwrap_or_default();
    let mut url = format!(
        "{}/wikis/{}",
        base_rest_url.trim_end_matches('/'),
        rest_segment(wiki)
    );
    for space in segments {
        url.push_str("/spaces/");
        url.push_str(&rest_segment(space));
    }
    url.push_str("/pages/");
    url.push_str(&rest_segment(page));
    url
}

/// Codecs for an XWiki instance.
#[derive(Debug, Clone)]
pub struct XWiki {
    base_url: String,
    base_rest_url: String,
    wiki: String,
}

impl XWiki {
    pub fn new(base_url: impl Into<String>, base_rest_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_rest_url: base_rest_url.into(),
            wiki: DEFAULT_XWIKI_WIKI.to_string(),
        }
    }

    /// Sets the wiki used for references that are not anchored to one.
    pub fn with_wiki(mut self, wiki: impl Into<String>) -> Self {
        self.wiki = wiki.into();
        self
    }

    fn non_empty(input: &str, value: String, what: &str) -> Result<String, ReferenceError> {
        if value.is_empty() {
            Err(ReferenceError::malformed(input, format!("empty {what}")))
        } else {
            Ok(value)
        }
    }

    fn parse_space_tokens(
        input: &str,
        tokens: &[Token],
    ) -> Result<SpaceReference, ReferenceError> {
        let (wiki, rest) = match last_separator(tokens, WIKI_SEPARATOR) {
            Some(pos) => {
                let name = Self::non_empty(input, literal(&tokens[..pos]), "wiki name")?;
                (Some(WikiReference::new(name)), &tokens[pos + 1..])
            }
            None => (None, tokens),
        };
        let names = split_tokens(rest, SPACE_SEPARATOR)
            .map(|segment| Self::non_empty(input, literal(segment), "space name"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SpaceReference { wiki, names })
    }

    fn parse_document_tokens(
        input: &str,
        tokens: &[Token],
    ) -> Result<DocumentReference, ReferenceError> {
        let (space, name_tokens) = match last_separator(tokens, SPACE_SEPARATOR) {
            Some(pos) => (
                Some(Self::parse_space_tokens(input, &tokens[..pos])?),
                &tokens[pos + 1..],
            ),
            None => (None, tokens),
        };
        // `Space.` names the home page of `Space`
        let name = match literal(name_tokens) {
            name if name.is_empty() && space.is_some() => WEB_HOME.to_string(),
            name => Self::non_empty(input, name, "page name")?,
        };
        let terminal = name != WEB_HOME;
        Ok(DocumentReference {
            space,
            name,
            terminal,
        })
    }

    fn parse_attachment_tokens(
        input: &str,
        tokens: &[Token],
        position: usize,
    ) -> Result<AttachmentReference, ReferenceError> {
        let document = Self::parse_document_tokens(input, &tokens[..position])?;
        let name = Self::non_empty(input, literal(&tokens[position + 1..]), "attachment name")?;
        Ok(AttachmentReference { document, name })
    }

    fn serialize_space(space: &SpaceReference) -> Result<String, ReferenceError> {
        if space.names.is_empty() {
            return Err(ReferenceError::Unsupported {
                backend: "XWiki",
                entity_type: EntityType::Space,
            });
        }
        let names = space
            .names
            .iter()
            .map(|name| escape(name))
            .collect::<Vec<_>>()
            .join(".");
        Ok(match &space.wiki {
            Some(wiki) => format!("{}{WIKI_SEPARATOR}{names}", escape(&wiki.name)),
            None => names,
        })
    }

    fn serialize_document(document: &DocumentReference) -> Result<String, ReferenceError> {
        match &document.space {
            Some(space) if !space.names.is_empty() => Ok(format!(
                "{}{SPACE_SEPARATOR}{}",
                Self::serialize_space(space)?,
                escape_with(&document.name, PAGE_SPECIALS)
            )),
            Some(space) if space.wiki.is_some() => Err(ReferenceError::malformed(
                &document.name,
                "a wiki-anchored document needs at least one space",
            )),
            _ => Ok(escape_with(&document.name, PAGE_SPECIALS)),
        }
    }

    /// Canonical dotted identifier of a document, without its wiki.
    fn document_id(document: &DocumentReference) -> Result<String, ReferenceError> {
        let unanchored = DocumentReference {
            space: document.space.as_ref().map(|space| SpaceReference {
                wiki: None,
                names: space.names.clone(),
            }),
            ..document.clone()
        };
        Self::serialize_document(&unanchored)
    }

    fn wiki_name<'a>(&'a self, reference: &'a EntityReference) -> &'a str {
        reference
            .wiki()
            .map(|wiki| wiki.name.as_str())
            .unwrap_or(&self.wiki)
    }

    fn wiki_for_url(&self, name: &str) -> Option<WikiReference> {
        if name == self.wiki {
            None
        } else {
            Some(WikiReference::new(name))
        }
    }

    /// Parses `spaces/<a>/spaces/<b>/pages/<p>[/attachments/<f>]`.
    ///
    /// Space and page segments carry the escaped string form, the attachment
    /// segment is the raw file name.
    fn parse_rest_path(
        &self,
        url: &str,
        wiki: Option<WikiReference>,
        segments: &[String],
    ) -> Result<Option<EntityReference>, ReferenceError> {
        let mut names = Vec::new();
        let mut page: Option<String> = None;
        let mut attachment: Option<String> = None;
        for pair in segments.chunks(2) {
            let [kind, value] = pair else {
                return Ok(None);
            };
            let value = literal(&tokenize(value));
            match kind.as_str() {
                "spaces" if page.is_none() => {
                    names.push(Self::non_empty(url, value, "space name")?)
                }
                "pages" if page.is_none() => page = Some(value),
                "attachments" if page.is_some() && attachment.is_none() => {
                    attachment = Some(pair[1].clone())
                }
                _ => return Ok(None),
            }
        }

        let Some(page) = page else {
            return Ok(Some(SpaceReference { wiki, names }.into()));
        };
        let space = if names.is_empty() && wiki.is_none() {
            None
        } else {
            Some(SpaceReference { wiki, names })
        };
        let name = Self::non_empty(url, page, "page name")?;
        let document = DocumentReference {
            terminal: name != WEB_HOME,
            space,
            name,
        };
        Ok(Some(match attachment {
            Some(file) => AttachmentReference::new(file, document).into(),
            None => document.into(),
        }))
    }

    /// Parses legacy `/bin/view/...` and `/bin/download/...` page URLs.
    fn parse_action_path(
        &self,
        url: &str,
        segments: &[String],
    ) -> Result<Option<EntityReference>, ReferenceError> {
        if segments.iter().any(String::is_empty) {
            return Err(ReferenceError::malformed(url, "empty path segment"));
        }
        match segments {
            [action, spaces @ ..] if action == "view" && !spaces.is_empty() => Ok(Some(
                DocumentReference::new(
                    WEB_HOME,
                    Some(SpaceReference::new(None, spaces.iter().cloned())),
                )
                .into(),
            )),
            [action, spaces @ .., page, file] if action == "download" && !spaces.is_empty() => {
                let document = DocumentReference {
                    space: Some(SpaceReference::new(None, spaces.iter().cloned())),
                    name: page.clone(),
                    terminal: page != WEB_HOME,
                };
                Ok(Some(AttachmentReference::new(file.clone(), document).into()))
            }
            _ => Ok(None),
        }
    }
}

impl ReferenceParser for XWiki {
    fn parse(
        &self,
        reference: &str,
        hint: Option<EntityType>,
    ) -> Result<Option<EntityReference>, ReferenceError> {
        if reference.is_empty() {
            return Err(ReferenceError::malformed(reference, "empty reference"));
        }
        let tokens = tokenize(reference);
        let parsed: EntityReference = match hint {
            Some(EntityType::Wiki) => WikiReference::new(literal(&tokens)).into(),
            Some(EntityType::Space) => Self::parse_space_tokens(reference, &tokens)?.into(),
            Some(EntityType::Attachment) => {
                let position = last_separator(&tokens, ATTACHMENT_SEPARATOR).ok_or_else(|| {
                    ReferenceError::malformed(reference, "missing `@` before the attachment name")
                })?;
                Self::parse_attachment_tokens(reference, &tokens, position)?.into()
            }
            Some(EntityType::Document) => Self::parse_document_tokens(reference, &tokens)?.into(),
            None => match last_separator(&tokens, ATTACHMENT_SEPARATOR) {
                Some(position) => {
                    Self::parse_attachment_tokens(reference, &tokens, position)?.into()
                }
                None => Self::parse_document_tokens(reference, &tokens)?.into(),
            },
        };
        Ok(Some(parsed))
    }
}

impl ReferenceSerializer for XWiki {
    fn serialize(&self, reference: &EntityReference) -> Result<String, ReferenceError> {
        match reference {
            EntityReference::Wiki(wiki) => Ok(escape(&wiki.name)),
            EntityReference::Space(space) => Self::serialize_space(space),
            EntityReference::Document(document) => Self::serialize_document(document),
            EntityReference::Attachment(attachment) => Ok(format!(
                "{}{ATTACHMENT_SEPARATOR}{}",
                Self::serialize_document(&attachment.document)?,
                escape_with(&attachment.name, ATTACHMENT_SPECIALS)
            )),
        }
    }

    /// The home page of a space is labelled with the space name.
    fn display_name(&self, reference: &EntityReference) -> Option<String> {
        match reference {
            EntityReference::Document(document) if document.name == WEB_HOME => document
                .space_names()
                .last()
                .or(Some(&document.name))
                .cloned(),
            _ => reference.name().map(str::to_string),
        }
    }
}

/// REST URLs always name a wiki. A URL on the configured wiki parses back
/// without a [`WikiReference`], so `xwiki:A.B` and `A.B` share one URL and
/// both come back as `A.B`.
impl RemoteUrlParser for XWiki {
    fn parse_url(&self, url: &str) -> Result<Option<EntityReference>, ReferenceError> {
        let path = strip_query(url);
        if let Some(rest) = strip_base(path, &self.base_rest_url) {
            let segments = split_path(rest)?;
            let [wikis, wiki, tail @ ..] = segments.as_slice() else {
                return Ok(None);
            };
            if wikis != "wikis" || wiki.is_empty() {
                return Ok(None);
            }
            if tail.is_empty() {
                return Ok(Some(WikiReference::new(wiki.clone()).into()));
            }
            return self.parse_rest_path(url, self.wiki_for_url(wiki), tail);
        }
        if let Some(rest) = strip_base(path, &self.base_url) {
            let segments = split_path(rest)?;
            return match segments.split_first() {
                Some((bin, actions)) if bin == "bin" => self.parse_action_path(url, actions),
                _ => Ok(None),
            };
        }
        Ok(None)
    }
}

impl RemoteUrlSerializer for XWiki {
    fn serialize_url(&self, reference: &EntityReference) -> Result<String, ReferenceError> {
        let base = self.base_rest_url.trim_end_matches('/');
        let wiki = self.wiki_name(reference);
        match reference {
            EntityReference::Wiki(wiki) => Ok(format!("{base}/wikis/{}", rest_segment(&wiki.name))),
            EntityReference::Space(space) => {
                if space.names.is_empty() {
                    return Err(ReferenceError::Unsupported {
                        backend: "XWiki",
                        entity_type: EntityType::Space,
                    });
                }
                let mut url = format!("{base}/wikis/{}", rest_segment(wiki));
                for name in &space.names {
                    url.push_str("/spaces/");
                    url.push_str(&rest_segment(&escape(name)));
                }
                Ok(url)
            }
            EntityReference::Document(document) => {
                Ok(rest_url(base, wiki, &Self::document_id(document)?))
            }
            EntityReference::Attachment(attachment) => Ok(format!(
                "{}/attachments/{}",
                rest_url(base, wiki, &Self::document_id(&attachment.document)?),
                rest_segment(&attachment.name)
            )),
        }
    }
}
