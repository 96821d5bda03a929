//! Markdown link resolution.
//!
//! Internal link destinations (`[guide](Main.Guide)`, `[[Main.Guide]]`,
//! `![logo](Main.WebHome@logo.png)`) are reference strings of the current
//! backend. They are rewritten to backend URLs; the ones that do not resolve
//! are rendered as their plain text. External links and anchors pass through.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser as MDParser, Tag, TagEnd};
use serde::Serialize;

use crate::codec::url_scheme;
use crate::context::ConverterContext;
use crate::reference::EntityReference;

/// A link or image destination found in a Markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    /// Destination as written
    pub destination: String,
    /// Link text, or image alt text
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub image: bool,
    /// Whether the destination is a reference string of the current backend
    pub internal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<EntityReference>,
    /// Rewritten destination, `None` for unresolved internal links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// True for destinations that address something outside the wiki.
pub fn is_external(destination: &str) -> bool {
    url_scheme(destination).is_some()
        || destination.starts_with("//")
        || destination.starts_with("mailto:")
        || destination.starts_with("tel:")
        || destination.starts_with("data:")
}

fn split_anchor(destination: &str) -> (&str, Option<&str>) {
    match destination.find('#') {
        Some(pos) => (&destination[..pos], Some(&destination[pos..])),
        None => (destination, None),
    }
}

fn is_passthrough(link_type: LinkType, destination: &str) -> bool {
    matches!(link_type, LinkType::Email)
        || destination.is_empty()
        || destination.starts_with('#')
        || is_external(destination)
}

/// Resolves one internal destination to its reference and backend URL.
fn resolve(ctx: &ConverterContext, destination: &str) -> Option<(EntityReference, String)> {
    let (path, anchor) = split_anchor(destination);
    let reference = ctx.parse_reference(path, None)?;
    let url = ctx.get_url_from_reference(&reference)?;
    Some((reference, format!("{url}{}", anchor.unwrap_or_default())))
}

struct PendingLink {
    link_type: LinkType,
    destination: String,
    image: bool,
    text: String,
}

/// Lists every link and image of `markdown` in document order.
pub fn resolve_links(ctx: &ConverterContext, markdown: &str) -> Vec<ResolvedLink> {
    let mut links = Vec::new();
    let mut pending: Vec<PendingLink> = Vec::new();

    for event in MDParser::new_ext(markdown, Options::all()) {
        match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                ..
            }) => pending.push(PendingLink {
                link_type,
                destination: dest_url.to_string(),
                image: false,
                text: String::new(),
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                ..
            }) => pending.push(PendingLink {
                link_type,
                destination: dest_url.to_string(),
                image: true,
                text: String::new(),
            }),
            Event::Text(text) | Event::Code(text) => {
                if let Some(link) = pending.last_mut() {
                    link.text.push_str(&text);
                }
            }
            Event::End(TagEnd::Link | TagEnd::Image) => {
                let Some(link) = pending.pop() else { continue };
                let (_, anchor) = split_anchor(&link.destination);
                let anchor = anchor.map(str::to_string);
                let internal = !is_passthrough(link.link_type, &link.destination);
                let (reference, url) = if internal {
                    match resolve(ctx, &link.destination) {
                        Some((reference, url)) => (Some(reference), Some(url)),
                        None => (None, None),
                    }
                } else {
                    (
                        ctx.parse_reference_from_url(&link.destination),
                        Some(link.destination.clone()),
                    )
                };
                links.push(ResolvedLink {
                    destination: link.destination,
                    text: link.text,
                    anchor,
                    image: link.image,
                    internal,
                    reference,
                    url,
                });
            }
            _ => {}
        }
    }
    links
}

/// Renders `markdown` to HTML with internal links pointing at the backend.
pub fn render(ctx: &ConverterContext, markdown: &str) -> String {
    let parser = MDParser::new_ext(markdown, Options::all());
    // One entry per open link or image: whether its tags are kept.
    let mut open: Vec<bool> = Vec::new();

    let events = parser.filter_map(|event| match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = rewrite(ctx, link_type, dest_url);
            open.push(dest_url.is_some());
            dest_url.map(|dest_url| {
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            })
        }
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = rewrite(ctx, link_type, dest_url);
            open.push(dest_url.is_some());
            dest_url.map(|dest_url| {
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            })
        }
        Event::End(end @ (TagEnd::Link | TagEnd::Image)) => {
            open.pop().unwrap_or(true).then_some(Event::End(end))
        }
        other => Some(other),
    });

    let mut html_output = String::with_capacity(markdown.len() * 2);
    pulldown_cmark::html::push_html(&mut html_output, events);
    html_output
}

/// The destination to render, or `None` to drop the link tags.
fn rewrite<'a>(
    ctx: &ConverterContext,
    link_type: LinkType,
    dest_url: CowStr<'a>,
) -> Option<CowStr<'a>> {
    if is_passthrough(link_type, &dest_url) {
        return Some(dest_url);
    }
    match resolve(ctx, &dest_url) {
        Some((_, url)) => Some(url.into()),
        None => {
            tracing::debug!(destination = %dest_url, "unresolved link rendered as text");
            None
        }
    }
}
