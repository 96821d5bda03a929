//! Breadcrumb trails.

use serde::Serialize;

use crate::constants::WEB_HOME;
use crate::context::ConverterContext;
use crate::reference::{DocumentReference, EntityReference};

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyItem {
    pub label: String,
    pub reference: EntityReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl HierarchyItem {
    fn new(ctx: &ConverterContext, reference: EntityReference) -> Self {
        let label = ctx
            .get_display_name(&reference)
            .or_else(|| reference.name().map(str::to_string))
            .unwrap_or_default();
        let url = ctx.get_url_from_reference(&reference);
        Self {
            label,
            reference,
            url,
        }
    }
}

/// The home page of its space is represented by the space item itself.
fn is_space_home(document: &DocumentReference) -> bool {
    !document.terminal && document.name == WEB_HOME && !document.space_names().is_empty()
}

/// Navigation trail from the wiki down to `reference`, outermost first.
pub fn hierarchy(ctx: &ConverterContext, reference: &EntityReference) -> Vec<HierarchyItem> {
    let mut trail: Vec<EntityReference> = Vec::new();
    if let Some(wiki) = reference.wiki() {
        trail.push(wiki.clone().into());
    }

    let (space, document, attachment) = match reference {
        EntityReference::Wiki(_) => (None, None, None),
        EntityReference::Space(space) => (Some(space), None, None),
        EntityReference::Document(document) => (document.space.as_ref(), Some(document), None),
        EntityReference::Attachment(attachment) => (
            attachment.document.space.as_ref(),
            Some(&attachment.document),
            Some(attachment),
        ),
    };

    if let Some(space) = space {
        trail.extend(space.prefixes().map(EntityReference::from));
    }
    if let Some(document) = document.filter(|document| !is_space_home(document)) {
        trail.push(document.clone().into());
    }
    if let Some(attachment) = attachment {
        trail.push(attachment.clone().into());
    }

    trail
        .into_iter()
        .map(|reference| HierarchyItem::new(ctx, reference))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::github::GitHub;
    use crate::xwiki::XWiki;

    fn xwiki() -> ConverterContext {
        ConverterContext::new(Backend::new(
            "XWiki",
            XWiki::new("http://h/xwiki", "http://h/xwiki/rest"),
        ))
    }

    fn labels(items: &[HierarchyItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn test_home_page_collapses_into_space() {
        let ctx = xwiki();
        let reference = ctx.parse_reference("Main.Sandbox.WebHome", None).unwrap();
        let items = hierarchy(&ctx, &reference);
        assert_eq!(labels(&items), vec!["Main", "Sandbox"]);
        assert_eq!(
            items[1].url.as_deref(),
            Some("http://h/xwiki/rest/wikis/xwiki/spaces/Main/spaces/Sandbox")
        );
    }

    #[test]
    fn test_terminal_page_gets_its_own_item() {
        let ctx = xwiki();
        let reference = ctx.parse_reference("Main.Sandbox.Tests", None).unwrap();
        assert_eq!(
            labels(&hierarchy(&ctx, &reference)),
            vec!["Main", "Sandbox", "Tests"]
        );
    }

    #[test]
    fn test_wiki_and_attachment_items() {
        let ctx = xwiki();
        let reference = ctx
            .parse_reference("sub:Main.WebHome@logo.png", None)
            .unwrap();
        let items = hierarchy(&ctx, &reference);
        assert_eq!(labels(&items), vec!["sub", "Main", "logo.png"]);
        assert!(matches!(items[0].reference, EntityReference::Wiki(_)));
        assert_eq!(
            items[2].url.as_deref(),
            Some("http://h/xwiki/rest/wikis/sub/spaces/Main/pages/WebHome/attachments/logo%2Epng")
        );
    }

    #[test]
    fn test_unsupported_urls_are_omitted() {
        let ctx = ConverterContext::new(Backend::new(
            "GitHub",
            GitHub::new("https://raw.example/a/p", "https://api.example/repos/a/p"),
        ));
        let reference = ctx.parse_reference("docs/intro", None).unwrap();
        let items = hierarchy(&ctx, &reference);
        assert_eq!(labels(&items), vec!["docs", "intro"]);
        assert_eq!(
            items[1].url.as_deref(),
            Some("https://api.example/repos/a/p/contents/docs/intro.md")
        );

        let wiki: EntityReference = crate::reference::WikiReference::new("a/p").into();
        let items = hierarchy(&ctx, &wiki);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "a/p");
        assert_eq!(items[0].url, None);
    }

    #[test]
    fn test_root_document_without_space() {
        let ctx = xwiki();
        let reference = ctx.parse_reference("WebHome", None).unwrap();
        assert_eq!(labels(&hierarchy(&ctx, &reference)), vec!["WebHome"]);
    }
}
