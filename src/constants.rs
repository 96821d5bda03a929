//! Shared constants used across multiple modules.

/// Name of the non-terminal home page of an XWiki space.
pub const WEB_HOME: &str = "WebHome";

/// Wiki addressed when an XWiki reference carries no wiki prefix.
pub const DEFAULT_XWIKI_WIKI: &str = "xwiki";

/// Path segment introducing the attachments of a document.
pub const ATTACHMENTS_SEGMENT: &str = "attachments";

/// URL scheme of local filesystem references.
pub const DEFAULT_FS_SCHEME: &str = "cristalfs";

/// Extension of GitHub-hosted documents.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Page content file of a Nextcloud document.
pub const NEXTCLOUD_PAGE_FILE: &str = "page.json";

/// Directory holding per-project configuration.
pub const CONFIG_DIR: &str = ".cristal";
