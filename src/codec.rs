//! Backend-agnostic codec traits and the percent-encoding helpers they share.
//!
//! Each backend provides four codecs:
//!
//! - [`ReferenceParser`]: string form → [`EntityReference`]
//! - [`ReferenceSerializer`]: [`EntityReference`] → string form
//! - [`RemoteUrlParser`]: absolute backend URL → [`EntityReference`]
//! - [`RemoteUrlSerializer`]: [`EntityReference`] → absolute backend URL
//!
//! Parsers return `Ok(None)` when the input does not belong to their backend
//! ("no match") and reserve `Err` for input that looks like theirs but is
//! malformed.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use std::sync::LazyLock;

use crate::errors::ReferenceError;
use crate::reference::{EntityReference, EntityType};

/// Characters left alone by JavaScript's `encodeURIComponent`. Everything
/// else, `/` and space included, is percent-encoded.
pub const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://").unwrap());

pub trait ReferenceParser: Send + Sync {
    /// Parses a reference string. `hint` selects the expected entity type
    /// when the string form alone is ambiguous.
    fn parse(
        &self,
        reference: &str,
        hint: Option<EntityType>,
    ) -> Result<Option<EntityReference>, ReferenceError>;
}

pub trait ReferenceSerializer: Send + Sync {
    fn serialize(&self, reference: &EntityReference) -> Result<String, ReferenceError>;

    /// Human-readable label for a reference.
    fn display_name(&self, reference: &EntityReference) -> Option<String> {
        reference.name().map(str::to_string)
    }
}

pub trait RemoteUrlParser: Send + Sync {
    fn parse_url(&self, url: &str) -> Result<Option<EntityReference>, ReferenceError>;
}

pub trait RemoteUrlSerializer: Send + Sync {
    fn serialize_url(&self, reference: &EntityReference) -> Result<String, ReferenceError>;
}

/// Percent-encodes a single path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}

/// Percent-decodes a single path segment.
pub fn decode_segment(segment: &str) -> Result<String, ReferenceError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ReferenceError::InvalidEncoding {
            input: segment.to_string(),
        })
}

/// Encodes every segment independently and joins them with `/`.
pub fn encode_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|segment| encode_segment(segment.as_ref()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits a slash-delimited path into decoded segments.
///
/// A leading empty or `.` segment and a trailing empty segment are dropped,
/// so `./A/B/`, `/A/B` and `A/B` all yield `["A", "B"]`.
pub fn split_path(path: &str) -> Result<Vec<String>, ReferenceError> {
    let mut raw: Vec<&str> = path.split('/').collect();
    if matches!(raw.first(), Some(&"") | Some(&".")) {
        raw.remove(0);
    }
    if raw.last() == Some(&"") {
        raw.pop();
    }
    raw.into_iter().map(decode_segment).collect()
}

/// Like [`split_path`], but an empty segment anywhere is malformed.
pub fn split_segments(input: &str, path: &str) -> Result<Vec<String>, ReferenceError> {
    let segments = split_path(path)?;
    if segments.iter().any(String::is_empty) {
        return Err(ReferenceError::malformed(input, "empty path segment"));
    }
    Ok(segments)
}

/// Drops the query string and fragment of a URL.
pub fn strip_query(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// The scheme of `input` when it starts with `scheme://`.
pub fn url_scheme(input: &str) -> Option<&str> {
    SCHEME_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Strips `base` (ignoring a trailing slash on it) and the `/` that follows.
///
/// Returns `None` when `url` is not located under `base`.
pub fn strip_base<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    let base = base.trim_end_matches('/');
    let rest = url.strip_prefix(base)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment_matches_encode_uri_component() {
        assert_eq!(encode_segment("na me"), "na%20me");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
        assert_eq!(encode_segment("file .ext"), "file%20.ext");
        assert_eq!(encode_segment("it's(1)!~*"), "it's(1)!~*");
        assert_eq!(encode_segment("a+b"), "a%2Bb");
        assert_eq!(encode_segment("é"), "%C3%A9");
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode_segment("na%20me").unwrap(), "na me");
        assert_eq!(decode_segment("a%2Fb").unwrap(), "a/b");
        // '+' is not a space in path segments
        assert_eq!(decode_segment("a+b").unwrap(), "a+b");
    }

    #[test]
    fn test_decode_segment_invalid_utf8() {
        let err = decode_segment("%FF").unwrap_err();
        assert!(matches!(err, ReferenceError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_split_path_trims_edges() {
        assert_eq!(split_path("A/B").unwrap(), vec!["A", "B"]);
        assert_eq!(split_path("/A/B").unwrap(), vec!["A", "B"]);
        assert_eq!(split_path("./A/B/").unwrap(), vec!["A", "B"]);
        assert!(split_path("").unwrap().is_empty());
        assert!(split_path("/").unwrap().is_empty());
    }

    #[test]
    fn test_split_path_keeps_inner_empty_segments() {
        assert_eq!(split_path("A//B").unwrap(), vec!["A", "", "B"]);
    }

    #[test]
    fn test_split_segments_rejects_inner_empty_segment() {
        assert_eq!(split_segments("x", "/A/B/").unwrap(), vec!["A", "B"]);
        let err = split_segments("A//B", "A//B").unwrap_err();
        assert!(matches!(err, ReferenceError::Malformed { .. }));
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("a/b?ref=main"), "a/b");
        assert_eq!(strip_query("a/b#top"), "a/b");
        assert_eq!(strip_query("a/b?x=1#top"), "a/b");
        assert_eq!(strip_query("a/b"), "a/b");
    }

    #[test]
    fn test_url_scheme() {
        assert_eq!(url_scheme("https://example.com"), Some("https"));
        assert_eq!(url_scheme("cristalfs://A/B"), Some("cristalfs"));
        assert_eq!(url_scheme("git+ssh://host"), Some("git+ssh"));
        assert_eq!(url_scheme("A/B"), None);
        assert_eq!(url_scheme("mailto:someone"), None);
        assert_eq!(url_scheme("://nothing"), None);
    }

    #[test]
    fn test_strip_base() {
        assert_eq!(strip_base("http://h/rest/x", "http://h/rest"), Some("x"));
        assert_eq!(strip_base("http://h/rest/x", "http://h/rest/"), Some("x"));
        assert_eq!(strip_base("http://h/rest", "http://h/rest"), Some(""));
        assert_eq!(strip_base("http://h/restx", "http://h/rest"), None);
        assert_eq!(strip_base("http://other/x", "http://h/rest"), None);
    }

    #[test]
    fn test_encode_path_round_trips_through_split_path() {
        let segments = vec!["A b".to_string(), "c/d".to_string(), "e%f".to_string()];
        let encoded = encode_path(&segments);
        assert_eq!(encoded, "A%20b/c%2Fd/e%25f");
        assert_eq!(split_path(&encoded).unwrap(), segments);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any segment survives encode → decode unchanged
        #[test]
        fn prop_segment_round_trip(segment in "\\PC{0,24}") {
            let encoded = encode_segment(&segment);
            prop_assert_eq!(decode_segment(&encoded).unwrap(), segment);
        }

        /// Encoded segments never contain a raw slash or space
        #[test]
        fn prop_encoded_segment_has_no_separators(segment in "\\PC{0,24}") {
            let encoded = encode_segment(&segment);
            prop_assert!(!encoded.contains('/'));
            prop_assert!(!encoded.contains(' '));
        }

        /// Query strings and fragments never survive strip_query
        #[test]
        fn prop_strip_query_removes_suffix(
            path in "[a-zA-Z0-9/._-]{0,20}",
            query in "[a-zA-Z0-9=&]{0,10}"
        ) {
            let url = format!("{}?{}", path, query);
            prop_assert_eq!(strip_query(&url), path.as_str());
        }
    }
}
