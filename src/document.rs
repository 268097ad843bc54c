//! The XRD document model and its query surface.

use std::fs;
use std::path::Path;

use crate::error::XrdError;
use crate::format::Format;
use crate::link::Link;
use crate::properties::PropertySet;
use crate::{json, xml};

/// An Extensible Resource Descriptor: metadata about a subject resource.
///
/// Built by one of the codecs (or programmatically for fixtures) and read-only
/// in spirit afterwards: queries never mutate, and the property sets actively
/// reject mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// URI the document describes.
    pub subject: Option<String>,
    /// Further URIs for the subject, in document order, duplicates kept.
    pub aliases: Vec<String>,
    /// Links in document order. The order is load-bearing: relation lookup
    /// returns matches in this order.
    pub links: Vec<Link>,
    /// Expiry as a unix timestamp.
    pub expires: Option<i64>,
    /// `xml:id` of the root element, XML only.
    pub id: Option<String>,
    pub properties: PropertySet,
}

impl Document {
    /// Load a document from a file, auto-detecting the format when no
    /// explicit one is given (extension first, then content sniffing).
    pub fn load_file(path: impl AsRef<Path>, format: Option<Format>) -> Result<Self, XrdError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let format = match format.or_else(|| Format::from_extension(path)) {
            Some(f) => f,
            None => Format::sniff(&content)?,
        };
        tracing::debug!(?format, path = %path.display(), "loading XRD file");
        Self::decode(&content, format)
    }

    /// Load a document from an in-memory string, sniffing the format when no
    /// explicit one is given. An empty string never detects as anything.
    pub fn load_str(input: &str, format: Option<Format>) -> Result<Self, XrdError> {
        if input.is_empty() {
            return Err(XrdError::DetectionFailed);
        }
        let format = match format {
            Some(f) => f,
            None => Format::sniff(input)?,
        };
        tracing::debug!(?format, len = input.len(), "loading XRD string");
        Self::decode(input, format)
    }

    fn decode(input: &str, format: Format) -> Result<Self, XrdError> {
        match format {
            Format::Xml => xml::decode_str(input),
            Format::Json => json::decode_str(input),
        }
    }

    /// Serialize the document in the given format.
    pub fn to_format(&self, format: Format) -> Result<String, XrdError> {
        match format {
            Format::Xml => xml::encode(self),
            Format::Json => json::encode(self),
        }
    }

    /// Serialize the document in the format named `"xml"` or `"json"`.
    pub fn to_named_format(&self, name: &str) -> Result<String, XrdError> {
        self.to_format(Format::from_name(name)?)
    }

    /// True iff the document describes the given URI, i.e. the URI equals the
    /// subject or one of the aliases. Exact string comparison, no
    /// normalization: callers use this to check that a fetched document really
    /// talks about the resource they asked for.
    pub fn describes(&self, uri: &str) -> bool {
        self.subject.as_deref() == Some(uri) || self.aliases.iter().any(|a| a == uri)
    }

    /// Best link for the given relation and type: the first match of
    /// [`get_all`](Self::get_all).
    pub fn get(&self, rel: &str, media_type: Option<&str>, type_fallback: bool) -> Option<&Link> {
        self.get_all(rel, media_type, type_fallback).into_iter().next()
    }

    /// All links matching the given relation and type, best first.
    ///
    /// Links are scanned in document order. With `type_fallback`, links
    /// without a type also qualify; but as soon as one candidate matches the
    /// requested type exactly, every typeless candidate is dropped again and
    /// only the typed ones are returned. Document order is preserved
    /// throughout.
    pub fn get_all(
        &self,
        rel: &str,
        media_type: Option<&str>,
        type_fallback: bool,
    ) -> Vec<&Link> {
        let mut matches = Vec::new();
        let mut exact_type = false;
        for link in &self.links {
            let candidate = link.rel.as_deref() == Some(rel)
                && (media_type.is_none()
                    || link.media_type.as_deref() == media_type
                    || (type_fallback && link.media_type.is_none()));
            if candidate {
                matches.push(link);
                exact_type |= type_fallback
                    && media_type.is_some()
                    && link.media_type.as_deref() == media_type;
            }
        }
        if exact_type {
            matches.retain(|link| link.media_type.is_some());
        }
        matches
    }
}

/// Parse an `Expires` timestamp. Unparsable input normalizes to `None` rather
/// than an error or a sentinel value.
pub(crate) fn parse_datetime(text: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.timestamp())
}

/// Render a unix timestamp as the RFC 3339 UTC form both wire formats use.
pub(crate) fn format_timestamp(timestamp: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(rel: &str, media_type: Option<&str>, href: &str) -> Link {
        let mut link = Link::with_href(rel, href);
        link.media_type = media_type.map(|t| t.to_string());
        link
    }

    fn doc_with_links(links: Vec<Link>) -> Document {
        Document {
            links,
            ..Document::default()
        }
    }

    #[test]
    fn describes_subject() {
        let doc = Document {
            subject: Some("acct:bob@example.com".to_string()),
            aliases: vec!["http://example.com/~bob/".to_string()],
            ..Document::default()
        };
        assert!(doc.describes("acct:bob@example.com"));
        assert!(doc.describes("http://example.com/~bob/"));
        assert!(!doc.describes("acct:alice@example.com"));
    }

    #[test]
    fn describes_is_false_without_subject_or_aliases() {
        assert!(!Document::default().describes("acct:bob@example.com"));
    }

    #[test]
    fn describes_does_not_normalize() {
        let doc = Document {
            subject: Some("http://example.com/".to_string()),
            ..Document::default()
        };
        assert!(!doc.describes("http://example.com"));
        assert!(!doc.describes("HTTP://example.com/"));
    }

    #[test]
    fn get_all_preserves_document_order() {
        let doc = doc_with_links(vec![
            link("author", None, "a"),
            link("other", None, "x"),
            link("author", None, "b"),
        ]);
        let hrefs: Vec<_> = doc
            .get_all("author", None, true)
            .iter()
            .map(|l| l.href.as_deref().unwrap())
            .collect();
        assert_eq!(hrefs, vec!["a", "b"]);
    }

    #[test]
    fn get_returns_first_match() {
        let doc = doc_with_links(vec![link("author", None, "a"), link("author", None, "b")]);
        assert_eq!(
            doc.get("author", None, true).unwrap().href.as_deref(),
            Some("a")
        );
    }

    #[test]
    fn get_none_when_relation_missing() {
        let doc = doc_with_links(vec![link("author", None, "a")]);
        assert!(doc.get("copyright", None, true).is_none());
    }

    #[test]
    fn exact_type_match_prunes_typeless_candidates() {
        let doc = doc_with_links(vec![
            link("cv", None, "a"),
            link("cv", Some("text/html"), "b"),
        ]);
        let found = doc.get_all("cv", Some("text/html"), true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].href.as_deref(), Some("b"));
    }

    #[test]
    fn no_exact_match_keeps_typeless_fallback() {
        let doc = doc_with_links(vec![
            link("cv", None, "a"),
            link("cv", Some("text/html"), "b"),
        ]);
        let found = doc.get_all("cv", Some("text/xml"), true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].href.as_deref(), Some("a"));
    }

    #[test]
    fn mismatched_typed_links_are_never_candidates() {
        let doc = doc_with_links(vec![
            link("cv", None, "a"),
            link("cv", Some("text/plain"), "b"),
            link("cv", Some("text/html"), "c"),
        ]);
        let hrefs: Vec<_> = doc
            .get_all("cv", Some("text/html"), true)
            .iter()
            .map(|l| l.href.as_deref().unwrap())
            .collect();
        assert_eq!(hrefs, vec!["c"]);
    }

    #[test]
    fn picture_scenario_prefers_exact_type() {
        let doc = doc_with_links(vec![
            link("picture", None, "A"),
            link("picture", Some("image/jpeg"), "B"),
        ]);
        let found = doc.get_all("picture", Some("image/jpeg"), true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].href.as_deref(), Some("B"));
    }

    #[test]
    fn no_type_query_returns_all_relation_matches() {
        let doc = doc_with_links(vec![
            link("picture", None, "A"),
            link("picture", Some("image/jpeg"), "B"),
        ]);
        assert_eq!(doc.get_all("picture", None, true).len(), 2);
    }

    #[test]
    fn fallback_disabled_excludes_typeless_links() {
        let doc = doc_with_links(vec![
            link("picture", None, "A"),
            link("picture", Some("image/jpeg"), "B"),
        ]);
        let found = doc.get_all("picture", Some("image/png"), false);
        assert!(found.is_empty());
    }

    #[test]
    fn relation_compare_is_exact() {
        let doc = doc_with_links(vec![link("Author", None, "a")]);
        assert!(doc.get_all("author", None, true).is_empty());
    }

    #[test]
    fn links_without_rel_never_match() {
        let untagged = Link {
            href: Some("a".to_string()),
            ..Link::default()
        };
        let doc = doc_with_links(vec![untagged]);
        assert!(doc.get_all("author", None, true).is_empty());
    }

    #[test]
    fn parse_datetime_rfc3339() {
        assert_eq!(parse_datetime("2010-01-30T09:30:00Z"), Some(1264843800));
    }

    #[test]
    fn parse_datetime_unparsable_is_none() {
        assert_eq!(parse_datetime("never"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn format_timestamp_round_trips() {
        let rendered = format_timestamp(1264843800).unwrap();
        assert_eq!(rendered, "2010-01-30T09:30:00Z");
        assert_eq!(parse_datetime(&rendered), Some(1264843800));
    }

    #[test]
    fn load_str_empty_fails_detection_even_with_hint() {
        assert!(matches!(
            Document::load_str("", None),
            Err(XrdError::DetectionFailed)
        ));
        assert!(matches!(
            Document::load_str("", Some(Format::Json)),
            Err(XrdError::DetectionFailed)
        ));
    }

    #[test]
    fn load_str_sniffs_json() {
        let doc = Document::load_str(r#"{"subject":"gpburdell@example.org"}"#, None).unwrap();
        assert_eq!(doc.subject.as_deref(), Some("gpburdell@example.org"));
    }

    #[test]
    fn load_str_sniffs_xml() {
        let doc = Document::load_str(
            "<XRD xmlns=\"http://docs.oasis-open.org/ns/xri/xrd-1.0\">\
             <Subject>http://example.com/gpburdell</Subject></XRD>",
            None,
        )
        .unwrap();
        assert_eq!(doc.subject.as_deref(), Some("http://example.com/gpburdell"));
    }

    #[test]
    fn to_named_format_rejects_unknown_name() {
        let err = Document::default().to_named_format("foobarbaz").unwrap_err();
        assert!(err.to_string().contains("foobarbaz"));
    }
}
