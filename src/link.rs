//! Link elements of an XRD document.

use crate::properties::PropertySet;

/// One advertised relation of the document's subject.
///
/// Either `href` (a concrete target URL) or `template` (a URL template) is
/// normally set, not both; the model keeps them as independent fields to stay
/// permissive about what real-world documents contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// Relation URI or registered keyword.
    pub rel: Option<String>,
    /// MIME type of the linked resource.
    pub media_type: Option<String>,
    /// Target URL.
    pub href: Option<String>,
    /// Target URL template.
    pub template: Option<String>,
    /// Ordered language → title pairs. `""` is the "no language" key; the
    /// first entry per language wins.
    pub titles: Vec<(String, String)>,
    pub properties: PropertySet,
}

impl Link {
    pub fn new(rel: impl Into<String>) -> Self {
        Self {
            rel: Some(rel.into()),
            ..Self::default()
        }
    }

    pub fn with_href(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::new(rel)
        }
    }

    pub fn with_template(rel: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::new(rel)
        }
    }

    /// Title of the link in the given language.
    ///
    /// Falls back to the language-less title, then to the first title in
    /// document order. `None` only when the link has no titles at all.
    pub fn title(&self, lang: Option<&str>) -> Option<&str> {
        if self.titles.is_empty() {
            return None;
        }
        let first = self.titles.first().map(|(_, t)| t.as_str());
        let Some(lang) = lang else {
            return first;
        };
        self.title_exact(lang)
            .or_else(|| self.title_exact(""))
            .or(first)
    }

    fn title_exact(&self, lang: &str) -> Option<&str> {
        self.titles
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, t)| t.as_str())
    }

    /// Decode-time insert with first-wins semantics per language.
    pub(crate) fn insert_title(&mut self, lang: String, title: String) {
        if !self.titles.iter().any(|(l, _)| *l == lang) {
            self.titles.push((lang, title));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_link() -> Link {
        let mut link = Link::with_href(
            "http://spec.example.net/photo/1.0",
            "http://photos.example.com/gpburdell.jpg",
        );
        link.media_type = Some("image/jpeg".to_string());
        link.insert_title("en".to_string(), "User Photo".to_string());
        link.insert_title("de".to_string(), "Benutzerfoto".to_string());
        link
    }

    #[test]
    fn with_href_sets_no_template() {
        let link = photo_link();
        assert_eq!(link.rel.as_deref(), Some("http://spec.example.net/photo/1.0"));
        assert_eq!(link.href.as_deref(), Some("http://photos.example.com/gpburdell.jpg"));
        assert_eq!(link.template, None);
    }

    #[test]
    fn with_template_sets_no_href() {
        let link = Link::with_template("lrdd", "http://example.org/webfinger/{uri}");
        assert_eq!(link.template.as_deref(), Some("http://example.org/webfinger/{uri}"));
        assert_eq!(link.href, None);
    }

    #[test]
    fn title_without_lang_returns_first() {
        assert_eq!(photo_link().title(None), Some("User Photo"));
    }

    #[test]
    fn title_exact_language() {
        assert_eq!(photo_link().title(Some("de")), Some("Benutzerfoto"));
    }

    #[test]
    fn title_unknown_language_falls_back_to_first() {
        assert_eq!(photo_link().title(Some("fr")), Some("User Photo"));
    }

    #[test]
    fn title_unknown_language_prefers_language_less_entry() {
        let mut link = Link::new("name");
        link.insert_title("de".to_string(), "Stephan".to_string());
        link.insert_title("".to_string(), "Stevie".to_string());
        assert_eq!(link.title(Some("fr")), Some("Stevie"));
    }

    #[test]
    fn title_none_when_no_titles() {
        assert_eq!(Link::new("author").title(None), None);
        assert_eq!(Link::new("author").title(Some("en")), None);
    }

    #[test]
    fn insert_title_first_wins_per_language() {
        let mut link = Link::new("author");
        link.insert_title("en".to_string(), "First".to_string());
        link.insert_title("en".to_string(), "Second".to_string());
        assert_eq!(link.titles, vec![("en".to_string(), "First".to_string())]);
    }
}
