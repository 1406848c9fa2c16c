//! Selector-based access to parsed HTML
//!
//! Extraction code never touches `scraper` directly; it goes through
//! [`HtmlDocument`] and [`HtmlNode`], which select by CSS marker and read text
//! and attributes. An invalid marker selects nothing instead of panicking.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A parsed HTML document
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses a full HTML document (never fails; html5ever recovers from bad markup)
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// First element matching `marker`, in document order
    pub fn select_first(&self, marker: &str) -> Option<HtmlNode<'_>> {
        let selector = selector(marker)?;
        let first = self.html.select(&selector).next().map(HtmlNode::new);
        first
    }

    /// All elements matching `marker`, in document order
    pub fn select_all(&self, marker: &str) -> Vec<HtmlNode<'_>> {
        let Some(selector) = selector(marker) else {
            return Vec::new();
        };
        let nodes = self.html.select(&selector).map(HtmlNode::new).collect();
        nodes
    }

    /// The `<title>` text, trimmed; `None` when absent or blank
    pub fn title(&self) -> Option<String> {
        self.select_first("title")
            .map(|node| node.text().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// One element inside an [`HtmlDocument`]
#[derive(Clone, Copy)]
pub struct HtmlNode<'a> {
    element: ElementRef<'a>,
}

impl<'a> HtmlNode<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// First descendant matching `marker`
    pub fn select_first(&self, marker: &str) -> Option<HtmlNode<'a>> {
        let selector = selector(marker)?;
        let first = self.element.select(&selector).next().map(HtmlNode::new);
        first
    }

    /// All descendants matching `marker`, in document order
    pub fn select_all(&self, marker: &str) -> Vec<HtmlNode<'a>> {
        let Some(selector) = selector(marker) else {
            return Vec::new();
        };
        let nodes = self.element.select(&selector).map(HtmlNode::new).collect();
        nodes
    }

    /// Direct child elements with the given tag name
    pub fn children(&self, tag: &str) -> Vec<HtmlNode<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name().eq_ignore_ascii_case(tag))
            .map(HtmlNode::new)
            .collect()
    }

    /// Concatenated text of this element and its descendants, untrimmed
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name
    pub fn name(&self) -> &'a str {
        self.element.value().name()
    }
}

fn selector(marker: &str) -> Option<Selector> {
    match Selector::parse(marker) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!(marker, "Invalid selector: {:?}", e);
            None
        }
    }
}

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}

/// Resolves every href against `base`
///
/// If `base` itself is not a valid URL the hrefs are passed through untouched.
pub fn resolve_links(hrefs: Vec<String>, base: &str) -> Vec<String> {
    match Url::parse(base) {
        Ok(base_url) => hrefs
            .iter()
            .filter_map(|href| resolve_link(href, &base_url))
            .collect(),
        Err(e) => {
            tracing::debug!("Not resolving links against {}: {}", base, e);
            hrefs
        }
    }
}
