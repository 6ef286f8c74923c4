//! Content extractor for rendered article markup
//!
//! This module turns the provider's rendered HTML into:
//! - Plain article text with markup, scripts and citation chrome removed
//! - The ordered list of outbound links to other articles on the same provider

use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;

/// Extracted content of one article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Human-readable text, one block per line
    pub text: String,

    /// Article identifiers linked from the page, in document order
    pub links: Vec<String>,
}

/// Elements whose content never counts as article text
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Classes marking editor and citation chrome inside article bodies
const SKIPPED_CLASSES: &[&str] = &["mw-editsection", "reference", "mw-cite-backlink", "noprint"];

/// Elements that start a new line of text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "li", "ul", "ol", "dl", "dd", "dt", "h1", "h2", "h3", "h4", "h5",
    "h6", "blockquote", "pre", "table", "tr", "caption", "figcaption", "br",
];

/// Namespaces whose pages are not articles
const NAMESPACES: &[&str] = &[
    "category",
    "talk",
    "file",
    "image",
    "special",
    "help",
    "wikipedia",
    "template",
    "portal",
    "user",
    "draft",
    "module",
    "mediawiki",
    "timedtext",
    "media",
];

/// Parses rendered article HTML into text and article links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="./Title">` (the provider's relative article links)
/// - `<a href="/wiki/Title">`
///
/// **Exclude:**
/// - Absolute and protocol-relative links to other sites
/// - Same-page anchors (`#section`)
/// - Links carrying a query string (edit links, red links)
/// - Namespaced pages such as `Category:` or `Talk:`
///
/// A fragment on an article link (`./Title#History`) is dropped and the
/// article itself is kept. Each identifier appears once.
///
/// # Example
///
/// ```
/// use article_ripple::crawler::extract_article;
///
/// let html = r#"<html><body><p>Neural <a href="./Perceptron">networks</a></p></body></html>"#;
/// let page = extract_article(html);
/// assert_eq!(page.text, "Neural networks");
/// assert_eq!(page.links, vec!["Perceptron"]);
/// ```
pub fn extract_article(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    ExtractedPage {
        text: extract_text(&document),
        links: extract_links(&document),
    }
}

/// Collects visible body text, one non-empty block per line
fn extract_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    collect_text(root, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_skipped(&child) {
                    continue;
                }

                let block = BLOCK_TAGS.contains(&child.value().name());
                if block {
                    out.push('\n');
                }
                collect_text(child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn is_skipped(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    SKIPPED_TAGS.contains(&value.name())
        || value.classes().any(|class| SKIPPED_CLASSES.contains(&class))
}

/// Extracts article links in document order without duplicates
fn extract_links(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(identifier) = article_identifier(href) {
            if seen.insert(identifier.clone()) {
                links.push(identifier);
            }
        }
    }

    links
}

/// Maps an href onto an article identifier, or `None` if it is not an article link
pub fn article_identifier(href: &str) -> Option<String> {
    let href = href.trim();

    let title = href
        .strip_prefix("./")
        .or_else(|| href.strip_prefix("/wiki/"))?;

    if title.contains('?') {
        return None;
    }

    let title = title.split('#').next().unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(title).ok()?;
    let identifier = decoded.trim().replace(' ', "_");
    if identifier.is_empty() || is_namespaced(&identifier) {
        return None;
    }

    Some(identifier)
}

/// True if the identifier names a page in a non-article namespace
fn is_namespaced(identifier: &str) -> bool {
    let Some((prefix, _)) = identifier.split_once(':') else {
        return false;
    };

    let prefix = prefix.replace('_', " ").to_lowercase();
    let base = prefix.strip_suffix(" talk").unwrap_or(&prefix);
    NAMESPACES.contains(&base)
}
