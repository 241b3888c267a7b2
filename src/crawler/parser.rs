//! HTML parser for extracting words and links
//!
//! This module handles parsing fetched page bodies to extract:
//! - The word list fed to the index (title words first, then body text)
//! - Raw href values to hand to the clean stage
//! - The page title, for display

use regex::Regex;
use scraper::{Html, Node, Selector};
use std::sync::OnceLock;

/// First letter or decimal digit through the last one
static TOKEN_CORE: OnceLock<Regex> = OnceLock::new();

/// Words and raw links extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Trimmed tokens: every `<title>` token, then every body token, in document order
    pub words: Vec<String>,

    /// Trimmed, non-empty `href` values of anchor elements, in document order
    pub hrefs: Vec<String>,
}

/// Parses a page body and extracts its words and links
///
/// # Extraction Rules
///
/// **Words:**
/// - Text directly inside `<title>` elements comes first
/// - Then every text node under `<body>` (the whole document if there is no body)
/// - Text is split on whitespace; leading and trailing characters that are
///   neither letters nor decimal digits are trimmed (so `²` or `Ⅻ` at an
///   edge goes too); tokens left empty are dropped
///
/// **Hrefs:**
/// - `<a href="...">` under `<body>`, trimmed of surrounding whitespace
/// - Anchors without `href`, or with an empty value, are skipped
/// - No filtering by scheme; the clean stage decides what to keep
///
/// The HTML5 parser recovers from any malformed input, so this never fails;
/// undecodable bytes are replaced before parsing.
///
/// # Example
///
/// ```
/// use sumi_seek::crawler::extract_page;
///
/// let html = br#"<html><head><title>Alpha Beta</title></head><body><a href="/b">Alpha</a></body></html>"#;
/// let page = extract_page(html);
/// assert_eq!(page.words, vec!["Alpha", "Beta", "Alpha"]);
/// assert_eq!(page.hrefs, vec!["/b"]);
/// ```
pub fn extract_page(body: &[u8]) -> ExtractedPage {
    let document = Html::parse_document(&String::from_utf8_lossy(body));
    let mut page = ExtractedPage::default();

    if let Ok(title_selector) = Selector::parse("title") {
        for title in document.select(&title_selector) {
            for child in title.children() {
                if let Some(text) = child.value().as_text() {
                    push_tokens(text, &mut page.words);
                }
            }
        }
    }

    let body_element = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    let root = match body_element {
        Some(body) => *body,
        None => document.tree.root(),
    };

    for node in root.descendants() {
        match node.value() {
            Node::Text(text) => push_tokens(text, &mut page.words),
            Node::Element(element) if element.name() == "a" => {
                if let Some(href) = element.attr("href") {
                    let href = href.trim();
                    if !href.is_empty() {
                        page.hrefs.push(href.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    page
}

/// Extracts the trimmed text of the first `<title>` element
pub fn extract_title(body: &[u8]) -> Option<String> {
    let document = Html::parse_document(&String::from_utf8_lossy(body));
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Splits text on whitespace and keeps the core of each token between its
/// first and last letter or decimal digit
fn push_tokens(text: &str, words: &mut Vec<String>) {
    let core = TOKEN_CORE.get_or_init(|| {
        Regex::new(r"(?s)[\p{L}\p{Nd}](?:.*[\p{L}\p{Nd}])?").expect("valid regex")
    });
    for token in text.split_whitespace() {
        if let Some(word) = core.find(token) {
            words.push(word.as_str().to_string());
        }
    }
}
