//! Content extraction for fetched pages
//!
//! This module turns the HTML of one page into [`ExtractedContent`]:
//! - The page title and meta description
//! - Heading text for levels 1 through 6
//! - Image alt text
//! - A raw word count of the body text
//! - Every anchor href, unresolved
//! - The base URL those hrefs resolve against
//!
//! Extraction never fails. Markup that is malformed or missing an element
//! degrades to that field's sentinel.

mod content;

pub use content::{
    ExtractedContent, HeadingLevel, Headings, MISSING_META_DESCRIPTION, MISSING_TITLE,
};

use crate::url::resolve;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracts on-page SEO signals from HTML content
///
/// # Extraction Rules
///
/// - **Title**: text of the first `<title>`, as written; only an empty title
///   counts as missing
/// - **Meta description**: `content` of the first `<meta name="description">`,
///   as written; only an empty value counts as missing
/// - **Headings**: trimmed text of every `<h1>`..`<h6>`; headings without text
///   are not counted
/// - **Alt text**: the `alt` attribute of every `<img>` carrying one
/// - **Word count**: whitespace-split tokens over all text nodes in `<body>`
/// - **Links**: the raw `href` of every `<a href>`
/// - **Base URL**: the first `<base href>` resolved against `page_url`, or
///   `page_url` itself
///
/// # Example
///
/// ```
/// use opencrawl::extract::{extract, HeadingLevel};
/// use url::Url;
///
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let html = r#"<html><head><title>Home</title></head>
///               <body><h1>Welcome</h1><a href="/about">About us</a></body></html>"#;
/// let content = extract(html, &page_url);
/// assert_eq!(content.title_text(), "Home");
/// assert_eq!(content.headings.count(HeadingLevel::H1), 1);
/// assert_eq!(content.links, vec!["/about".to_string()]);
/// assert_eq!(content.word_count, 3);
/// assert_eq!(content.base_url.as_ref(), Some(&page_url));
/// ```
pub fn extract(html: &str, page_url: &Url) -> ExtractedContent {
    let document = Html::parse_document(html);

    ExtractedContent {
        title: extract_title(&document),
        meta_description: extract_meta_description(&document),
        headings: extract_headings(&document),
        alt_texts: extract_alt_texts(&document),
        word_count: count_words(&document),
        links: extract_links(&document),
        base_url: Some(extract_base_url(&document, page_url)),
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = selector("title")?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .and_then(non_empty)
}

/// Extracts the description meta tag content
fn extract_meta_description(document: &Html) -> Option<String> {
    let meta_selector = selector(r#"meta[name="description"][content]"#)?;

    document
        .select(&meta_selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::to_string)
        .and_then(non_empty)
}

/// Extracts heading text for every level
fn extract_headings(document: &Html) -> Headings {
    let mut headings = Headings::default();

    for level in HeadingLevel::ALL {
        let Some(heading_selector) = selector(level.tag()) else {
            continue;
        };
        for element in document.select(&heading_selector) {
            let text = element_text(element);
            if !text.is_empty() {
                headings.push(level, text);
            }
        }
    }

    headings
}

/// Extracts image alt text
fn extract_alt_texts(document: &Html) -> Vec<String> {
    let Some(img_selector) = selector("img[alt]") else {
        return Vec::new();
    };

    document
        .select(&img_selector)
        .filter_map(|element| element.value().attr("alt"))
        .map(str::to_string)
        .collect()
}

/// Counts whitespace-separated tokens over the body's text nodes
///
/// Text nodes are joined with a space first, so adjacent nodes never merge
/// into one word.
fn count_words(document: &Html) -> usize {
    let body = selector("body").and_then(|s| document.select(&s).next());

    let text_nodes: Vec<&str> = match body {
        Some(body) => body.text().collect(),
        None => document.root_element().text().collect(),
    };

    text_nodes.join(" ").split_whitespace().count()
}

/// Collects the raw href of every anchor
fn extract_links(document: &Html) -> Vec<String> {
    let Some(a_selector) = selector("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Resolves the document's `<base href>` against the page URL
///
/// A base that is missing or does not resolve leaves the page URL in effect.
fn extract_base_url(document: &Html, page_url: &Url) -> Url {
    let declared = selector("base[href]")
        .and_then(|s| document.select(&s).next())
        .and_then(|element| element.value().attr("href"));

    match declared.map(|href| resolve(href, page_url)) {
        Some(Ok(base)) => base,
        Some(Err(e)) => {
            tracing::debug!("Ignoring <base> on {}: {}", page_url, e);
            page_url.clone()
        }
        None => page_url.clone(),
    }
}
