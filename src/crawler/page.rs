//! Per-page crawl result

use crate::extract::{ExtractedContent, HeadingLevel};
use crate::seo::SeoEvaluation;

/// Everything recorded about one successfully fetched page
///
/// Assembled by a crawl worker and handed to storage; never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// The URL taken from the frontier (not the post-redirect URL)
    pub url: String,

    /// Page title or its sentinel
    pub title: String,

    /// Meta description or its sentinel
    pub meta_description: String,

    /// Joined heading text for h1..h6, or the "No H<n>" sentinel per level
    pub headings: [String; 6],

    pub alt_texts: Vec<String>,
    pub word_count: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub seo: SeoEvaluation,

    /// Raw HTML, kept only when configured
    pub raw_content: Option<String>,

    /// Wall-clock fetch duration in seconds
    pub load_time: f64,
}

/// Link counts for one page, split by classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounts {
    pub internal: usize,
    pub external: usize,
}

impl PageResult {
    /// Builds a result from the extracted content of a page
    pub fn assemble(
        url: String,
        content: &ExtractedContent,
        links: LinkCounts,
        seo: SeoEvaluation,
        raw_content: Option<String>,
        load_time: f64,
    ) -> Self {
        Self {
            url,
            title: content.title_text().to_string(),
            meta_description: content.meta_description_text().to_string(),
            headings: HeadingLevel::ALL.map(|level| content.headings.joined(level)),
            alt_texts: content.alt_texts.clone(),
            word_count: content.word_count,
            internal_links: links.internal,
            external_links: links.external,
            seo,
            raw_content,
            load_time,
        }
    }

    /// Heading text for one level
    pub fn heading(&self, level: HeadingLevel) -> &str {
        &self.headings[level.number() - 1]
    }
}
