//! Extracted page content with explicit sentinels
//!
//! Every field of [`ExtractedContent`] has a defined value when the page lacks
//! the element. Accessors ending in `_text` return the sentinel strings that are
//! persisted with page results.

use std::fmt;
use url::Url;

/// Sentinel used when a page has no usable `<title>`
pub const MISSING_TITLE: &str = "Missing Title";

/// Sentinel used when a page has no usable description meta tag
pub const MISSING_META_DESCRIPTION: &str = "Missing Meta Description";

/// Heading levels `<h1>` through `<h6>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// All heading levels in document order
    pub const ALL: [HeadingLevel; 6] = [
        Self::H1,
        Self::H2,
        Self::H3,
        Self::H4,
        Self::H5,
        Self::H6,
    ];

    /// Numeric level (1..=6)
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    /// Tag name used to select this level
    pub fn tag(&self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.number())
    }
}

/// Heading text found on a page, grouped by level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headings {
    levels: [Vec<String>; 6],
}

impl Headings {
    /// Records one heading's text at the given level
    pub fn push(&mut self, level: HeadingLevel, text: String) {
        self.levels[level.index()].push(text);
    }

    /// Number of headings at the given level
    pub fn count(&self, level: HeadingLevel) -> usize {
        self.levels[level.index()].len()
    }

    /// Heading texts at the given level, in document order
    pub fn texts(&self, level: HeadingLevel) -> &[String] {
        &self.levels[level.index()]
    }

    /// Comma-joined heading text, or the `No H<n>` sentinel when absent
    pub fn joined(&self, level: HeadingLevel) -> String {
        let texts = self.texts(level);
        if texts.is_empty() {
            format!("No {}", level)
        } else {
            texts.join(", ")
        }
    }
}

/// On-page signals extracted from one fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Text of the first `<title>`, if present and non-empty
    pub title: Option<String>,

    /// `content` of `<meta name="description">`, if present and non-empty
    pub meta_description: Option<String>,

    /// Heading text per level
    pub headings: Headings,

    /// `alt` attribute of every `<img>` that has one
    pub alt_texts: Vec<String>,

    /// Whitespace-separated token count over the text of the page body
    pub word_count: usize,

    /// Raw `href` of every anchor, before resolution or classification
    pub links: Vec<String>,

    /// URL the anchors resolve against; `None` when content was built by hand
    pub base_url: Option<Url>,
}

impl ExtractedContent {
    /// Title text or the `Missing Title` sentinel
    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or(MISSING_TITLE)
    }

    /// Meta description or the `Missing Meta Description` sentinel
    pub fn meta_description_text(&self) -> &str {
        self.meta_description
            .as_deref()
            .unwrap_or(MISSING_META_DESCRIPTION)
    }
}
