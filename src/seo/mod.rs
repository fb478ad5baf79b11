//! SEO evaluation of extracted page content
//!
//! The rubric is fixed: title, meta description, then H1. Each rule deducts a
//! fixed penalty from a starting score of 100. The score is deliberately not
//! clamped, so a page with several critical issues scores below zero.

mod issue;

pub use issue::{SeoIssue, NO_ISSUES};

use crate::extract::{ExtractedContent, HeadingLevel};

/// Score every page starts from
pub const BASE_SCORE: i32 = 100;

/// Title longer than this many characters is too long
pub const TITLE_MAX_LEN: usize = 60;
/// Title shorter than this many characters is too short
pub const TITLE_MIN_LEN: usize = 30;
/// Meta description longer than this many characters is too long
pub const META_MAX_LEN: usize = 160;
/// Meta description shorter than this many characters is too short
pub const META_MIN_LEN: usize = 50;

/// Outcome of evaluating one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoEvaluation {
    /// Issues in rule order; empty when the page passes every rule
    pub issues: Vec<SeoIssue>,

    /// 100 minus the penalty of every issue; may be negative
    pub score: i32,
}

impl SeoEvaluation {
    /// Issue labels in rule order, or `["No Issues"]` when nothing fired
    pub fn labels(&self) -> Vec<&'static str> {
        if self.issues.is_empty() {
            vec![NO_ISSUES]
        } else {
            self.issues.iter().map(SeoIssue::label).collect()
        }
    }

    /// Comma-joined labels as stored in the `seo_evaluation` column
    pub fn summary(&self) -> String {
        self.labels().join(", ")
    }

    /// Returns true if no rule fired
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Evaluates extracted content against the SEO rubric
///
/// # Rules (in order)
///
/// | Rule | Condition | Issue | Penalty |
/// |------|-----------|-------|---------|
/// | Title | missing | Missing Title (Critical Issue) | 25 |
/// | Title | > 60 chars | Title Too Long (Minor Issue) | 5 |
/// | Title | < 30 chars | Title Too Short (Minor Issue) | 5 |
/// | Meta | missing | Missing Meta Description (Critical Issue) | 25 |
/// | Meta | > 160 chars | Meta Description Too Long (Minor Issue) | 5 |
/// | Meta | < 50 chars | Meta Description Too Short (Minor Issue) | 5 |
/// | H1 | none | Missing H1 Tag (Critical Issue) | 25 |
/// | H1 | more than one | Multiple H1 Tags (Moderate Issue) | 15 |
///
/// Lengths are counted in characters. Length rules only apply to text that is
/// present, and at most one length rule fires per field.
///
/// # Example
///
/// ```
/// use opencrawl::extract::ExtractedContent;
/// use opencrawl::seo::{evaluate, SeoIssue};
///
/// let evaluation = evaluate(&ExtractedContent::default());
/// assert_eq!(evaluation.score, 25);
/// assert_eq!(evaluation.issues, vec![
///     SeoIssue::MissingTitle,
///     SeoIssue::MissingMetaDescription,
///     SeoIssue::MissingH1,
/// ]);
/// ```
pub fn evaluate(content: &ExtractedContent) -> SeoEvaluation {
    let mut issues = Vec::new();

    if let Some(issue) = check_length(
        content.title.as_deref(),
        TITLE_MAX_LEN,
        TITLE_MIN_LEN,
        [
            SeoIssue::MissingTitle,
            SeoIssue::TitleTooLong,
            SeoIssue::TitleTooShort,
        ],
    ) {
        issues.push(issue);
    }

    if let Some(issue) = check_length(
        content.meta_description.as_deref(),
        META_MAX_LEN,
        META_MIN_LEN,
        [
            SeoIssue::MissingMetaDescription,
            SeoIssue::MetaDescriptionTooLong,
            SeoIssue::MetaDescriptionTooShort,
        ],
    ) {
        issues.push(issue);
    }

    match content.headings.count(HeadingLevel::H1) {
        0 => issues.push(SeoIssue::MissingH1),
        1 => {}
        _ => issues.push(SeoIssue::MultipleH1),
    }

    let score = BASE_SCORE - issues.iter().map(SeoIssue::penalty).sum::<i32>();

    SeoEvaluation { issues, score }
}

/// Applies the missing / too long / too short rule to one text field
///
/// `issues` holds the issue for each outcome in that order.
fn check_length(
    text: Option<&str>,
    max_len: usize,
    min_len: usize,
    issues: [SeoIssue; 3],
) -> Option<SeoIssue> {
    let [missing, too_long, too_short] = issues;
    let Some(text) = text else {
        return Some(missing);
    };

    let len = text.chars().count();
    if len > max_len {
        Some(too_long)
    } else if len < min_len {
        Some(too_short)
    } else {
        None
    }
}
