use std::fmt;

/// Label stored when a page passes every rule
pub const NO_ISSUES: &str = "No Issues";

/// A single finding of the SEO rubric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeoIssue {
    // ===== Title =====
    MissingTitle,
    TitleTooLong,
    TitleTooShort,

    // ===== Meta description =====
    MissingMetaDescription,
    MetaDescriptionTooLong,
    MetaDescriptionTooShort,

    // ===== Headings =====
    MissingH1,
    MultipleH1,
}

impl SeoIssue {
    /// Points deducted from the score for this issue
    pub fn penalty(&self) -> i32 {
        match self {
            Self::MissingTitle | Self::MissingMetaDescription | Self::MissingH1 => 25,
            Self::MultipleH1 => 15,
            Self::TitleTooLong
            | Self::TitleTooShort
            | Self::MetaDescriptionTooLong
            | Self::MetaDescriptionTooShort => 5,
        }
    }

    /// Label persisted in the evaluation column
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingTitle => "Missing Title (Critical Issue)",
            Self::TitleTooLong => "Title Too Long (Minor Issue)",
            Self::TitleTooShort => "Title Too Short (Minor Issue)",
            Self::MissingMetaDescription => "Missing Meta Description (Critical Issue)",
            Self::MetaDescriptionTooLong => "Meta Description Too Long (Minor Issue)",
            Self::MetaDescriptionTooShort => "Meta Description Too Short (Minor Issue)",
            Self::MissingH1 => "Missing H1 Tag (Critical Issue)",
            Self::MultipleH1 => "Multiple H1 Tags (Moderate Issue)",
        }
    }

    /// Parses an issue from its label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().into_iter().find(|issue| issue.label() == label)
    }

    /// Returns all issues in rule order
    pub fn all() -> Vec<Self> {
        vec![
            Self::MissingTitle,
            Self::TitleTooLong,
            Self::TitleTooShort,
            Self::MissingMetaDescription,
            Self::MetaDescriptionTooLong,
            Self::MetaDescriptionTooShort,
            Self::MissingH1,
            Self::MultipleH1,
        ]
    }
}

impl fmt::Display for SeoIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
