//! URL handling module for OpenCrawl
//!
//! This module is the link classifier: it resolves hrefs against the page they
//! were found on and decides whether a resolved link stays on the crawled site.
//!
//! URL identity is whatever [`resolve`] produces. The `url` crate lowercases the
//! scheme and host, drops default ports, removes dot segments and turns an empty
//! path into `/`. Nothing else is canonicalized: query strings and fragments are
//! kept, so `/a#top` and `/a` are different frontier entries.

mod domain;
mod normalize;

pub use domain::network_location;
pub use normalize::{normalize_url, resolve};

use ::url::Url;

/// Classification of a link relative to the crawl base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Same network location as the base - may be followed
    Internal,
    /// Different network location, or no network location at all
    External,
}

impl LinkKind {
    /// Returns true if the link may be offered to the frontier
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Classifies a resolved URL against the crawl base
///
/// The network location (`host[:port]`) of both URLs is compared. URLs without
/// a host, such as `mailto:` or `javascript:` links, are always external.
///
/// # Examples
///
/// ```
/// use opencrawl::url::{classify, LinkKind};
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let page = Url::parse("https://example.com/about").unwrap();
/// let other = Url::parse("https://example.com:8443/about").unwrap();
///
/// assert_eq!(classify(&page, &base), LinkKind::Internal);
/// assert_eq!(classify(&other, &base), LinkKind::External);
/// ```
pub fn classify(candidate: &Url, base: &Url) -> LinkKind {
    match (network_location(candidate), network_location(base)) {
        (Some(candidate_loc), Some(base_loc)) if candidate_loc == base_loc => LinkKind::Internal,
        _ => LinkKind::External,
    }
}

/// Resolves an href and classifies it in one step
///
/// Hrefs that cannot be resolved are reported as external, so that the internal
/// and external counts always add up to the number of anchors on the page.
pub fn classify_href(href: &str, page_url: &Url, base: &Url) -> (Option<Url>, LinkKind) {
    match resolve(href, page_url) {
        Ok(resolved) => {
            let kind = classify(&resolved, base);
            (Some(resolved), kind)
        }
        Err(e) => {
            tracing::trace!("Unresolvable href {:?}: {}", href, e);
            (None, LinkKind::External)
        }
    }
}
