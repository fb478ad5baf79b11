//! Crawl frontier for one crawl task
//!
//! The frontier owns the seen-set and the breadth-first queue of pages still to
//! visit. URLs live in an append-only arena and the queue is a cursor into it,
//! so dequeuing never moves entries and traversal needs no recursion.
//!
//! # Depth accounting
//!
//! `depth_remaining` counts the page levels still allowed on a path, the
//! entry's own level included. A crawl of depth `D` seeds its start page with
//! `D + 1`; every child is offered with its parent's value minus one. Offers at
//! zero are refused, so an entry holding `1` is fetched but its children are
//! never enqueued, and no page lies more than `D` hops from the seed.

mod shared;

pub use shared::SharedFrontier;

use std::collections::HashSet;
use url::Url;

/// A URL waiting in (or taken from) the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Absolute URL as produced by the link classifier
    pub url: Url,

    /// Page levels still allowed on this path, this page included
    pub depth_remaining: u32,
}

impl FrontierEntry {
    /// Depth budget for links discovered on this page
    pub fn child_depth(&self) -> u32 {
        self.depth_remaining.saturating_sub(1)
    }

    /// Returns true if links found on this page may still be enqueued
    pub fn can_expand(&self) -> bool {
        self.child_depth() > 0
    }
}

/// Breadth-first frontier with exact dedup
///
/// Not synchronized; wrap it in a [`SharedFrontier`] when several workers
/// offer links concurrently.
#[derive(Debug, Default)]
pub struct Frontier {
    /// Every URL ever offered successfully
    seen: HashSet<String>,

    /// Arena of enqueued entries in discovery order
    entries: Vec<FrontierEntry>,

    /// Index of the next entry to hand out
    head: usize,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a URL to the frontier
    ///
    /// # Returns
    ///
    /// * `true` - The URL was newly enqueued
    /// * `false` - The URL was seen before, or `depth_remaining` is zero
    pub fn offer(&mut self, url: Url, depth_remaining: u32) -> bool {
        if depth_remaining == 0 {
            tracing::trace!("Depth exhausted, not enqueuing {}", url);
            return false;
        }

        if !self.seen.insert(url.as_str().to_string()) {
            tracing::trace!("Already seen: {}", url);
            return false;
        }

        self.entries.push(FrontierEntry {
            url,
            depth_remaining,
        });
        true
    }

    /// Takes the oldest pending entry
    pub fn next(&mut self) -> Option<FrontierEntry> {
        let entry = self.entries.get(self.head)?.clone();
        self.head += 1;
        Some(entry)
    }

    /// Number of distinct URLs accepted so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if the URL has been accepted before
    pub fn contains(&self, url: &Url) -> bool {
        self.seen.contains(url.as_str())
    }

    /// Number of entries waiting to be handed out
    pub fn pending(&self) -> usize {
        self.entries.len() - self.head
    }

    /// Returns true if no entries are waiting
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}
