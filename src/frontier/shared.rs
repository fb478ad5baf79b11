//! Thread-safe frontier handle shared by the workers of one crawl task

use crate::frontier::{Frontier, FrontierEntry};
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// A [`Frontier`] behind a mutex
///
/// Every operation takes the lock for the duration of one call, so concurrent
/// offers of the same URL are serialized and exactly one of them wins.
#[derive(Debug, Default)]
pub struct SharedFrontier {
    inner: Mutex<Frontier>,
}

impl SharedFrontier {
    /// Creates an empty shared frontier
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Frontier> {
        // The frontier holds no invariant a panicking holder could break halfway
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Offers a URL; see [`Frontier::offer`]
    pub fn offer(&self, url: Url, depth_remaining: u32) -> bool {
        self.lock().offer(url, depth_remaining)
    }

    /// Offers several URLs under one lock, returning how many were enqueued
    pub fn offer_all(&self, urls: impl IntoIterator<Item = Url>, depth_remaining: u32) -> usize {
        let mut frontier = self.lock();
        urls.into_iter()
            .filter(|url| frontier.offer(url.clone(), depth_remaining))
            .count()
    }

    /// Takes the oldest pending entry
    pub fn next(&self) -> Option<FrontierEntry> {
        self.lock().next()
    }

    /// Number of distinct URLs accepted so far
    pub fn seen_count(&self) -> usize {
        self.lock().seen_count()
    }

    /// Number of entries waiting to be handed out
    pub fn pending(&self) -> usize {
        self.lock().pending()
    }
}
