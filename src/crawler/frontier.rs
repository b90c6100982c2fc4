//! Frontier for managing discovered URLs
//!
//! This module handles:
//! - FIFO queue management for URLs waiting to be fetched (breadth-first order)
//! - The visited set that guarantees each normalized URL is fetched at most once
//! - The same-origin / external-link policy relative to the crawl seed

use crate::url::Origin;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Frontier holds the pending queue and the visited set for one crawl
///
/// Entries are keyed by their normalized URL string, so the caller decides the fragment
/// policy when resolving links (see [`crate::url::resolve`]).
#[derive(Debug)]
pub struct Frontier {
    /// URLs already fetched or enqueued
    visited: HashSet<String>,

    /// URLs waiting to be fetched, in discovery order
    pending: VecDeque<Url>,

    /// Origin of the crawl seed
    origin: Origin,

    /// Whether URLs outside the seed origin are accepted
    follow_external: bool,
}

impl Frontier {
    /// Creates an empty frontier for a crawl rooted at `seed`
    ///
    /// The seed is not enqueued; call [`Frontier::seed`] for that.
    pub fn new(seed: &Url, follow_external: bool) -> Self {
        Self {
            visited: HashSet::new(),
            pending: VecDeque::new(),
            origin: Origin::of(seed),
            follow_external,
        }
    }

    /// Enqueues the seed URL, bypassing the origin policy
    ///
    /// # Returns
    ///
    /// `true` if the URL was newly added
    pub fn seed(&mut self, url: Url) -> bool {
        self.insert(url)
    }

    /// Offers a discovered URL to the frontier
    ///
    /// The URL is ignored if it was already visited, or if it is external and external
    /// links are not followed. Otherwise it is marked visited and queued in one step.
    ///
    /// # Returns
    ///
    /// `true` if the URL was enqueued
    pub fn offer(&mut self, url: Url) -> bool {
        if !self.follow_external && self.is_external(&url) {
            tracing::trace!("Skipping external URL {}", url);
            return false;
        }

        self.insert(url)
    }

    fn insert(&mut self, url: Url) -> bool {
        if !self.visited.insert(url.as_str().to_string()) {
            return false;
        }

        self.pending.push_back(url);
        true
    }

    /// Pops the next URL to fetch (FIFO)
    ///
    /// # Returns
    ///
    /// * `Some(Url)` - The oldest pending URL
    /// * `None` - The frontier is exhausted
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Url> {
        self.pending.pop_front()
    }

    /// Returns true if `url` lies outside the seed origin
    pub fn is_external(&self, url: &Url) -> bool {
        !self.origin.contains(url)
    }

    /// Returns the number of URLs waiting to be fetched
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns the number of URLs ever admitted to the frontier
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Returns whether no URL is waiting to be fetched
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
