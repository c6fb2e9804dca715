//! Visited set and breadth-first frontier for the contents search
//!
//! The visited set is the only cycle breaker of the crawl: once a URL is in
//! it, the locator never queues it again and the validator never follows it
//! again. Entries are never removed during a run.

use crate::url::visit_key;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// URLs already examined (or claimed for examination) during one run
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL; returns false if it was already present
    pub fn insert(&mut self, url: &Url) -> bool {
        self.keys.insert(visit_key(url))
    }

    /// Checks whether a URL has been recorded
    pub fn contains(&self, url: &Url) -> bool {
        self.keys.contains(&visit_key(url))
    }

    /// Number of recorded URLs
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One slot of the frontier queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontierEntry {
    /// A page waiting to be analyzed
    Page(Url),
    /// End of the current depth level
    DepthBoundary,
}

/// Breadth-first frontier with level boundaries
///
/// Pages of one depth are followed by a `DepthBoundary`. Pages pushed while
/// a level is being drained land behind that boundary, so the depth only
/// advances once the whole current level has been popped.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    depth: u32,
}

impl Frontier {
    /// Creates a frontier whose first level (depth 1) holds `first_level`
    pub fn new(first_level: Vec<Url>) -> Self {
        let mut queue: VecDeque<FrontierEntry> =
            first_level.into_iter().map(FrontierEntry::Page).collect();
        queue.push_back(FrontierEntry::DepthBoundary);
        Self { queue, depth: 1 }
    }

    /// Queues a page for the level after the current one
    pub fn push(&mut self, url: Url) {
        self.queue.push_back(FrontierEntry::Page(url));
    }

    /// Pops the next page together with its depth
    ///
    /// Returns None once every level has been drained.
    pub fn pop(&mut self) -> Option<(u32, Url)> {
        while let Some(entry) = self.queue.pop_front() {
            match entry {
                FrontierEntry::Page(url) => return Some((self.depth, url)),
                FrontierEntry::DepthBoundary => {
                    if self.queue.is_empty() {
                        return None;
                    }
                    self.depth += 1;
                    tracing::debug!(
                        "Advancing to depth {} with {} pages queued",
                        self.depth,
                        self.queue.len()
                    );
                    self.queue.push_back(FrontierEntry::DepthBoundary);
                }
            }
        }
        None
    }
}
