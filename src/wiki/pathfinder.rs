//! BFS shortest-path computation over the live link graph.
//!
//! One finder instance belongs to exactly one attempt. Its link-set cache
//! is private to that attempt, so no locking is needed and no state leaks
//! between concurrently running attempts.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use super::api::{WikiClient, WikiError};
use super::links::normalize_title;

/// Default BFS depth bound.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Hard cap on articles expanded per query. BFS over Wikipedia fans out
/// fast; past this budget the query reports "no path found".
const MAX_EXPANSIONS: usize = 100;

/// Outgoing edges of one article: raw titles for follow-up fetches,
/// normalized keys for membership tests.
struct LinkSet {
    titles: Vec<String>,
    keys: HashSet<String>,
}

/// Direction of a single move relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Neutral,
    Backwards,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Neutral => "neutral",
            Direction::Backwards => "backwards",
        }
    }

    /// Classify a move by remaining distance before and after it.
    ///
    /// `None` means "no path within budget" and compares worse than any
    /// measured distance; two unreachable positions compare neutral.
    pub fn classify(before: Option<u32>, after: Option<u32>) -> Direction {
        match (before, after) {
            (Some(b), Some(a)) if a < b => Direction::Forward,
            (Some(b), Some(a)) if a > b => Direction::Backwards,
            (Some(_), Some(_)) => Direction::Neutral,
            (Some(_), None) => Direction::Backwards,
            (None, Some(_)) => Direction::Forward,
            (None, None) => Direction::Neutral,
        }
    }
}

/// Shortest-path finder with per-instance link memoization.
pub struct PathFinder {
    api: WikiClient,
    links_cache: HashMap<String, LinkSet>,
    max_depth: u32,
}

impl PathFinder {
    pub fn new(api: WikiClient) -> Self {
        Self::with_max_depth(api, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(api: WikiClient, max_depth: u32) -> Self {
        Self {
            api,
            links_cache: HashMap::new(),
            max_depth,
        }
    }

    /// Outgoing links of a page, fetched at most once per finder lifetime.
    async fn links(&mut self, title: &str) -> Result<&LinkSet, WikiError> {
        let key = normalize_title(title);
        if !self.links_cache.contains_key(&key) {
            let titles = self.api.page_links(title).await?;
            let keys = titles.iter().map(|t| normalize_title(t)).collect();
            self.links_cache.insert(key.clone(), LinkSet { titles, keys });
        }
        Ok(&self.links_cache[&key])
    }

    /// Minimum link-hops from `start` to `target`, or `None` when no path
    /// exists within the depth and expansion budgets. Bounded failure is
    /// a normal outcome, not an error.
    pub async fn shortest_path(
        &mut self,
        start: &str,
        target: &str,
    ) -> Result<Option<u32>, WikiError> {
        self.shortest_path_bounded(start, target, self.max_depth).await
    }

    /// Same query with an explicit depth bound (precomputation uses a
    /// shallower bound than per-step scoring).
    pub async fn shortest_path_bounded(
        &mut self,
        start: &str,
        target: &str,
        max_depth: u32,
    ) -> Result<Option<u32>, WikiError> {
        let start_key = normalize_title(start);
        let target_key = normalize_title(target);

        if start_key == target_key {
            return Ok(Some(0));
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start_key);

        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        queue.push_back((start.to_string(), 0));

        let mut expanded = 0usize;

        while let Some((title, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            if expanded >= MAX_EXPANSIONS {
                return Ok(None);
            }
            expanded += 1;

            let links = self.links(&title).await?;

            if links.keys.contains(&target_key) {
                return Ok(Some(depth + 1));
            }

            let next: Vec<String> = links
                .titles
                .iter()
                .filter(|t| !visited.contains(&normalize_title(t)))
                .cloned()
                .collect();

            for t in next {
                visited.insert(normalize_title(&t));
                queue.push_back((t, depth + 1));
            }
        }

        Ok(None)
    }

    /// Remaining distance from the current page to the fixed target.
    /// Dominates call volume during an attempt; the link cache is what
    /// keeps it affordable.
    pub async fn remaining_distance(
        &mut self,
        current: &str,
        target: &str,
    ) -> Result<Option<u32>, WikiError> {
        self.shortest_path(current, target).await
    }
}
