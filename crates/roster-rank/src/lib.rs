//! Ranking library for Roster
//!
//! This crate provides the pure derivations behind the roster views: dense score ranking,
//! name filtering, page arithmetic and the bounded log of recent updates.

use std::collections::{BTreeMap, VecDeque};
use std::cmp::Reverse;

/// Number of entries kept by the recent-updates log.
pub const RECENT_UPDATES_CAPACITY: usize = 5;

/// Anything that can take part in a score ranking.
pub trait Standing {
    /// Stable identifier, unique within a collection.
    fn id(&self) -> u32;
    /// Display name, used for tie ordering and filtering.
    fn name(&self) -> &str;
    /// Current score.
    fn score(&self) -> i64;
    /// Store the rank derived for this entry.
    fn set_rank(&mut self, rank: u32);
}

/// Rank entries by score using dense ranking.
///
/// Entries are grouped by exact score. Groups are ordered by score descending and
/// every entry of a group receives the group's 1-based position as its rank, so
/// equal scores share a rank and ranks stay contiguous.
///
/// # Arguments
///
/// * `items` - The entries to rank, left untouched
///
/// # Returns
///
/// Ranked copies, highest score first, ties ordered by name ascending
pub fn rank_by_score<T: Standing + Clone>(items: &[T]) -> Vec<T> {
    let mut groups: BTreeMap<Reverse<i64>, Vec<T>> = BTreeMap::new();
    for item in items {
        groups
            .entry(Reverse(item.score()))
            .or_default()
            .push(item.clone());
    }

    let mut ranked = Vec::with_capacity(items.len());
    for (index, mut group) in groups.into_values().enumerate() {
        // sort_by is stable: equal names keep their input order
        group.sort_by(|a, b| a.name().cmp(b.name()));
        let rank = index as u32 + 1;
        for mut item in group {
            item.set_rank(rank);
            ranked.push(item);
        }
    }

    ranked
}

/// Keep the entries whose name contains `query`, ignoring case.
///
/// The query is trimmed first. An empty query keeps everything.
pub fn filter_by_name<T: Standing>(items: Vec<T>, query: &str) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| item.name().to_lowercase().contains(&needle))
        .collect()
}

/// Number of pages needed to show `count` entries.
///
/// Never less than 1, so an empty list still reports a single page.
///
/// # Arguments
///
/// * `count` - Number of entries to paginate
/// * `page_size` - Entries per page, must be positive
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a requested 1-based page into `[1, total_pages]`.
pub fn clamp_page(page: i64, total_pages: usize) -> usize {
    let last = total_pages.max(1);
    if page <= 0 {
        1
    } else {
        usize::try_from(page).map_or(last, |page| page.min(last))
    }
}

/// Slice out the entries of a 1-based page.
///
/// Returns an empty slice when the page starts past the end.
pub fn page_window<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Bounded, most-recent-last log of updated entries.
///
/// Pushing an entry whose id is already logged moves it to the end instead of
/// duplicating it. Once the capacity is exceeded the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct RecentLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Standing> RecentLog<T> {
    /// Create an empty log holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record `entry` as the most recent update.
    pub fn push(&mut self, entry: T) {
        let id = entry.id();
        self.entries.retain(|existing| existing.id() != id);
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Ids in log order, oldest first.
    pub fn ids(&self) -> Vec<u32> {
        self.entries.iter().map(Standing::id).collect()
    }

    /// Whether an entry with `id` is logged.
    pub fn contains(&self, id: u32) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    /// Number of logged entries, never above the capacity.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been logged since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T: Standing> Default for RecentLog<T> {
    fn default() -> Self {
        Self::with_capacity(RECENT_UPDATES_CAPACITY)
    }
}
