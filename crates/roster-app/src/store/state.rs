use chrono::{DateTime, Utc};
use roster_rank::{RecentLog, clamp_page, filter_by_name, page_window, rank_by_score, total_pages};
use roster_source::User;

/// Mutable state behind [`super::UserStore`].
///
/// Projections are derived from it on every read, so they can never go stale.
#[derive(Debug)]
pub(crate) struct StoreState {
    pub(crate) all_users: Vec<User>,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) last_updated: RecentLog<User>,
    pub(crate) current_page: usize,
    pub(crate) search_query: String,
    pub(crate) last_fetched_at: Option<DateTime<Utc>>,
}

impl StoreState {
    pub(crate) fn new() -> Self {
        Self {
            all_users: Vec::new(),
            loading: false,
            error: None,
            last_updated: RecentLog::default(),
            current_page: 1,
            search_query: String::new(),
            last_fetched_at: None,
        }
    }

    pub(crate) fn globally_ranked(&self) -> Vec<User> {
        rank_by_score(&self.all_users)
    }

    pub(crate) fn filtered(&self) -> Vec<User> {
        filter_by_name(self.globally_ranked(), &self.search_query)
    }

    pub(crate) fn total_pages(&self, page_size: usize) -> usize {
        total_pages(self.filtered().len(), page_size)
    }

    pub(crate) fn set_page(&mut self, page: i64, page_size: usize) -> usize {
        self.current_page = clamp_page(page, self.total_pages(page_size));
        self.current_page
    }

    /// Write `score` into the user with `id` and log the change.
    ///
    /// Returns the updated copy, or `None` when no such user is loaded.
    pub(crate) fn set_score(&mut self, id: u32, score: i64) -> Option<User> {
        let user = self.all_users.iter_mut().find(|user| user.id == id)?;
        user.score = score;
        let updated = user.clone();
        self.last_updated.push(updated.clone());
        Some(updated)
    }

    pub(crate) fn snapshot(&self, page_size: usize) -> StoreSnapshot {
        let filtered = self.filtered();
        StoreSnapshot {
            loading: self.loading,
            error: self.error.clone(),
            user_count: self.all_users.len(),
            filtered_count: filtered.len(),
            display_users: page_window(&filtered, self.current_page, page_size).to_vec(),
            current_page: self.current_page,
            total_pages: total_pages(filtered.len(), page_size),
            page_size,
            search_query: self.search_query.clone(),
            last_updated_user_ids: self.last_updated.ids(),
            last_fetched_at: self.last_fetched_at,
        }
    }
}

/// Every store projection, derived under a single lock.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub loading: bool,
    pub error: Option<String>,
    /// Number of loaded users, ignoring the search query
    pub user_count: usize,
    /// Number of users matching the search query
    pub filtered_count: usize,
    /// The ranked users on the current page
    pub display_users: Vec<User>,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub search_query: String,
    /// Recently updated ids, most recent last
    pub last_updated_user_ids: Vec<u32>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl StoreSnapshot {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_recently_updated(&self, id: u32) -> bool {
        self.last_updated_user_ids.contains(&id)
    }
}
