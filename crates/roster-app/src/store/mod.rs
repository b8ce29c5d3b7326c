//! The user store: source of truth for the roster and every view derived from it.
//!
//! The store is shared as `Arc<UserStore>`. Its state sits behind a mutex that is only
//! ever held for short synchronous sections, never across a call to the source, so a
//! slow fetch never blocks edits or renders.

mod state;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use roster_source::{User, UserSource};

use crate::metrics::{self, RefreshOutcome};

pub use state::StoreSnapshot;
use state::StoreState;

/// Users shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Shared roster state fed by a [`UserSource`].
pub struct UserStore {
    source: Arc<dyn UserSource>,
    page_size: usize,
    state: Mutex<StoreState>,
}

impl fmt::Debug for UserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserStore")
            .field("page_size", &self.page_size)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Clears `loading` when a fetch ends, including when its future is dropped mid-flight.
struct LoadingGuard<'a> {
    state: &'a Mutex<StoreState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

impl UserStore {
    pub fn new(source: Arc<dyn UserSource>) -> Self {
        Self::with_page_size(source, DEFAULT_PAGE_SIZE)
    }

    /// Create a store showing `page_size` users per page (at least one).
    pub fn with_page_size(source: Arc<dyn UserSource>, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            state: Mutex::new(StoreState::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the full user collection from the source.
    ///
    /// Does nothing while another fetch is in flight. On success the search query,
    /// page and recent-updates log are reset; on failure the collection is emptied and
    /// the error message kept.
    pub async fn fetch_users(&self) {
        {
            let mut state = self.state();
            if state.loading {
                tracing::debug!("User fetch already in flight, skipping");
                return;
            }
            state.loading = true;
            state.error = None;
        }
        let _loading = LoadingGuard { state: &self.state };

        let start = Instant::now();
        let result = self.source.fetch_all().await;
        metrics::record_source_latency("fetch_all", start.elapsed().as_secs_f64());

        let mut state = self.state();
        match result {
            Ok(users) => {
                tracing::info!(count = users.len(), "Fetched users");
                state.all_users = users;
                state.search_query.clear();
                state.current_page = 1;
                state.last_updated.clear();
                state.last_fetched_at = Some(Utc::now());
                metrics::record_fetch_event(true);
            }
            Err(e) => {
                tracing::error!("Fetching users failed: {e}");
                state.error = Some(e.to_string());
                state.all_users.clear();
                state.current_page = 1;
                metrics::record_fetch_event(false);
            }
        }
        // Release the state before `_loading` locks it again.
        drop(state);
    }

    /// Ask the source for one fresh score and apply it.
    ///
    /// Refreshes are not serialized: overlapping calls each apply their own result and
    /// the last one to finish wins. A failure keeps the current users.
    pub async fn refresh_user_scores(&self) {
        let current = {
            let mut state = self.state();
            state.error = None;
            state.all_users.clone()
        };

        tracing::debug!("Refreshing a user score");
        let start = Instant::now();
        let result = self.source.refresh_one(&current).await;
        metrics::record_source_latency("refresh_one", start.elapsed().as_secs_f64());

        let mut state = self.state();
        let outcome = match result {
            Ok(Some(refreshed)) => match state.set_score(refreshed.id, refreshed.score) {
                Some(user) => {
                    tracing::info!(id = user.id, score = user.score, "Refreshed user score");
                    RefreshOutcome::Updated
                }
                None => {
                    tracing::debug!(id = refreshed.id, "Refreshed user is no longer loaded");
                    RefreshOutcome::Missing
                }
            },
            Ok(None) => {
                tracing::debug!("Score refresh picked an unknown user");
                RefreshOutcome::Missing
            }
            Err(e) => {
                tracing::warn!("Refreshing user scores failed: {e}");
                state.error = Some(e.to_string());
                RefreshOutcome::Failed
            }
        };
        metrics::record_refresh_event(outcome);
    }

    /// Set a user's score locally. Unknown ids are ignored.
    pub fn update_user_score(&self, user_id: u32, new_score: i64) {
        let updated = self.state().set_score(user_id, new_score);
        match updated {
            Some(_) => tracing::info!(id = user_id, score = new_score, "Updated user score"),
            None => tracing::debug!(id = user_id, "Ignoring score update for unknown user"),
        }
        metrics::record_score_edit(updated.is_some());
    }

    /// Move to `page`, clamped into `[1, total_pages]`. Returns the page now shown.
    pub fn set_current_page(&self, page: i64) -> usize {
        self.state().set_page(page, self.page_size)
    }

    /// Replace the search query and go back to the first page.
    pub fn set_search_query(&self, query: impl Into<String>) {
        let mut state = self.state();
        state.search_query = query.into();
        state.current_page = 1;
    }

    /// Every projection at once, consistent with a single moment.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state().snapshot(self.page_size)
    }

    pub fn users(&self) -> Vec<User> {
        self.state().all_users.clone()
    }

    pub fn user_count(&self) -> usize {
        self.state().all_users.len()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn has_error(&self) -> bool {
        self.state().error.is_some()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Recently updated users, most recent last.
    pub fn last_updated_users(&self) -> Vec<User> {
        self.state().last_updated.iter().cloned().collect()
    }

    pub fn last_updated_user_ids(&self) -> Vec<u32> {
        self.state().last_updated.ids()
    }

    /// All users ranked by score, ignoring the search query.
    pub fn globally_ranked_users(&self) -> Vec<User> {
        self.state().globally_ranked()
    }

    /// Ranked users matching the search query.
    pub fn filtered_users(&self) -> Vec<User> {
        self.state().filtered()
    }

    /// Ranked, filtered users on the current page.
    pub fn display_users(&self) -> Vec<User> {
        self.snapshot().display_users
    }

    pub fn total_pages(&self) -> usize {
        self.state().total_pages(self.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.state().current_page
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_query(&self) -> String {
        self.state().search_query.clone()
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state().last_fetched_at
    }
}
