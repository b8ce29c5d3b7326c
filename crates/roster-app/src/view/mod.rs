//! Roster view: row editing, paging intents and the mounted refresh job.

mod render;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::RosterError;
use crate::jobs::{self, RefreshJob};
use crate::store::{StoreSnapshot, UserStore};

/// One rendered row of the roster table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub rank: Option<u32>,
    pub id: u32,
    pub name: String,
    pub email: String,
    pub score: i64,
    /// Pending input when the row is in edit mode
    pub editing: Option<String>,
    pub recently_updated: bool,
}

#[derive(Debug)]
pub struct UsersView {
    store: Arc<UserStore>,
    refresh_period: Duration,
    refresh_job: Option<RefreshJob>,
    edits: BTreeMap<u32, String>,
}

impl UsersView {
    pub fn new(store: Arc<UserStore>, refresh_period: Duration) -> Self {
        Self {
            store,
            refresh_period,
            refresh_job: None,
            edits: BTreeMap::new(),
        }
    }

    pub const fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    pub const fn is_mounted(&self) -> bool {
        self.refresh_job.is_some()
    }

    /// Show the view: load users if none are loaded and start the refresh job.
    ///
    /// Must be called from within a tokio runtime. Mounting an already mounted view
    /// does nothing.
    pub fn mount(&mut self) {
        if self.is_mounted() {
            return;
        }

        if self.store.user_count() == 0 {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move { store.fetch_users().await });
        }

        self.refresh_job = Some(jobs::start_refresh_job(
            Arc::clone(&self.store),
            self.refresh_period,
        ));
        tracing::debug!(period_secs = self.refresh_period.as_secs(), "View mounted");
    }

    /// Hide the view and stop the refresh job.
    ///
    /// Calls to the source that are already running still complete.
    pub fn unmount(&mut self) {
        if let Some(job) = self.refresh_job.take() {
            job.stop();
            tracing::debug!("View unmounted");
        }
    }

    /// Put a row in edit mode, seeding the input with its current score.
    pub fn start_edit(&mut self, id: u32) -> Result<(), RosterError> {
        let score = self
            .store
            .users()
            .into_iter()
            .find(|user| user.id == id)
            .map(|user| user.score)
            .ok_or_else(|| RosterError::Validation(format!("User {id} not found")))?;

        self.edits.insert(id, score.to_string());
        Ok(())
    }

    /// Replace the pending input of a row in edit mode.
    pub fn set_edit_input(&mut self, id: u32, input: impl Into<String>) -> Result<(), RosterError> {
        let pending = self
            .edits
            .get_mut(&id)
            .ok_or_else(|| RosterError::Validation(format!("User {id} is not being edited")))?;
        *pending = input.into();
        Ok(())
    }

    /// Store the pending score and leave edit mode.
    ///
    /// A non-numeric input is rejected and the row stays in edit mode.
    pub fn save_edit(&mut self, id: u32) -> Result<i64, RosterError> {
        let input = self
            .edits
            .get(&id)
            .ok_or_else(|| RosterError::Validation(format!("User {id} is not being edited")))?;

        let score = input.trim().parse::<i64>().map_err(|_| {
            RosterError::Validation(format!("Score must be a whole number, got '{input}'"))
        })?;

        self.edits.remove(&id);
        self.store.update_user_score(id, score);
        Ok(score)
    }

    /// Leave edit mode without touching the store. Returns whether the row was editing.
    pub fn cancel_edit(&mut self, id: u32) -> bool {
        self.edits.remove(&id).is_some()
    }

    pub fn is_editing(&self, id: u32) -> bool {
        self.edits.contains_key(&id)
    }

    pub fn edit_input(&self, id: u32) -> Option<&str> {
        self.edits.get(&id).map(String::as_str)
    }

    pub fn next_page(&self) -> usize {
        let page = self.store.current_page();
        self.store.set_current_page(page as i64 + 1)
    }

    pub fn previous_page(&self) -> usize {
        let page = self.store.current_page();
        self.store.set_current_page(page as i64 - 1)
    }

    pub fn go_to_page(&self, page: i64) -> usize {
        self.store.set_current_page(page)
    }

    pub fn search(&self, query: impl Into<String>) {
        self.store.set_search_query(query);
    }

    /// Rows of the current page.
    pub fn rows(&self) -> Vec<RowView> {
        let snapshot = self.store.snapshot();
        self.rows_for(&snapshot)
    }

    fn rows_for(&self, snapshot: &StoreSnapshot) -> Vec<RowView> {
        snapshot
            .display_users
            .iter()
            .map(|user| RowView {
                rank: user.rank,
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                score: user.score,
                editing: self.edits.get(&user.id).cloned(),
                recently_updated: snapshot.is_recently_updated(user.id),
            })
            .collect()
    }

    /// Render the view as text.
    pub fn render(&self) -> String {
        let snapshot = self.store.snapshot();
        let rows = self.rows_for(&snapshot);
        render::render(&snapshot, &rows)
    }
}

impl Drop for UsersView {
    fn drop(&mut self) {
        self.unmount();
    }
}
