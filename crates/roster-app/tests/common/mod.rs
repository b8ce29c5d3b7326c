use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use roster_app::UserStore;
use roster_source::{SourceError, User, UserSource};
use tokio::sync::{Notify, oneshot};

type QueuedRefresh = (Option<oneshot::Receiver<()>>, Result<Option<User>, SourceError>);

/// Test double for the remote source
///
/// Every fetch returns the configured users unless a failure was queued with
/// [`ScriptedSource::fail_next_fetch`]. Refreshes pop queued outcomes and answer
/// `Ok(None)` once the queue is empty; a gated outcome is only returned once its
/// sender fires. Calls are counted so tests can spy on them.
pub struct ScriptedSource {
    users: Vec<User>,
    fetch_failures: Mutex<VecDeque<SourceError>>,
    refreshes: Mutex<VecDeque<QueuedRefresh>>,
    fetch_gate: Option<Arc<Notify>>,
    fetch_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users,
            fetch_failures: Mutex::new(VecDeque::new()),
            refreshes: Mutex::new(VecDeque::new()),
            fetch_gate: None,
            fetch_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// Make every fetch wait until the returned `Notify` is signalled.
    pub fn gated(users: Vec<User>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let source = Self {
            fetch_gate: Some(Arc::clone(&gate)),
            ..Self::new(users)
        };
        (source, gate)
    }

    pub fn fail_next_fetch(&self, error: SourceError) {
        self.fetch_failures.lock().unwrap().push_back(error);
    }

    pub fn queue_refresh(&self, outcome: Result<Option<User>, SourceError>) {
        self.refreshes.lock().unwrap().push_back((None, outcome));
    }

    /// Queue an outcome that the refresh taking it holds back until the sender fires.
    pub fn queue_gated_refresh(
        &self,
        outcome: Result<Option<User>, SourceError>,
    ) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.refreshes.lock().unwrap().push_back((Some(gate), outcome));
        release
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserSource for ScriptedSource {
    async fn fetch_all(&self) -> Result<Vec<User>, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }

        let failure = self.fetch_failures.lock().unwrap().pop_front();
        match failure {
            Some(error) => Err(error),
            None => Ok(self.users.clone()),
        }
    }

    async fn refresh_one(&self, _current: &[User]) -> Result<Option<User>, SourceError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.refreshes.lock().unwrap().pop_front();
        let Some((gate, outcome)) = next else {
            return Ok(None);
        };

        if let Some(gate) = gate {
            gate.await.expect("refresh gate dropped");
        }
        outcome
    }
}

/// Users named `Test User {id}` with ids from 1 and scores rising by 5
pub fn generate_users(count: u32, base_score: i64) -> Vec<User> {
    (1..=count)
        .map(|id| {
            User::new(
                id,
                format!("Test User {id}"),
                format!("test{id}@example.com"),
                base_score + i64::from(id - 1) * 5,
            )
        })
        .collect()
}

/// Build a store on top of `source`, keeping a handle to the source for spying
pub fn store_with(source: ScriptedSource) -> (Arc<ScriptedSource>, Arc<UserStore>) {
    let source = Arc::new(source);
    let store = Arc::new(UserStore::new(Arc::clone(&source) as Arc<dyn UserSource>));
    (source, store)
}

/// Build a store already loaded with `users`
pub async fn loaded_store(users: Vec<User>) -> (Arc<ScriptedSource>, Arc<UserStore>) {
    let (source, store) = store_with(ScriptedSource::new(users));
    store.fetch_users().await;
    (source, store)
}

/// Let spawned tasks run until they are all waiting again
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Move (paused) time forward and let woken tasks run
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
    settle().await;
}
