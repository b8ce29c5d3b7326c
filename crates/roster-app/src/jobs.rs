//! Background jobs tied to a mounted view.
//!
//! The score refresh job ticks once per period, starting one full period after it is
//! started. Each tick spawns its own refresh so a slow source never delays the next
//! tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::store::UserStore;

/// Default period between two score refreshes
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// Handle to a running refresh job. Dropping it stops the job.
#[derive(Debug)]
pub struct RefreshJob {
    handle: JoinHandle<()>,
}

impl RefreshJob {
    /// Stop the job. No tick fires after this returns.
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshJob {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start refreshing user scores every `period`
///
/// Must be called from within a tokio runtime.
pub fn start_refresh_job(store: Arc<UserStore>, period: Duration) -> RefreshJob {
    RefreshJob {
        handle: tokio::spawn(periodic_score_refresh_job(store, period)),
    }
}

async fn periodic_score_refresh_job(store: Arc<UserStore>, period: Duration) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        tracing::debug!("Score refresh tick");
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.refresh_user_scores().await });
    }
}
