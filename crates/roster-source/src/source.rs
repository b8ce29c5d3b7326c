use async_trait::async_trait;
use thiserror::Error;

use crate::models::User;

/// Message surfaced when the simulated network drops a call.
pub const SIMULATED_NETWORK_ERROR: &str = "Oops! A simulated network error occurred.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Oops! A simulated network error occurred.")]
    SimulatedNetwork,
    #[error("{0}")]
    Other(String),
}

/// Remote side of the roster: where users come from and where score refreshes happen.
///
/// Object-safe and async-friendly via `async_trait`, so the store can hold an
/// `Arc<dyn UserSource>` and tests can swap in scripted outcomes.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Load the full user collection.
    async fn fetch_all(&self) -> Result<Vec<User>, SourceError>;

    /// Pick one user from `current` and give it a new score.
    ///
    /// Returns the updated copy, or `None` when the chosen id is not part of `current`.
    async fn refresh_one(&self, current: &[User]) -> Result<Option<User>, SourceError>;
}
