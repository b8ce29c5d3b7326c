//! In-process stand-in for the remote user API.
//!
//! Every call waits a random delay before answering, and a configurable share of
//! calls fails the way a flaky network would.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

use crate::models::User;
use crate::source::{SourceError, UserSource};

/// Invalid [`SourceConfig`] values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("min delay ({min} ms) is greater than max delay ({max} ms)")]
    DelayRange { min: u64, max: u64 },
    #[error("{name} must be within [0, 1], got {value}")]
    Rate { name: &'static str, value: f64 },
    #[error("max score must be positive")]
    MaxScore,
}

/// Tuning knobs for [`SimulatedSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// Shortest simulated latency, inclusive
    pub min_delay_ms: u64,
    /// Longest simulated latency, inclusive
    pub max_delay_ms: u64,
    /// Size of the generated collection, ids run `0..users_amount`
    pub users_amount: u32,
    /// Exclusive upper bound of generated scores
    pub max_score: i64,
    /// Probability that `fetch_all` fails
    pub failure_rate: f64,
    /// Probability that `refresh_one` fails
    pub refresh_failure_rate: f64,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 2000,
            users_amount: 150,
            max_score: 100,
            failure_rate: 0.1,
            refresh_failure_rate: 0.0,
            seed: None,
        }
    }
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::DelayRange {
                min: self.min_delay_ms,
                max: self.max_delay_ms,
            });
        }
        for (name, value) in [
            ("failure rate", self.failure_rate),
            ("refresh failure rate", self.refresh_failure_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Rate { name, value });
            }
        }
        if self.max_score <= 0 {
            return Err(ConfigError::MaxScore);
        }
        Ok(())
    }
}

/// Randomized [`UserSource`] with simulated latency and failures.
#[derive(Debug)]
pub struct SimulatedSource {
    config: SourceConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedSource {
    pub fn new(config: SourceConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Run `f` with the generator. The lock is never held across an await.
    fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    fn random_delay(&self) -> Duration {
        let (min, max) = (self.config.min_delay_ms, self.config.max_delay_ms);
        Duration::from_millis(self.with_rng(|rng| rng.gen_range(min..=max)))
    }

    fn random_score(rng: &mut StdRng, max_score: i64) -> i64 {
        rng.gen_range(0..max_score)
    }

    fn generate_users(&self) -> Vec<User> {
        let max_score = self.config.max_score;
        self.with_rng(|rng| {
            (0..self.config.users_amount)
                .map(|id| User::generated(id, Self::random_score(rng, max_score)))
                .collect()
        })
    }
}

#[async_trait]
impl UserSource for SimulatedSource {
    async fn fetch_all(&self) -> Result<Vec<User>, SourceError> {
        let delay = self.random_delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Simulating user fetch");
        tokio::time::sleep(delay).await;

        let failure_rate = self.config.failure_rate;
        if self.with_rng(|rng| rng.gen_bool(failure_rate)) {
            return Err(SourceError::SimulatedNetwork);
        }

        Ok(self.generate_users())
    }

    async fn refresh_one(&self, current: &[User]) -> Result<Option<User>, SourceError> {
        let delay = self.random_delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Simulating score refresh");
        tokio::time::sleep(delay).await;

        let refresh_failure_rate = self.config.refresh_failure_rate;
        if self.with_rng(|rng| rng.gen_bool(refresh_failure_rate)) {
            return Err(SourceError::SimulatedNetwork);
        }

        if self.config.users_amount == 0 {
            return Ok(None);
        }

        let (users_amount, max_score) = (self.config.users_amount, self.config.max_score);
        let (id, score) = self.with_rng(|rng| {
            (
                rng.gen_range(0..users_amount),
                Self::random_score(rng, max_score),
            )
        });

        Ok(current.iter().find(|user| user.id == id).map(|user| User {
            score,
            ..user.clone()
        }))
    }
}
