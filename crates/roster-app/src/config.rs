use std::time::Duration;

use roster_source::SourceConfig;
use serde::Deserialize;

use crate::error::RosterError;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "ROSTER_";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_users_amount")]
    pub users_amount: u32,
    #[serde(default = "default_max_score")]
    pub max_score: i64,
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
    #[serde(default)]
    pub refresh_failure_rate: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

const fn default_min_delay_ms() -> u64 {
    500
}

const fn default_max_delay_ms() -> u64 {
    2000
}

const fn default_users_amount() -> u32 {
    150
}

const fn default_max_score() -> i64 {
    100
}

const fn default_failure_rate() -> f64 {
    0.1
}

const fn default_page_size() -> usize {
    20
}

const fn default_refresh_interval_secs() -> u64 {
    30
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            users_amount: default_users_amount(),
            max_score: default_max_score(),
            failure_rate: default_failure_rate(),
            refresh_failure_rate: 0.0,
            seed: None,
            page_size: default_page_size(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl RosterConfig {
    /// Load the configuration from `ROSTER_*` environment variables.
    pub fn from_env() -> Result<Self, RosterError> {
        let config: Self = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from explicit `(name, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        if self.page_size == 0 {
            return Err(RosterError::Config(
                "page size must be at least 1".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(RosterError::Config(
                "refresh interval must be at least 1 second".to_string(),
            ));
        }
        self.source_config().validate()?;
        Ok(())
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            min_delay_ms: self.min_delay_ms,
            max_delay_ms: self.max_delay_ms,
            users_amount: self.users_amount,
            max_score: self.max_score,
            failure_rate: self.failure_rate,
            refresh_failure_rate: self.refresh_failure_rate,
            seed: self.seed,
        }
    }

    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
