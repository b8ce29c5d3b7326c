use roster_source::simulated::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Environment error: {0}")]
    Env(#[from] envy::Error),
    #[error("Source configuration error: {0}")]
    Source(#[from] ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
}
