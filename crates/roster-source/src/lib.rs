pub mod models;
pub mod simulated;
pub mod source;

pub use models::User;
pub use simulated::{SimulatedSource, SourceConfig};
pub use source::{SourceError, UserSource};
