pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod store;
pub mod tracing;
pub mod view;

pub use config::RosterConfig;
pub use error::RosterError;
pub use store::{StoreSnapshot, UserStore};
pub use view::{RowView, UsersView};
