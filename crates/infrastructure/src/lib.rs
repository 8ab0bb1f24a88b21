//! Infrastructure layer - Storage, configuration and operator feedback

pub mod config;
pub mod database;
pub mod feedback;

pub use config::FrontDeskConfig;
pub use database::SqliteSessionGateway;
pub use feedback::{CompositeNotifier, LoggingSoundPlayer, TracingNotifier};
