mod details;
mod entity;
mod entry_log;
mod gateway;
mod status;

pub use details::SessionWithDetails;
pub use entity::BraceletSession;
pub use entry_log::{EntryAction, EntryLog};
pub use gateway::{Registration, SessionGateway, ToggleOutcome};
#[cfg(test)]
pub use gateway::MockSessionGateway;
pub use status::SessionStatus;
