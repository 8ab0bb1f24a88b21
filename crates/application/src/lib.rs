//! Application layer - Front desk workflows on top of the domain model

pub mod notification;
pub mod order;
pub mod session;

pub use notification::NotificationCenter;
pub use order::OrderBook;
pub use session::{
    Reconciled, ScanAction, ScanOutcome, ScanPhase, SessionStore, spawn_auto_refresh,
};
