mod auto_refresh;
mod store;

pub use auto_refresh::{DEFAULT_REFRESH_INTERVAL, spawn_auto_refresh};
pub use store::{Reconciled, ScanAction, ScanOutcome, ScanPhase, SessionStore};
