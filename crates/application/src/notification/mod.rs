mod center;

pub use center::{DEFAULT_MAX_RETAINED, ListenerId, NotificationCenter};
