pub mod composite_notifier;
pub mod sound_player;
pub mod tracing_notifier;

pub use composite_notifier::CompositeNotifier;
pub use sound_player::LoggingSoundPlayer;
pub use tracing_notifier::TracingNotifier;
