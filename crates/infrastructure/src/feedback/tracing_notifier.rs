use domain::{NotificationKind, Notifier};
use tracing::{error, info, warn};

/// Writes operator notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Error => error!(kind = kind.as_str(), "{}", message),
            NotificationKind::Warning => warn!(kind = kind.as_str(), "{}", message),
            NotificationKind::Success | NotificationKind::Info => {
                info!(kind = kind.as_str(), "{}", message)
            }
        }
    }
}
