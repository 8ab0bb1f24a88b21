use domain::{NotificationKind, Notifier};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Fans one notification out to several notifiers
pub struct CompositeNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

impl Notifier for CompositeNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        for notifier in &self.notifiers {
            // A failing sink must not starve the others
            if catch_unwind(AssertUnwindSafe(|| notifier.notify(kind, message))).is_err() {
                tracing::error!(kind = kind.as_str(), "Notifier panicked while delivering message");
            }
        }
    }
}
