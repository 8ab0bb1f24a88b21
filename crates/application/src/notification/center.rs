use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use tracing::{debug, warn};

use domain::{Notification, NotificationKind, Notifier};

/// Default number of notifications kept in the list
pub const DEFAULT_MAX_RETAINED: usize = 50;

pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&[Notification]) + Send + Sync>;

/// Observable list of operator notifications, newest first
///
/// Every change publishes a snapshot of the whole list to all listeners. A
/// listener that panics is logged and skipped; the rest still receive the
/// snapshot.
pub struct NotificationCenter {
    notifications: Mutex<Vec<Notification>>,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
    next_listener: AtomicU64,
    enabled: AtomicBool,
    max_retained: usize,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETAINED)
    }
}

impl NotificationCenter {
    pub fn new(max_retained: usize) -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            next_listener: AtomicU64::new(1),
            enabled: AtomicBool::new(true),
            max_retained: max_retained.max(1),
        }
    }

    /// Record a notification; returns its id, or `None` while disabled
    pub fn push(&self, kind: NotificationKind, message: &str) -> Option<u64> {
        if !self.is_enabled() {
            debug!(kind = kind.as_str(), message, "Notifications disabled, dropping");
            return None;
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let notification = Notification {
            id,
            kind,
            message: message.to_string(),
            timestamp: Utc::now(),
            read: false,
        };

        self.update(|list| {
            list.insert(0, notification);
            list.truncate(self.max_retained);
        });
        Some(id)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn unread_count(&self) -> usize {
        self.lock().iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(&self, id: u64) -> bool {
        self.update(|list| match list.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        })
    }

    pub fn mark_all_read(&self) {
        self.update(|list| list.iter_mut().for_each(|n| n.read = true));
    }

    pub fn remove(&self, id: u64) -> bool {
        self.update(|list| {
            let before = list.len();
            list.retain(|n| n.id != id);
            list.len() != before
        })
    }

    pub fn clear(&self) {
        self.update(Vec::clear);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Register a listener; it receives every snapshot published after this
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&[Notification]) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the list and publish the resulting snapshot
    ///
    /// The snapshot is taken under the same lock as the mutation; listeners
    /// run after the lock is released.
    fn update<R>(&self, f: impl FnOnce(&mut Vec<Notification>) -> R) -> R {
        let (result, snapshot) = {
            let mut list = self.lock();
            let result = f(&mut *list);
            (result, list.clone())
        };
        self.publish(&snapshot);
        result
    }

    fn publish(&self, snapshot: &[Notification]) {
        let listeners: Vec<(ListenerId, Listener)> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(snapshot))).is_err() {
                warn!(listener_id = id, "Notification listener panicked");
            }
        }
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.push(kind, message);
    }
}
