use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use application::NotificationCenter;
use domain::{NotificationKind, Notifier};

#[test]
fn test_newest_first_and_capped() {
    let center = NotificationCenter::new(3);
    for i in 0..5 {
        center.push(NotificationKind::Info, &format!("message {i}"));
    }

    let messages: Vec<_> = center
        .notifications()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, vec!["message 4", "message 3", "message 2"]);
}

#[test]
fn test_read_state() {
    let center = NotificationCenter::default();
    let first = center.push(NotificationKind::Success, "one").unwrap();
    center.push(NotificationKind::Error, "two");
    assert_eq!(center.unread_count(), 2);

    assert!(center.mark_read(first));
    assert!(!center.mark_read(999));
    assert_eq!(center.unread_count(), 1);

    center.mark_all_read();
    assert_eq!(center.unread_count(), 0);

    assert!(center.remove(first));
    assert_eq!(center.notifications().len(), 1);
    center.clear();
    assert!(center.notifications().is_empty());
}

#[test]
fn test_disabled_center_drops_pushes() {
    let center = NotificationCenter::default();
    center.set_enabled(false);

    assert_eq!(center.push(NotificationKind::Warning, "ignored"), None);
    center.error("also ignored");
    assert!(center.notifications().is_empty());

    center.set_enabled(true);
    center.success("kept");
    assert_eq!(center.notifications()[0].kind, NotificationKind::Success);
}

#[test]
fn test_panicking_listener_does_not_starve_others() {
    let center = NotificationCenter::default();
    let seen = Arc::new(AtomicUsize::new(0));

    center.subscribe(|_| panic!("listener failure"));
    let counter = seen.clone();
    center.subscribe(move |list| {
        counter.store(list.len(), Ordering::SeqCst);
    });

    center.push(NotificationKind::Info, "first");
    center.push(NotificationKind::Info, "second");

    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert_eq!(center.notifications().len(), 2);
}

#[test]
fn test_unsubscribed_listener_stops_receiving() {
    let center = NotificationCenter::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let id = center.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    center.push(NotificationKind::Info, "seen");
    assert!(center.unsubscribe(id));
    assert_eq!(center.listener_count(), 0);
    center.push(NotificationKind::Info, "unseen");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
