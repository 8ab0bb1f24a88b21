use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::bracelet::{Bracelet, BraceletCode, BraceletStatus};
use crate::family::{Child, Parent};
use crate::session::{BraceletSession, EntryAction, EntryLog, SessionStatus, SessionWithDetails};
use crate::tariff::TariffPlan;

pub(crate) fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0).unwrap()
}

pub(crate) fn tariff(name: &str, price: f64) -> TariffPlan {
    TariffPlan::new(format!("t-{name}"), name, 2, price)
}

/// Session starting at `start` with one enter log at the start time
pub(crate) fn session(id: &str, start: DateTime<Utc>, plan: Option<TariffPlan>) -> SessionWithDetails {
    let tariff_id = plan.as_ref().map(|p| p.id.clone()).unwrap_or_default();
    SessionWithDetails {
        session: BraceletSession::start(id, format!("b-{id}"), format!("c-{id}"), "p1", tariff_id, start),
        bracelet: Bracelet::new(format!("b-{id}"), BraceletCode::new(format!("BR-{id}")).unwrap())
            .with_status(BraceletStatus::Active),
        child: Child::new(format!("c-{id}"), "p1", Some(format!("Kid {id}"))),
        parent: Parent::new("p1", "Maria Popescu", "0721234567"),
        tariff_plan: plan,
        entry_logs: vec![EntryLog::new(format!("l-{id}-0"), id, EntryAction::Enter, start)],
    }
}

pub(crate) fn with_log(mut s: SessionWithDetails, action: EntryAction, when: DateTime<Utc>) -> SessionWithDetails {
    let n = s.entry_logs.len();
    let id = s.id().to_string();
    s.entry_logs
        .push(EntryLog::new(format!("l-{id}-{n}"), id, action, when));
    s.session.status = match action {
        EntryAction::Enter => SessionStatus::Inside,
        EntryAction::Exit => SessionStatus::Outside,
    };
    s
}

pub(crate) fn ended(mut s: SessionWithDetails, minutes: i64) -> SessionWithDetails {
    let end = s.start_time() + Duration::minutes(minutes);
    s.session.end(end).unwrap();
    s
}
