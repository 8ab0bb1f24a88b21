#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::oneshot;

use domain::{
    Bracelet, BraceletCode, BraceletSession, BraceletStatus, Child, DomainError, EntryAction,
    EntryLog, NotificationKind, Notifier, Parent, Registration, SessionGateway, SessionStatus,
    SessionWithDetails, SoundCue, SoundPlayer, TariffPlan, ToggleOutcome,
};

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 5, hour, minute, 0).unwrap()
}

pub fn session(id: &str, code: &str, child: &str) -> SessionWithDetails {
    let start = at(9, 0);
    SessionWithDetails {
        session: BraceletSession::start(id, format!("b-{id}"), format!("c-{id}"), "p1", "t-2h", start),
        bracelet: Bracelet::new(format!("b-{id}"), BraceletCode::new(code).unwrap())
            .with_status(BraceletStatus::Active),
        child: Child::new(format!("c-{id}"), "p1", Some(child.to_string())),
        parent: Parent::new("p1", "Maria Popescu", "0721234567"),
        tariff_plan: Some(TariffPlan::new("t-2h", "2 Hours", 2, 200.0)),
        entry_logs: vec![EntryLog::new(format!("l-{id}"), id, EntryAction::Enter, start)],
    }
}

pub fn outside(mut s: SessionWithDetails) -> SessionWithDetails {
    s.session.status = SessionStatus::Outside;
    s
}

pub fn ended(mut s: SessionWithDetails) -> SessionWithDetails {
    s.session.end(at(11, 0)).unwrap();
    s
}

type Gate = oneshot::Receiver<Result<Vec<SessionWithDetails>, DomainError>>;

/// In-memory gateway with call recording and fault injection
#[derive(Default)]
pub struct FakeGateway {
    pub sessions: Mutex<Vec<SessionWithDetails>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_list: AtomicBool,
    pub fail_search: AtomicBool,
    pub fail_find: AtomicBool,
    pub fail_toggle: AtomicBool,
    pub fail_register: AtomicBool,
    pub fail_end: AtomicBool,
    list_gates: Mutex<VecDeque<Gate>>,
    search_gates: Mutex<VecDeque<Gate>>,
}

impl FakeGateway {
    pub fn with_sessions(sessions: Vec<SessionWithDetails>) -> Arc<Self> {
        let fake = Self::default();
        *fake.sessions.lock().unwrap() = sessions;
        Arc::new(fake)
    }

    pub fn set_sessions(&self, sessions: Vec<SessionWithDetails>) {
        *self.sessions.lock().unwrap() = sessions;
    }

    /// Make the next list call wait for the returned sender
    pub fn gate_next_list(
        &self,
    ) -> oneshot::Sender<Result<Vec<SessionWithDetails>, DomainError>> {
        let (tx, rx) = oneshot::channel();
        self.list_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn gate_next_search(
        &self,
    ) -> oneshot::Sender<Result<Vec<SessionWithDetails>, DomainError>> {
        let (tx, rx) = oneshot::channel();
        self.search_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn failure(flag: &AtomicBool, what: &str) -> Result<(), DomainError> {
        if flag.load(Ordering::SeqCst) {
            Err(DomainError::Gateway(format!("{what} unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionGateway for FakeGateway {
    async fn list_active_sessions(&self) -> Result<Vec<SessionWithDetails>, DomainError> {
        self.record("list");
        let gate = self.list_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(DomainError::Gateway("gate dropped".into())));
        }
        Self::failure(&self.fail_list, "list")?;
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_active())
            .cloned()
            .collect())
    }

    async fn search_sessions(&self, query: &str) -> Result<Vec<SessionWithDetails>, DomainError> {
        self.record("search");
        let gate = self.search_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(DomainError::Gateway("gate dropped".into())));
        }
        Self::failure(&self.fail_search, "search")?;
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_active() && s.matches_query(query))
            .cloned()
            .collect())
    }

    async fn find_active_session_by_code(
        &self,
        code: &BraceletCode,
    ) -> Result<Option<SessionWithDetails>, DomainError> {
        self.record("find");
        Self::failure(&self.fail_find, "find")?;
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.bracelet_code() == code)
            .cloned())
    }

    async fn toggle_entry(&self, session_id: &str) -> Result<ToggleOutcome, DomainError> {
        self.record("toggle");
        Self::failure(&self.fail_toggle, "toggle")?;
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id() == session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))?;

        let now = at(10, 0);
        let status = session.session.toggle(now)?;
        let action = status.entry_action();
        let log_id = format!("l-{}-{}", session_id, session.entry_logs.len());
        session
            .entry_logs
            .push(EntryLog::new(log_id, session_id, action, now));

        Ok(ToggleOutcome {
            action,
            session: session.clone(),
        })
    }

    async fn register_bracelet(
        &self,
        registration: &Registration,
    ) -> Result<SessionWithDetails, DomainError> {
        self.record("register");
        Self::failure(&self.fail_register, "register")?;
        let mut sessions = self.sessions.lock().unwrap();
        let id = format!("s{}", sessions.len() + 1);
        let mut created = session(
            &id,
            registration.code.as_str(),
            registration.child_name.as_deref().unwrap_or("Child"),
        );
        created.child.name = registration.child_name.clone();
        created.parent = Parent::new("p1", &registration.parent_name, &registration.parent_phone);
        sessions.push(created.clone());
        Ok(created)
    }

    async fn end_session(&self, session_id: &str) -> Result<(), DomainError> {
        self.record("end");
        Self::failure(&self.fail_end, "end")?;
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id() == session_id)
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))?;
        session.session.end(at(12, 0))
    }

    async fn list_tariff_plans(&self) -> Result<Vec<TariffPlan>, DomainError> {
        self.record("tariffs");
        Ok(vec![TariffPlan::new("t-2h", "2 Hours", 2, 200.0)])
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.messages.lock().unwrap().iter().map(|(k, _)| *k).collect()
    }

    pub fn last(&self) -> Option<(NotificationKind, String)> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((kind, message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingSound {
    pub cues: Mutex<Vec<SoundCue>>,
}

#[async_trait]
impl SoundPlayer for RecordingSound {
    async fn play(&self, cue: SoundCue) {
        self.cues.lock().unwrap().push(cue);
    }
}
