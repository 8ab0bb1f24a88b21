use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, watch};
use tracing::{debug, error, info, warn};

use domain::notification::{entry_message, messages};
use domain::validation::{
    RegistrationForm, can_end_session, can_register_bracelet, can_toggle_entry,
    validate_registration_form,
};
use domain::{
    BraceletCode, DomainError, EntryAction, Notifier, Registration, SessionGateway,
    SessionWithDetails, SoundCue, SoundPlayer,
};

/// Where the scan handler currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    #[default]
    Idle,
    Scanning,
    Resolved,
}

/// What a scan did to the bracelet's session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanAction {
    /// No active session for the code; route the operator to registration
    New,
    Enter,
    Exit,
}

impl From<EntryAction> for ScanAction {
    fn from(action: EntryAction) -> Self {
        match action {
            EntryAction::Enter => Self::Enter,
            EntryAction::Exit => Self::Exit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub action: ScanAction,
    /// `None` for [`ScanAction::New`]
    pub session: Option<SessionWithDetails>,
}

impl ScanOutcome {
    fn unregistered() -> Self {
        Self {
            action: ScanAction::New,
            session: None,
        }
    }
}

/// Whether a gateway response made it into local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Applied,
    /// A newer request was issued meanwhile, or the store was shut down
    Discarded,
}

#[derive(Debug, Default)]
struct StoreState {
    sessions: Vec<SessionWithDetails>,
    filtered: Vec<SessionWithDetails>,
    query: String,
}

/// Local mirror of the active sessions held by the gateway
///
/// Loads and searches are stamped with a monotonically increasing sequence
/// number when issued. A response is applied only if its number is still the
/// latest one issued for that kind of request, so a slow reply can never
/// overwrite a fresher one. After [`SessionStore::shutdown`] every response
/// is dropped.
pub struct SessionStore {
    gateway: Arc<dyn SessionGateway>,
    notifier: Arc<dyn Notifier>,
    sound: Option<Arc<dyn SoundPlayer>>,
    state: RwLock<StoreState>,
    load_seq: AtomicU64,
    search_seq: AtomicU64,
    closed: AtomicBool,
    scan_phase: watch::Sender<ScanPhase>,
}

impl SessionStore {
    pub fn new(gateway: Arc<dyn SessionGateway>, notifier: Arc<dyn Notifier>) -> Self {
        let (scan_phase, _) = watch::channel(ScanPhase::Idle);
        Self {
            gateway,
            notifier,
            sound: None,
            state: RwLock::new(StoreState::default()),
            load_seq: AtomicU64::new(0),
            search_seq: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            scan_phase,
        }
    }

    pub fn with_sound_player(mut self, sound: Arc<dyn SoundPlayer>) -> Self {
        self.sound = Some(sound);
        self
    }

    /// Fetch all active sessions and replace local state
    ///
    /// The filtered view follows along unless a search query is active. On
    /// failure nothing local changes.
    pub async fn load(&self) -> Result<Reconciled, DomainError> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "Loading active sessions");

        let result = self.gateway.list_active_sessions().await;

        let mut state = self.state.write().await;
        if !self.is_current(&self.load_seq, seq) {
            debug!(seq, "Discarding stale session load");
            return match result {
                Ok(_) => Ok(Reconciled::Discarded),
                Err(e) => Err(e),
            };
        }

        match result {
            Ok(sessions) => {
                info!(seq, count = sessions.len(), "Sessions loaded");
                if state.query.trim().is_empty() {
                    state.filtered = sessions.clone();
                }
                state.sessions = sessions;
                Ok(Reconciled::Applied)
            }
            Err(e) => {
                drop(state);
                error!(seq, error = %e, "Failed to load sessions");
                self.notifier.error(messages::LOADING_FAILED);
                Err(e)
            }
        }
    }

    /// Operator-initiated reload
    pub async fn refresh(&self) -> Result<Reconciled, DomainError> {
        let outcome = self.load().await?;
        if outcome == Reconciled::Applied {
            self.notifier.info(messages::SESSIONS_REFRESHED);
        }
        Ok(outcome)
    }

    /// Filter the view
    ///
    /// A blank query restores the full collection locally and cancels any
    /// search still in flight. Otherwise the gateway searches; a failed
    /// search empties the view.
    pub async fn search(&self, query: &str) -> Result<Reconciled, DomainError> {
        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;

        if query.trim().is_empty() {
            let mut state = self.state.write().await;
            if self.closed.load(Ordering::SeqCst) {
                return Ok(Reconciled::Discarded);
            }
            state.query.clear();
            state.filtered = state.sessions.clone();
            return Ok(Reconciled::Applied);
        }

        self.state.write().await.query = query.to_string();
        debug!(seq, query, "Searching sessions");

        let result = self.gateway.search_sessions(query).await;

        let mut state = self.state.write().await;
        if !self.is_current(&self.search_seq, seq) {
            debug!(seq, "Discarding stale search");
            return match result {
                Ok(_) => Ok(Reconciled::Discarded),
                Err(e) => Err(e),
            };
        }

        match result {
            Ok(found) => {
                debug!(seq, count = found.len(), "Search applied");
                state.filtered = found;
                Ok(Reconciled::Applied)
            }
            Err(e) => {
                state.filtered.clear();
                drop(state);
                warn!(seq, error = %e, "Search failed");
                self.notifier.error(messages::SEARCH_FAILED);
                Err(e)
            }
        }
    }

    /// Resolve a scanned bracelet code
    ///
    /// An unknown code yields [`ScanAction::New`] without touching the
    /// gateway any further. A known code is toggled and then the store
    /// reloads; a failed toggle skips the reload.
    pub async fn scan(&self, code: &str) -> Result<ScanOutcome, DomainError> {
        self.scan_phase.send_replace(ScanPhase::Scanning);
        let result = self.resolve_scan(code).await;
        self.scan_phase.send_replace(ScanPhase::Resolved);

        match &result {
            Ok(outcome) => {
                let cue = match outcome.action {
                    ScanAction::New => SoundCue::New,
                    ScanAction::Enter => SoundCue::Enter,
                    ScanAction::Exit => SoundCue::Exit,
                };
                self.play(cue).await;
            }
            Err(_) => self.play(SoundCue::Error).await,
        }
        result
    }

    async fn resolve_scan(&self, code: &str) -> Result<ScanOutcome, DomainError> {
        let code = BraceletCode::new(code)?;

        let session = match self.gateway.find_active_session_by_code(&code).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!(code = %code, "Scanned bracelet is not registered");
                self.notifier.warning(messages::NOT_REGISTERED);
                return Ok(ScanOutcome::unregistered());
            }
            Err(e) => {
                error!(code = %code, error = %e, "Bracelet lookup failed");
                self.notifier.error(messages::SCAN_FAILED);
                return Err(e);
            }
        };

        can_toggle_entry(&session).into_result("session")?;

        let toggled = match self.gateway.toggle_entry(session.id()).await {
            Ok(toggled) => toggled,
            Err(e) => {
                error!(session_id = %session.id(), error = %e, "Toggle failed");
                self.notifier.error(messages::SCAN_FAILED);
                return Err(e);
            }
        };

        info!(
            session_id = %session.id(),
            code = %code,
            action = %toggled.action,
            "Bracelet scanned"
        );
        self.notifier.success(&entry_message(
            toggled.session.child_display_name(),
            toggled.action,
        ));

        if let Err(e) = self.load().await {
            warn!(error = %e, "Reload after scan failed");
        }

        let refreshed = self
            .find_local(toggled.session.id())
            .await
            .unwrap_or(toggled.session);

        Ok(ScanOutcome {
            action: toggled.action.into(),
            session: Some(refreshed),
        })
    }

    /// End a locally known session and reload
    pub async fn end_session(&self, session_id: &str) -> Result<(), DomainError> {
        let session = self
            .find_local(session_id)
            .await
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))?;

        can_end_session(&session).into_result("session")?;

        if let Err(e) = self.gateway.end_session(session_id).await {
            error!(session_id, error = %e, "Failed to end session");
            self.notifier.error(messages::END_FAILED);
            self.play(SoundCue::Error).await;
            return Err(e);
        }

        info!(session_id, "Session ended");
        self.notifier.success(messages::SESSION_ENDED);
        self.play(SoundCue::Success).await;

        if let Err(e) = self.load().await {
            warn!(error = %e, "Reload after ending session failed");
        }
        Ok(())
    }

    /// Validate and register a new bracelet, then reload once
    ///
    /// Every local rule runs before the gateway is contacted.
    pub async fn register(
        &self,
        form: &RegistrationForm,
    ) -> Result<SessionWithDetails, DomainError> {
        let errors = validate_registration_form(form);
        if !errors.is_empty() {
            debug!(%errors, "Registration form rejected");
            return Err(DomainError::Validation(errors));
        }

        {
            let state = self.state.read().await;
            can_register_bracelet(&form.bracelet_code, &state.sessions)
                .into_result("braceletCode")?;
        }

        let registration = Registration {
            code: BraceletCode::new(form.bracelet_code.as_str())?,
            parent_name: form.parent_name.trim().to_string(),
            parent_phone: form.parent_phone.trim().to_string(),
            child_name: non_blank(&form.child_name),
            tariff_plan_id: form.tariff_plan_id.clone(),
            parent_email: non_blank(&form.parent_email),
        };

        let session = match self.gateway.register_bracelet(&registration).await {
            Ok(session) => session,
            Err(e) => {
                error!(code = %registration.code, error = %e, "Registration failed");
                self.notifier.error(messages::REGISTRATION_FAILED);
                self.play(SoundCue::Error).await;
                return Err(e);
            }
        };

        info!(session_id = %session.id(), code = %registration.code, "Bracelet registered");
        self.notifier.success(messages::REGISTRATION);
        self.play(SoundCue::Success).await;

        if let Err(e) = self.load().await {
            warn!(error = %e, "Reload after registration failed");
        }
        Ok(session)
    }

    /// Stop applying responses; in-flight requests are left to finish and
    /// their results are dropped
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("Session store shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn sessions(&self) -> Vec<SessionWithDetails> {
        self.state.read().await.sessions.clone()
    }

    pub async fn filtered(&self) -> Vec<SessionWithDetails> {
        self.state.read().await.filtered.clone()
    }

    pub async fn query(&self) -> String {
        self.state.read().await.query.clone()
    }

    /// Sessions in the filtered view with the child inside
    pub async fn inside_count(&self) -> usize {
        self.state
            .read()
            .await
            .filtered
            .iter()
            .filter(|s| s.is_inside())
            .count()
    }

    pub async fn total_count(&self) -> usize {
        self.state.read().await.filtered.len()
    }

    pub fn scan_phase(&self) -> ScanPhase {
        *self.scan_phase.borrow()
    }

    pub fn subscribe_scan_phase(&self) -> watch::Receiver<ScanPhase> {
        self.scan_phase.subscribe()
    }

    async fn find_local(&self, session_id: &str) -> Option<SessionWithDetails> {
        self.state
            .read()
            .await
            .sessions
            .iter()
            .find(|s| s.id() == session_id)
            .cloned()
    }

    fn is_current(&self, counter: &AtomicU64, seq: u64) -> bool {
        !self.closed.load(Ordering::SeqCst) && counter.load(Ordering::SeqCst) == seq
    }

    async fn play(&self, cue: SoundCue) {
        if let Some(sound) = &self.sound {
            sound.play(cue).await;
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
