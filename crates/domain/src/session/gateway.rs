use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{EntryAction, SessionWithDetails};
use crate::DomainError;
use crate::bracelet::BraceletCode;
use crate::tariff::TariffPlan;

/// Everything the backend needs to register a bracelet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub code: BraceletCode,
    pub parent_name: String,
    pub parent_phone: String,
    #[serde(default)]
    pub child_name: Option<String>,
    pub tariff_plan_id: String,
    #[serde(default)]
    pub parent_email: Option<String>,
}

/// Result of flipping a session inside/outside
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    pub action: EntryAction,
    pub session: SessionWithDetails,
}

/// Contract for the remote session store
///
/// Implementations live in the infrastructure layer. Every failure is
/// propagated; "no such active session" is `Ok(None)`, not an error.
/// `toggle_entry` and `register_bracelet` must be atomic: either every row
/// they touch is written or none is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Active sessions ordered by start time, newest first
    async fn list_active_sessions(&self) -> Result<Vec<SessionWithDetails>, DomainError>;

    /// Active sessions whose child name, parent name, parent phone or
    /// bracelet code contains `query` (case-insensitive)
    async fn search_sessions(&self, query: &str) -> Result<Vec<SessionWithDetails>, DomainError>;

    async fn find_active_session_by_code(
        &self,
        code: &BraceletCode,
    ) -> Result<Option<SessionWithDetails>, DomainError>;

    /// Flip status and append the matching entry log row
    async fn toggle_entry(&self, session_id: &str) -> Result<ToggleOutcome, DomainError>;

    /// Bracelet, parent upsert, child, session and initial log in one unit
    async fn register_bracelet(
        &self,
        registration: &Registration,
    ) -> Result<SessionWithDetails, DomainError>;

    async fn end_session(&self, session_id: &str) -> Result<(), DomainError>;

    /// Tariff plans ordered by price, cheapest first
    async fn list_tariff_plans(&self) -> Result<Vec<TariffPlan>, DomainError>;
}
