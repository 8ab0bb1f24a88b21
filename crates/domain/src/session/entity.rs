use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionStatus;
use crate::error::{DomainError, Result};

/// One visit lifecycle for a bracelet, from registration to explicit end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraceletSession {
    pub id: String,
    pub bracelet_id: String,
    pub child_id: String,
    pub parent_id: String,
    pub tariff_plan_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BraceletSession {
    /// A freshly registered session: active and inside
    pub fn start(
        id: impl Into<String>,
        bracelet_id: impl Into<String>,
        child_id: impl Into<String>,
        parent_id: impl Into<String>,
        tariff_plan_id: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            bracelet_id: bracelet_id.into(),
            child_id: child_id.into(),
            parent_id: parent_id.into(),
            tariff_plan_id: tariff_plan_id.into(),
            start_time,
            end_time: None,
            is_active: true,
            status: SessionStatus::Inside,
            created_at: start_time,
            updated_at: start_time,
        }
    }

    /// Flip inside/outside; an ended session must not be toggled
    pub fn toggle(&mut self, at: DateTime<Utc>) -> Result<SessionStatus> {
        if !self.is_active {
            return Err(DomainError::SessionInactive(self.id.clone()));
        }
        self.status = self.status.toggled();
        self.updated_at = at;
        Ok(self.status)
    }

    /// Stamp the end time and deactivate
    pub fn end(&mut self, at: DateTime<Utc>) -> Result<()> {
        if !self.is_active {
            return Err(DomainError::SessionInactive(self.id.clone()));
        }
        self.is_active = false;
        self.end_time = Some(at);
        self.status = SessionStatus::Outside;
        self.updated_at = at;
        Ok(())
    }

    /// Minutes from start to end, or to `now` while still running
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).num_milliseconds() as f64 / 60_000.0
    }
}
