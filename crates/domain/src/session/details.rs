use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BraceletSession, EntryLog, SessionStatus};
use crate::bracelet::{Bracelet, BraceletCode};
use crate::family::{Child, Parent};
use crate::tariff::TariffPlan;

/// Read view joining a session with everything it references
///
/// `entry_logs` is kept in insertion order, which is chronological order.
/// The tariff plan is optional so analytics can report sessions whose plan
/// was not joined as "Unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWithDetails {
    #[serde(flatten)]
    pub session: BraceletSession,
    pub bracelet: Bracelet,
    pub child: Child,
    pub parent: Parent,
    #[serde(default)]
    pub tariff_plan: Option<TariffPlan>,
    #[serde(default)]
    pub entry_logs: Vec<EntryLog>,
}

impl SessionWithDetails {
    pub fn id(&self) -> &str {
        &self.session.id
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active
    }

    pub fn is_inside(&self) -> bool {
        self.session.status == SessionStatus::Inside
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.session.start_time
    }

    pub fn bracelet_code(&self) -> &BraceletCode {
        &self.bracelet.code
    }

    pub fn child_display_name(&self) -> &str {
        self.child.display_name()
    }

    /// Tariff price, zero when the plan is missing
    pub fn price(&self) -> f64 {
        self.tariff_plan.as_ref().map(|t| t.price).unwrap_or(0.0)
    }

    pub fn tariff_name(&self) -> Option<&str> {
        self.tariff_plan.as_ref().map(|t| t.name.as_str())
    }

    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        self.session.elapsed_minutes(now)
    }

    /// Hours spent beyond the tariff's duration, zero when within it
    pub fn overtime_hours(&self, now: DateTime<Utc>) -> f64 {
        match &self.tariff_plan {
            Some(plan) => {
                let hours = self.elapsed_minutes(now) / 60.0;
                (hours - plan.duration_hours as f64).max(0.0)
            }
            None => 0.0,
        }
    }

    pub fn is_overtime(&self, now: DateTime<Utc>) -> bool {
        self.overtime_hours(now) > 0.0
    }

    /// Case-insensitive substring match on child name, parent name,
    /// parent phone or bracelet code
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let child = self.child.name.as_deref().unwrap_or("");
        [
            child,
            self.parent.name.as_str(),
            self.parent.phone.as_str(),
            self.bracelet.code.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracelet::BraceletStatus;
    use chrono::{Duration, TimeZone};

    fn details() -> SessionWithDetails {
        let start = Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap();
        SessionWithDetails {
            session: BraceletSession::start("s1", "b1", "c1", "p1", "t1", start),
            bracelet: Bracelet::new("b1", BraceletCode::new("BR-001").unwrap())
                .with_status(BraceletStatus::Active),
            child: Child::new("c1", "p1", Some("Sofia".into())),
            parent: Parent::new("p1", "Maria Popescu", "+40 721 234 567"),
            tariff_plan: Some(TariffPlan::new("t1", "2 Hours", 2, 200.0)),
            entry_logs: vec![],
        }
    }

    #[test]
    fn test_matches_query_fields() {
        let s = details();
        assert!(s.matches_query("sof"));
        assert!(s.matches_query("POPESCU"));
        assert!(s.matches_query("721"));
        assert!(s.matches_query("br-0"));
        assert!(s.matches_query("  "));
        assert!(!s.matches_query("max"));
    }

    #[test]
    fn test_overtime() {
        let s = details();
        let now = s.start_time() + Duration::minutes(150);
        assert!(s.is_overtime(now));
        assert!((s.overtime_hours(now) - 0.5).abs() < 1e-9);
        assert!(!s.is_overtime(s.start_time() + Duration::minutes(60)));
    }

    #[test]
    fn test_price_without_plan() {
        let mut s = details();
        assert_eq!(s.price(), 200.0);
        s.tariff_plan = None;
        assert_eq!(s.price(), 0.0);
        assert_eq!(s.tariff_name(), None);
    }

    #[test]
    fn test_serializes_flat() {
        let json = serde_json::to_value(details()).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["status"], "inside");
        assert_eq!(json["bracelet"]["code"], "BR-001");
    }
}
