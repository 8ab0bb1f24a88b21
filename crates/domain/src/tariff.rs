use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A priced, duration-bound admission product
///
/// Tariff plans are read-only from the front desk's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration_hours: u32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl TariffPlan {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        duration_hours: u32,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            duration_hours,
            price: price.max(0.0),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_hours * 60
    }
}
