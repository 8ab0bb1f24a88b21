mod code;
mod status;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use code::BraceletCode;
pub use status::BraceletStatus;

/// Physical wristband carrying a scannable code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracelet {
    pub id: String,
    pub code: BraceletCode,
    pub status: BraceletStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bracelet {
    pub fn new(id: impl Into<String>, code: BraceletCode) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            code,
            status: BraceletStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: BraceletStatus) -> Self {
        self.status = status;
        self
    }
}
