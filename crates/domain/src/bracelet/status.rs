use serde::{Deserialize, Serialize};

/// Lifecycle of a physical bracelet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BraceletStatus {
    /// Free to hand out
    Available,
    /// Attached to an active session
    Active,
    Lost,
    Broken,
}

impl BraceletStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Active => "active",
            Self::Lost => "lost",
            Self::Broken => "broken",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "active" => Some(Self::Active),
            "lost" => Some(Self::Lost),
            "broken" => Some(Self::Broken),
            _ => None,
        }
    }

    /// Lost and broken bracelets are out of circulation
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Available | Self::Active)
    }
}

impl Default for BraceletStatus {
    fn default() -> Self {
        Self::Available
    }
}
