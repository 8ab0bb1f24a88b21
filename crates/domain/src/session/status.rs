use serde::{Deserialize, Serialize};

use super::EntryAction;

/// Where the child currently is relative to the play area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Inside,
    Outside,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inside => "inside",
            Self::Outside => "outside",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "inside" => Some(Self::Inside),
            "outside" => Some(Self::Outside),
            _ => None,
        }
    }

    /// Status after one scan of the bracelet
    pub fn toggled(&self) -> Self {
        match self {
            Self::Inside => Self::Outside,
            Self::Outside => Self::Inside,
        }
    }

    /// Log action that moves a session into this status
    pub fn entry_action(&self) -> EntryAction {
        match self {
            Self::Inside => EntryAction::Enter,
            Self::Outside => EntryAction::Exit,
        }
    }
}
