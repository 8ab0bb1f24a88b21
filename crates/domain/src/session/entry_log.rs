use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryAction {
    Enter,
    Exit,
}

impl EntryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enter" => Some(Self::Enter),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit row; never mutated once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryLog {
    pub id: String,
    pub session_id: String,
    pub action: EntryAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EntryLog {
    pub fn new(
        id: impl Into<String>,
        session_id: impl Into<String>,
        action: EntryAction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            session_id: session_id.into(),
            action,
            timestamp,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_enter(&self) -> bool {
        self.action == EntryAction::Enter
    }

    pub fn is_exit(&self) -> bool {
        self.action == EntryAction::Exit
    }
}
