use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::EntryAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A user-visible message retained by the notification centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Capability for surfacing messages to the operator
///
/// The core never talks to a global toast singleton; it is handed a
/// `Notifier` and only calls through it.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);

    fn success(&self, message: &str) {
        self.notify(NotificationKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotificationKind::Error, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NotificationKind::Warning, message);
    }

    fn info(&self, message: &str) {
        self.notify(NotificationKind::Info, message);
    }
}

/// Audible/haptic feedback cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    Enter,
    Exit,
    New,
    Success,
    Error,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::New => "new",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn vibration_pattern(&self) -> &'static [u32] {
        match self {
            Self::Enter => &[100, 50, 100],
            Self::Exit => &[200],
            Self::New => &[100, 100, 100],
            Self::Success => &[50, 50, 50, 50, 50],
            Self::Error => &[500],
        }
    }
}

impl From<EntryAction> for SoundCue {
    fn from(action: EntryAction) -> Self {
        match action {
            EntryAction::Enter => Self::Enter,
            EntryAction::Exit => Self::Exit,
        }
    }
}

/// Capability for playing feedback cues; playback failures are swallowed
#[async_trait]
pub trait SoundPlayer: Send + Sync {
    async fn play(&self, cue: SoundCue);
}

pub mod messages {
    pub const REGISTRATION: &str = "Bracelet registered successfully!";
    pub const ENTRY: &str = "{name} has entered the play area!";
    pub const EXIT: &str = "{name} has exited the play area!";
    pub const SESSION_ENDED: &str = "Session ended successfully!";
    pub const SESSIONS_REFRESHED: &str = "Sessions refreshed";
    pub const NOT_REGISTERED: &str = "Bracelet not registered. Please register first.";
    pub const SEARCH_FAILED: &str = "Search failed";
    pub const SCAN_FAILED: &str = "Error processing bracelet";
    pub const LOADING_FAILED: &str = "Failed to load sessions";
    pub const REGISTRATION_FAILED: &str = "Registration failed";
    pub const END_FAILED: &str = "Failed to end session";
}

/// Replace `{key}` placeholders; unknown keys are left as written
pub fn format_message(template: &str, values: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close)
                if close > 0
                    && after[..close]
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_') =>
            {
                let key = &after[..close];
                match values.get(key) {
                    Some(value) if !value.is_empty() => out.push_str(value),
                    _ => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// "Sofia has entered the play area!" style message for a scan
pub fn entry_message(child_name: &str, action: EntryAction) -> String {
    let template = match action {
        EntryAction::Enter => messages::ENTRY,
        EntryAction::Exit => messages::EXIT,
    };
    format_message(template, &HashMap::from([("name", child_name)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_replaces_known_keys() {
        let values = HashMap::from([("name", "Max")]);
        assert_eq!(
            format_message("{name} has entered the play area!", &values),
            "Max has entered the play area!"
        );
    }

    #[test]
    fn test_format_message_keeps_unknown_and_malformed() {
        let values = HashMap::from([("name", "Max")]);
        assert_eq!(format_message("{who} left", &values), "{who} left");
        assert_eq!(format_message("a { b", &values), "a { b");
        assert_eq!(format_message("{} {name}", &values), "{} Max");
    }

    #[test]
    fn test_entry_message() {
        assert_eq!(
            entry_message("Sofia", EntryAction::Exit),
            "Sofia has exited the play area!"
        );
    }

    #[test]
    fn test_sound_cue_from_action() {
        assert_eq!(SoundCue::from(EntryAction::Enter), SoundCue::Enter);
        assert_eq!(SoundCue::from(EntryAction::Exit), SoundCue::Exit);
        assert_eq!(SoundCue::Error.vibration_pattern(), &[500]);
    }
}
