use async_trait::async_trait;
use domain::{SoundCue, SoundPlayer};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Terminal bell plus a log line for each cue
///
/// A headless front desk has no speaker to drive; the cue and its
/// vibration pattern are logged instead.
pub struct LoggingSoundPlayer {
    enabled: AtomicBool,
    bell: bool,
    played: AtomicU64,
}

impl LoggingSoundPlayer {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            bell: false,
            played: AtomicU64::new(0),
        }
    }

    /// Also ring the terminal bell on stderr
    pub fn with_bell(mut self) -> Self {
        self.bell = true;
        self
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Cues played since creation; muted calls are not counted
    pub fn played(&self) -> u64 {
        self.played.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SoundPlayer for LoggingSoundPlayer {
    async fn play(&self, cue: SoundCue) {
        if !self.is_enabled() {
            return;
        }
        self.played.fetch_add(1, Ordering::Relaxed);
        debug!(
            cue = cue.as_str(),
            vibration = ?cue.vibration_pattern(),
            "Playing feedback cue"
        );
        if self.bell {
            eprint!("\x07");
        }
    }
}
