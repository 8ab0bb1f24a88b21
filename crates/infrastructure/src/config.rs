use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retained: default_max_retained(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ring the terminal bell on every cue
    #[serde(default)]
    pub bell: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FrontDeskConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    /// Insert the stock tariff plans into an empty database
    #[serde(default = "default_true")]
    pub seed_tariffs: bool,
}

impl Default for FrontDeskConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            refresh_interval_secs: default_refresh_interval(),
            notifications: NotificationConfig::default(),
            sound: SoundConfig::default(),
            seed_tariffs: true,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_max_retained() -> usize {
    50
}
fn default_database_url() -> String {
    "sqlite://front-desk.db?mode=rwc".to_string()
}
fn default_refresh_interval() -> u64 {
    30
}

impl FrontDeskConfig {
    /// Layered load: built-in defaults, `<dir>/default`, `<dir>/<RUN_MODE>`,
    /// then `FRONTDESK__*` environment variables
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("database_url", default_database_url())?
            .set_default("refresh_interval_secs", default_refresh_interval() as i64)?
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // e.g. FRONTDESK__NOTIFICATIONS__MAX_RETAINED=20
            .add_source(Environment::with_prefix("FRONTDESK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let config = FrontDeskConfig::load("does/not/exist").unwrap();
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.notifications, NotificationConfig::default());
        assert!(config.seed_tariffs);
    }

    #[test]
    fn test_default_matches_loaded_shape() {
        let config = FrontDeskConfig::default();
        assert_eq!(config.database_url, "sqlite://front-desk.db?mode=rwc");
        assert_eq!(config.notifications.max_retained, 50);
        assert!(config.sound.enabled);
    }
}
