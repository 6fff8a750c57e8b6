use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DreamweaverError, Result};

/// Top-level configuration for the DreamWeaver application.
///
/// Loaded from `~/.dreamweaver/config.toml` by default. Every section falls
/// back to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DreamweaverConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub sleep: SleepConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl DreamweaverConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DreamweaverConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DreamweaverError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the SQLite store and backups.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.dreamweaver/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Local store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Per-collection capacity.
    #[serde(default)]
    pub max_items: MaxItemsConfig,
}

/// Capacity of each entity collection. `0` disables the cap.
///
/// When a collection is at its cap, adding a record evicts the oldest
/// records by insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxItemsConfig {
    pub sleep_sessions: usize,
    pub journal_entries: usize,
    pub coaching_insights: usize,
}

impl Default for MaxItemsConfig {
    fn default() -> Self {
        Self {
            sleep_sessions: 1000,
            journal_entries: 1000,
            coaching_insights: 100,
        }
    }
}

/// Backend selection.
///
/// `provider` is a free-form tag so that configs written for providers this
/// build does not know about still load; the factory falls back to the local
/// backend for those.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// One of "local", "supabase", "firebase", "custom".
    pub provider: String,
    /// Remote endpoint, e.g. "https://xyz.supabase.co".
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    /// Timeout for the reachability probe of remote backends.
    pub probe_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            api_url: None,
            api_key: None,
            project_id: None,
            probe_timeout_ms: 3000,
        }
    }
}

impl DatabaseConfig {
    /// Config selecting the local backend.
    pub fn local() -> Self {
        Self::default()
    }

    /// Config selecting a remote provider at `api_url`.
    pub fn remote(provider: &str, api_url: &str) -> Self {
        Self {
            provider: provider.to_string(),
            api_url: Some(api_url.to_string()),
            ..Self::default()
        }
    }
}

/// Feature flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub ai_insights: bool,
    pub notifications: bool,
    pub cloud_sync: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ai_insights: true,
            notifications: true,
            cloud_sync: false,
        }
    }
}

/// Sleep tracking limits and scoring thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepConfig {
    /// Sessions shorter than this are logged as suspicious.
    pub min_duration_minutes: i64,
    /// Sessions longer than this are logged as suspicious.
    pub max_duration_minutes: i64,
    #[serde(default)]
    pub quality_thresholds: QualityThresholds,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            min_duration_minutes: 2 * 60,
            max_duration_minutes: 12 * 60,
            quality_thresholds: QualityThresholds::default(),
        }
    }
}

/// Lower bounds of each quality band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub excellent: u8,
    pub good: u8,
    pub fair: u8,
    pub poor: u8,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            excellent: 90,
            good: 75,
            fair: 60,
            poor: 45,
        }
    }
}

/// Notification message templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub morning: NotificationTemplate,
    pub evening: NotificationTemplate,
    pub insight: NotificationTemplate,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            morning: NotificationTemplate {
                enabled: true,
                title: "Good morning! How did you sleep?".to_string(),
                body: "Take a moment to log your sleep quality and start your day right."
                    .to_string(),
            },
            evening: NotificationTemplate {
                enabled: true,
                title: "Time to wind down for sleep".to_string(),
                body: "Consider a short meditation or breathing exercise before bed.".to_string(),
            },
            insight: NotificationTemplate {
                enabled: true,
                title: "New Sleep Insight Available".to_string(),
                body: "Check out your personalized sleep recommendations.".to_string(),
            },
        }
    }
}

/// A single notification: title and body strings only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub enabled: bool,
    pub title: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = DreamweaverConfig::default();
        assert_eq!(config.general.data_dir, "~/.dreamweaver/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.storage.max_items.sleep_sessions, 1000);
        assert_eq!(config.storage.max_items.coaching_insights, 100);
        assert_eq!(config.database.provider, "local");
        assert!(config.database.api_url.is_none());
        assert!(config.features.ai_insights);
        assert!(!config.features.cloud_sync);
        assert_eq!(config.sleep.quality_thresholds.excellent, 90);
    }

    #[test]
    fn test_load_partial_config() {
        let content = r#"
[general]
log_level = "debug"

[database]
provider = "supabase"
api_url = "https://example.supabase.co"
project_id = "dw-prod"

[storage.max_items]
coaching_insights = 10
"#;
        let file = create_temp_config(content);
        let config = DreamweaverConfig::load(file.path()).unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.data_dir, "~/.dreamweaver/data");
        assert_eq!(config.database.provider, "supabase");
        assert_eq!(
            config.database.api_url.as_deref(),
            Some("https://example.supabase.co")
        );
        assert_eq!(config.database.project_id.as_deref(), Some("dw-prod"));
        assert!(config.database.api_key.is_none());
        assert_eq!(config.database.probe_timeout_ms, 3000);
        assert_eq!(config.storage.max_items.coaching_insights, 10);
        assert_eq!(config.storage.max_items.sleep_sessions, 1000);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DreamweaverConfig::load_or_default(&dir.path().join("nope.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        assert!(DreamweaverConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_config_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        let mut config = DreamweaverConfig::default();
        config.database.provider = "firebase".to_string();
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = DreamweaverConfig::load(&path).unwrap();
        assert_eq!(reloaded.database.provider, "firebase");
        assert_eq!(reloaded.notifications.insight.title, "New Sleep Insight Available");
    }

    #[test]
    fn test_database_config_constructors() {
        let local = DatabaseConfig::local();
        assert_eq!(local.provider, "local");

        let remote = DatabaseConfig::remote("supabase", "https://db.example.com");
        assert_eq!(remote.provider, "supabase");
        assert_eq!(remote.api_url.as_deref(), Some("https://db.example.com"));
    }
}
