//! Snapshot export and import of everything the app stores.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use dreamweaver_core::error::Result;
use dreamweaver_core::types::{
    AppSettings, CoachingInsight, JournalEntry, SleepSession, User, UserPreferences,
};

use crate::keys;
use crate::repository::Repositories;

/// Portable document holding the full contents of the store.
///
/// On import every field is optional; a missing or `null` section leaves the
/// corresponding store untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotDocument {
    pub user: Option<User>,
    pub sleep_sessions: Option<Vec<SleepSession>>,
    pub journal_entries: Option<Vec<JournalEntry>>,
    pub coaching_insights: Option<Vec<CoachingInsight>>,
    pub preferences: Option<UserPreferences>,
    pub settings: Option<AppSettings>,
    pub export_date: Option<DateTime<Utc>>,
}

impl SnapshotDocument {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document as `dreamweaver-backup-YYYY-MM-DD.json` into `dir`,
    /// named after the export date (today when absent).
    pub fn write_backup(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let date = self.export_date.unwrap_or_else(Utc::now).date_naive();
        let path = dir.join(backup_file_name(date));
        std::fs::write(&path, self.to_json_pretty()?)?;
        info!("Backup written to {}", path.display());
        Ok(path)
    }
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("dreamweaver-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Collect every stored record into one document.
pub fn export_all(repos: &Repositories) -> SnapshotDocument {
    SnapshotDocument {
        user: repos.users.get(),
        sleep_sessions: Some(repos.sessions.get_all()),
        journal_entries: Some(repos.entries.get_all()),
        coaching_insights: Some(repos.insights.get_all()),
        preferences: Some(repos.preferences.get()),
        settings: Some(repos.settings.get()),
        export_date: Some(Utc::now()),
    }
}

/// Restore stores from a JSON document produced by [`export_all`].
///
/// The whole document is parsed before anything is written: on any syntax or
/// shape error this returns `false` and no store changes. Otherwise each
/// present section overwrites its store wholesale.
pub fn import_all(repos: &Repositories, json: &str) -> bool {
    let document: SnapshotDocument = match serde_json::from_str(json) {
        Ok(document) => document,
        Err(e) => {
            error!(error = %e, "Import rejected, document could not be parsed");
            return false;
        }
    };
    restore(repos, document);
    true
}

/// Write every present section of `document` into its store.
pub fn restore(repos: &Repositories, document: SnapshotDocument) {
    let mut sections = Vec::new();
    if let Some(user) = &document.user {
        repos.users.set(user);
        sections.push("user");
    }
    if let Some(sessions) = &document.sleep_sessions {
        repos.sessions.replace_all(sessions);
        sections.push("sleepSessions");
    }
    if let Some(entries) = &document.journal_entries {
        repos.entries.replace_all(entries);
        sections.push("journalEntries");
    }
    if let Some(insights) = &document.coaching_insights {
        repos.insights.replace_all(insights);
        sections.push("coachingInsights");
    }
    if let Some(preferences) = &document.preferences {
        repos.preferences.set(preferences);
        sections.push("preferences");
    }
    if let Some(settings) = &document.settings {
        repos.settings.set(settings);
        sections.push("settings");
    }
    info!(sections = ?sections, "Snapshot imported");
}

/// Remove every key the app owns.
pub fn clear_all(repos: &Repositories) {
    for key in keys::ALL {
        repos.store().remove_raw(key);
    }
    info!("All app data cleared");
}
