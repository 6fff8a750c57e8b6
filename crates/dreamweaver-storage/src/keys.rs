//! Storage keys. Names are part of the persisted format; do not rename.

use dreamweaver_core::types::{
    AppSettings, CoachingInsight, JournalEntry, SleepSession, User, UserPreferences,
};

use crate::kv::Key;

pub const USER: Key<User> = Key::new("dreamweaver_user");
pub const SLEEP_SESSIONS: Key<Vec<SleepSession>> = Key::new("dreamweaver_sleep_sessions");
pub const JOURNAL_ENTRIES: Key<Vec<JournalEntry>> = Key::new("dreamweaver_journal_entries");
pub const COACHING_INSIGHTS: Key<Vec<CoachingInsight>> =
    Key::new("dreamweaver_coaching_insights");
pub const USER_PREFERENCES: Key<UserPreferences> = Key::new("dreamweaver_user_preferences");
pub const APP_SETTINGS: Key<AppSettings> = Key::new("dreamweaver_app_settings");

/// Every key this crate writes.
pub const ALL: [&str; 6] = [
    USER.name(),
    SLEEP_SESSIONS.name(),
    JOURNAL_ENTRIES.name(),
    COACHING_INSIGHTS.name(),
    USER_PREFERENCES.name(),
    APP_SETTINGS.name(),
];
