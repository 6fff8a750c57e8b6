use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// =============================================================================
// Entity contract
// =============================================================================

/// A persisted record with a unique identifier, stored in an ordered
/// collection under one key.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Partial update applied by a shallow field-level merge.
    type Patch;

    /// Human-readable collection name, used in logs.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Merge `patch` onto `self`. Fields absent from the patch are retained.
    fn apply(&mut self, patch: Self::Patch);
}

/// Generate a fresh opaque identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Deserialize a present field into `Some`, so that `Option<Option<T>>`
/// distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// =============================================================================
// Enums
// =============================================================================

/// When a journal entry was written relative to the night it describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Written before going to sleep.
    Pre,
    /// Written after waking up.
    Post,
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(EntryType::Pre),
            "post" => Ok(EntryType::Post),
            other => Err(format!("unknown entry type: {other}")),
        }
    }
}

/// UI colour theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Auto,
}

// =============================================================================
// Entities
// =============================================================================

/// The device owner. At most one is stored at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    /// External identity (Farcaster id), when linked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farcaster_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            user_id: new_id(),
            display_name: display_name.into(),
            farcaster_id: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub farcaster_id: Option<Option<String>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(v) = patch.user_id {
            self.user_id = v;
        }
        if let Some(v) = patch.display_name {
            self.display_name = v;
        }
        if let Some(v) = patch.farcaster_id {
            self.farcaster_id = v;
        }
        if let Some(v) = patch.created_at {
            self.created_at = v;
        }
    }
}

/// One night of sleep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSession {
    pub session_id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// 0 to 100.
    pub quality_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SleepSession {
    pub fn new(
        user_id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        quality_score: u8,
    ) -> Self {
        Self {
            session_id: new_id(),
            user_id: user_id.into(),
            start_time,
            end_time,
            quality_score,
            notes: None,
        }
    }

    /// Whole minutes between start and end, rounded down (negative when the
    /// session ends before it starts).
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds().div_euclid(60)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SleepSessionPatch {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub quality_score: Option<u8>,
    #[serde(deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
}

impl Entity for SleepSession {
    type Patch = SleepSessionPatch;
    const KIND: &'static str = "sleep_session";

    fn id(&self) -> &str {
        &self.session_id
    }

    fn apply(&mut self, patch: SleepSessionPatch) {
        if let Some(v) = patch.session_id {
            self.session_id = v;
        }
        if let Some(v) = patch.user_id {
            self.user_id = v;
        }
        if let Some(v) = patch.start_time {
            self.start_time = v;
        }
        if let Some(v) = patch.end_time {
            self.end_time = v;
        }
        if let Some(v) = patch.quality_score {
            self.quality_score = v;
        }
        if let Some(v) = patch.notes {
            self.notes = v;
        }
    }
}

/// Activity key to arbitrary value, e.g. `{"caffeine": true}`.
pub type HabitsLog = BTreeMap<String, serde_json::Value>;

/// A pre- or post-sleep journal entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub entry_id: String,
    pub user_id: String,
    /// Soft reference; the session may no longer exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub entry_type: EntryType,
    #[serde(default)]
    pub habits_log: HabitsLog,
    #[serde(default)]
    pub feelings_log: String,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    pub fn new(
        user_id: impl Into<String>,
        entry_type: EntryType,
        feelings_log: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: new_id(),
            user_id: user_id.into(),
            session_id: None,
            entry_type,
            habits_log: HabitsLog::new(),
            feelings_log: feelings_log.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Record each activity as `activity -> true`.
    pub fn with_activities<I, S>(mut self, activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for activity in activities {
            self.habits_log
                .insert(activity.into(), serde_json::Value::Bool(true));
        }
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JournalEntryPatch {
    pub entry_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub session_id: Option<Option<String>>,
    pub entry_type: Option<EntryType>,
    pub habits_log: Option<HabitsLog>,
    pub feelings_log: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for JournalEntry {
    type Patch = JournalEntryPatch;
    const KIND: &'static str = "journal_entry";

    fn id(&self) -> &str {
        &self.entry_id
    }

    fn apply(&mut self, patch: JournalEntryPatch) {
        if let Some(v) = patch.entry_id {
            self.entry_id = v;
        }
        if let Some(v) = patch.user_id {
            self.user_id = v;
        }
        if let Some(v) = patch.session_id {
            self.session_id = v;
        }
        if let Some(v) = patch.entry_type {
            self.entry_type = v;
        }
        // Shallow: a new habits log replaces the old one wholesale.
        if let Some(v) = patch.habits_log {
            self.habits_log = v;
        }
        if let Some(v) = patch.feelings_log {
            self.feelings_log = v;
        }
        if let Some(v) = patch.created_at {
            self.created_at = v;
        }
    }
}

/// A generated coaching recommendation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingInsight {
    pub insight_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub recommendation: String,
    pub generated_at: DateTime<Utc>,
}

impl CoachingInsight {
    pub fn new(user_id: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            insight_id: new_id(),
            user_id: user_id.into(),
            session_id: None,
            recommendation: recommendation.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoachingInsightPatch {
    pub insight_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub session_id: Option<Option<String>>,
    pub recommendation: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl Entity for CoachingInsight {
    type Patch = CoachingInsightPatch;
    const KIND: &'static str = "coaching_insight";

    fn id(&self) -> &str {
        &self.insight_id
    }

    fn apply(&mut self, patch: CoachingInsightPatch) {
        if let Some(v) = patch.insight_id {
            self.insight_id = v;
        }
        if let Some(v) = patch.user_id {
            self.user_id = v;
        }
        if let Some(v) = patch.session_id {
            self.session_id = v;
        }
        if let Some(v) = patch.recommendation {
            self.recommendation = v;
        }
        if let Some(v) = patch.generated_at {
            self.generated_at = v;
        }
    }
}

// =============================================================================
// Single-record configuration
// =============================================================================

/// User-facing preferences. Missing fields in stored data resolve to defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub notifications: NotificationPreferences,
    pub sleep_goals: SleepGoals,
    pub privacy: PrivacyPreferences,
    pub theme: Theme,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub morning_reminder: bool,
    pub evening_reminder: bool,
    pub insight_notifications: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            morning_reminder: true,
            evening_reminder: true,
            insight_notifications: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SleepGoals {
    /// Minutes.
    pub target_duration: u32,
    /// Percentage.
    pub target_quality: u8,
}

impl Default for SleepGoals {
    fn default() -> Self {
        Self {
            target_duration: 480,
            target_quality: 80,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacyPreferences {
    pub share_insights: bool,
    pub analytics_enabled: bool,
}

impl Default for PrivacyPreferences {
    fn default() -> Self {
        Self {
            share_insights: false,
            analytics_enabled: true,
        }
    }
}

/// Top-level shallow patch: a present section replaces the stored section.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesPatch {
    pub notifications: Option<NotificationPreferences>,
    pub sleep_goals: Option<SleepGoals>,
    pub privacy: Option<PrivacyPreferences>,
    pub theme: Option<Theme>,
}

impl UserPreferences {
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(v) = patch.notifications {
            self.notifications = v;
        }
        if let Some(v) = patch.sleep_goals {
            self.sleep_goals = v;
        }
        if let Some(v) = patch.privacy {
            self.privacy = v;
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
    }
}

/// Application bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub onboarding_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_date: Option<DateTime<Utc>>,
    pub version: String,
    pub first_launch_date: DateTime<Utc>,
}

/// Version recorded in fresh settings.
pub const APP_VERSION: &str = "1.0.0";

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            onboarding_completed: false,
            last_sync_date: None,
            version: APP_VERSION.to_string(),
            first_launch_date: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub onboarding_completed: Option<bool>,
    #[serde(deserialize_with = "deserialize_some")]
    pub last_sync_date: Option<Option<DateTime<Utc>>>,
    pub version: Option<String>,
    pub first_launch_date: Option<DateTime<Utc>>,
}

impl AppSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.onboarding_completed {
            self.onboarding_completed = v;
        }
        if let Some(v) = patch.last_sync_date {
            self.last_sync_date = v;
        }
        if let Some(v) = patch.version {
            self.version = v;
        }
        if let Some(v) = patch.first_launch_date {
            self.first_launch_date = v;
        }
    }
}
