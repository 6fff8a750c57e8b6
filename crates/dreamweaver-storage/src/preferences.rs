//! Single-record stores for user preferences and application settings.
//!
//! Both always resolve to a complete record: nothing stored yields the
//! defaults, and a partially stored record is completed field by field.

use chrono::{DateTime, Utc};

use dreamweaver_core::types::{AppSettings, PreferencesPatch, SettingsPatch, UserPreferences};

use crate::keys;
use crate::kv::KvStore;

#[derive(Debug, Clone)]
pub struct PreferencesStore {
    store: KvStore,
}

impl PreferencesStore {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    pub fn get(&self) -> UserPreferences {
        self.store.get(keys::USER_PREFERENCES).unwrap_or_default()
    }

    /// Replace the stored preferences.
    pub fn set(&self, preferences: &UserPreferences) {
        self.store.set(keys::USER_PREFERENCES, preferences);
    }

    /// Merge `patch` onto the current preferences and store the result.
    pub fn update(&self, patch: PreferencesPatch) {
        let mut preferences = self.get();
        preferences.apply(patch);
        self.set(&preferences);
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    store: KvStore,
}

impl SettingsStore {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    pub fn get(&self) -> AppSettings {
        self.store.get(keys::APP_SETTINGS).unwrap_or_default()
    }

    pub fn set(&self, settings: &AppSettings) {
        self.store.set(keys::APP_SETTINGS, settings);
    }

    pub fn update(&self, patch: SettingsPatch) {
        let mut settings = self.get();
        settings.apply(patch);
        self.set(&settings);
    }

    pub fn last_sync_date(&self) -> Option<DateTime<Utc>> {
        self.get().last_sync_date
    }

    /// Record `at` as the most recent successful sync.
    pub fn set_last_sync_date(&self, at: DateTime<Utc>) {
        self.update(SettingsPatch {
            last_sync_date: Some(Some(at)),
            ..Default::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamweaver_core::types::{SleepGoals, Theme};

    #[test]
    fn test_defaults_on_empty_store() {
        let prefs = PreferencesStore::new(KvStore::in_memory());
        assert_eq!(prefs.get(), UserPreferences::default());

        let settings = SettingsStore::new(KvStore::in_memory()).get();
        assert!(!settings.onboarding_completed);
        assert_eq!(settings.version, "1.0.0");
        assert!(settings.last_sync_date.is_none());
    }

    #[test]
    fn test_defaults_on_unavailable_store() {
        let prefs = PreferencesStore::new(KvStore::unavailable());
        prefs.update(PreferencesPatch {
            theme: Some(Theme::Light),
            ..Default::default()
        });
        assert_eq!(prefs.get().theme, Theme::Dark);
    }

    #[test]
    fn test_partial_stored_record_completed() {
        let store = KvStore::in_memory();
        store.set_value(
            keys::USER_PREFERENCES.name(),
            &serde_json::json!({"theme": "auto"}),
        );

        let prefs = PreferencesStore::new(store).get();
        assert_eq!(prefs.theme, Theme::Auto);
        assert_eq!(prefs.sleep_goals.target_duration, 480);
        assert!(prefs.notifications.insight_notifications);
    }

    #[test]
    fn test_update_merges_and_persists() {
        let store = KvStore::in_memory();
        let prefs = PreferencesStore::new(store.clone());
        prefs.update(PreferencesPatch {
            sleep_goals: Some(SleepGoals {
                target_duration: 450,
                target_quality: 85,
            }),
            ..Default::default()
        });

        let reread = PreferencesStore::new(store).get();
        assert_eq!(reread.sleep_goals.target_duration, 450);
        assert_eq!(reread.theme, Theme::Dark);
    }

    #[test]
    fn test_set_replaces_record() {
        let prefs = PreferencesStore::new(KvStore::in_memory());
        let mut custom = UserPreferences::default();
        custom.privacy.share_insights = true;
        prefs.set(&custom);
        assert_eq!(prefs.get(), custom);
    }

    #[test]
    fn test_last_sync_date() {
        let settings = SettingsStore::new(KvStore::in_memory());
        let before = settings.get();
        let now = Utc::now();
        settings.set_last_sync_date(now);

        let after = settings.get();
        assert_eq!(after.last_sync_date, Some(now));
        assert_eq!(settings.last_sync_date(), Some(now));
        assert_eq!(after.version, before.version);

        // Stored settings keep their launch date across later updates.
        settings.update(SettingsPatch {
            onboarding_completed: Some(true),
            ..Default::default()
        });
        assert_eq!(settings.get().first_launch_date, after.first_launch_date);
    }
}
