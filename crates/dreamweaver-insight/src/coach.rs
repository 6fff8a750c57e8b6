//! The end-of-night flow: score the night, store it, coach, notify.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use dreamweaver_core::config::{DreamweaverConfig, FeatureConfig, NotificationsConfig, SleepConfig};
use dreamweaver_core::error::Result;
use dreamweaver_core::types::{CoachingInsight, EntryType, JournalEntry, SleepSession};
use dreamweaver_database::DatabaseOperations;
use dreamweaver_storage::PreferencesStore;

use crate::generator::{InsightGenerator, InsightRequest, StaticInsightGenerator};
use crate::notify::{LogNotifier, Notification, NotificationKind, Notifier};
use crate::scoring::{calculate_sleep_quality, format_duration, QualityBand};

/// A finished night as reported by the user.
#[derive(Debug, Clone)]
pub struct CompletedNight {
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub pre_notes: String,
    /// How the user feels on waking; stored as the post-sleep journal entry.
    pub post_notes: String,
    pub activities: Vec<String>,
}

/// Everything stored for one completed night.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session: SleepSession,
    pub entry: JournalEntry,
    /// Absent when AI insights are disabled.
    pub insight: Option<CoachingInsight>,
    pub band: QualityBand,
}

pub struct SleepCoach {
    db: Arc<dyn DatabaseOperations>,
    preferences: PreferencesStore,
    generator: Arc<dyn InsightGenerator>,
    notifier: Arc<dyn Notifier>,
    features: FeatureConfig,
    sleep: SleepConfig,
    notifications: NotificationsConfig,
}

impl SleepCoach {
    /// Coach with the static generator and log notifier.
    pub fn new(
        db: Arc<dyn DatabaseOperations>,
        preferences: PreferencesStore,
        config: &DreamweaverConfig,
    ) -> Self {
        Self {
            db,
            preferences,
            generator: Arc::new(StaticInsightGenerator),
            notifier: Arc::new(LogNotifier),
            features: config.features.clone(),
            sleep: config.sleep.clone(),
            notifications: config.notifications.clone(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn InsightGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Store a pre-sleep journal entry.
    pub async fn log_pre_sleep(
        &self,
        user_id: &str,
        feelings: &str,
        activities: &[String],
    ) -> Result<JournalEntry> {
        let entry = JournalEntry::new(user_id, EntryType::Pre, feelings)
            .with_activities(activities.iter().cloned());
        self.db.add_entry(entry.clone()).await?;
        debug!(entry_id = %entry.entry_id, "Pre-sleep entry stored");
        Ok(entry)
    }

    /// Record a finished night.
    ///
    /// Stores the scored session and the post-sleep journal entry, then, when
    /// insights are enabled, a coaching insight for the session and a
    /// notification announcing it.
    pub async fn complete_session(&self, night: CompletedNight) -> Result<SessionOutcome> {
        let mut session = SleepSession::new(&night.user_id, night.start_time, night.end_time, 0);
        let duration = session.duration_minutes();
        if duration < self.sleep.min_duration_minutes || duration > self.sleep.max_duration_minutes {
            warn!(
                duration = %format_duration(duration),
                min = self.sleep.min_duration_minutes,
                max = self.sleep.max_duration_minutes,
                "Sleep duration outside the expected range"
            );
        }

        session.quality_score = calculate_sleep_quality(duration, &night.activities);
        let band = QualityBand::classify(session.quality_score, &self.sleep.quality_thresholds);
        self.db.add_session(session.clone()).await?;

        let entry = JournalEntry::new(&night.user_id, EntryType::Post, night.post_notes.as_str())
            .with_session(&session.session_id)
            .with_activities(night.activities.iter().cloned());
        self.db.add_entry(entry.clone()).await?;

        info!(
            session_id = %session.session_id,
            duration = %format_duration(duration),
            quality = session.quality_score,
            band = %band,
            "Sleep session completed"
        );

        let insight = if self.features.ai_insights {
            let request = InsightRequest {
                duration_minutes: duration,
                quality: session.quality_score,
                pre_notes: night.pre_notes,
                post_notes: night.post_notes,
                activities: night.activities,
            };
            let recommendation = self.generator.generate(&request).await;
            let insight = CoachingInsight::new(&night.user_id, recommendation)
                .with_session(&session.session_id);
            self.db.add_insight(insight.clone()).await?;
            debug!(generator = self.generator.name(), "Insight stored");

            if self.notifications_enabled(NotificationKind::Insight) {
                let notification =
                    Notification::insight(&self.notifications.insight, &insight.recommendation);
                self.notifier.notify(&notification).await;
            }
            Some(insight)
        } else {
            None
        };

        Ok(SessionOutcome {
            session,
            entry,
            insight,
            band,
        })
    }

    /// Send the morning or evening reminder if the user wants it.
    /// Returns whether a notification went out.
    pub async fn remind(&self, kind: NotificationKind) -> bool {
        if !self.notifications_enabled(kind) {
            debug!(kind = kind.as_str(), "Reminder disabled");
            return false;
        }
        let notification = Notification::reminder(kind, &self.notifications);
        self.notifier.notify(&notification).await;
        true
    }

    fn notifications_enabled(&self, kind: NotificationKind) -> bool {
        if !self.features.notifications {
            return false;
        }
        let prefs = self.preferences.get().notifications;
        match kind {
            NotificationKind::Morning => self.notifications.morning.enabled && prefs.morning_reminder,
            NotificationKind::Evening => self.notifications.evening.enabled && prefs.evening_reminder,
            NotificationKind::Insight => {
                self.notifications.insight.enabled && prefs.insight_notifications
            }
        }
    }
}
