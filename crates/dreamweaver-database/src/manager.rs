//! High-level data access used by the application layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use dreamweaver_core::error::Result;
use dreamweaver_core::types::{
    CoachingInsight, JournalEntry, SleepSession, SleepSessionPatch, User,
};

use crate::context::DatabaseContext;
use crate::operations::DatabaseOperations;

/// Aggregates over the sessions and journal entries in a time range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepStats {
    pub total_sessions: usize,
    /// Minutes. Each session's duration is floored to whole minutes first.
    pub average_duration: f64,
    pub average_quality: f64,
    pub total_journal_entries: usize,
}

pub struct DataManager {
    db: Arc<dyn DatabaseOperations>,
}

impl DataManager {
    pub fn new(db: Arc<dyn DatabaseOperations>) -> Self {
        Self { db }
    }

    /// Manager over the context's active backend.
    pub fn from_context(context: &DatabaseContext) -> Self {
        Self::new(context.database())
    }

    pub fn database(&self) -> &Arc<dyn DatabaseOperations> {
        &self.db
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        self.db.get_user().await
    }

    pub async fn save_user(&self, user: &User) -> Result<()> {
        self.db.set_user(user).await
    }

    pub async fn sleep_sessions(&self) -> Result<Vec<SleepSession>> {
        self.db.get_all_sessions().await
    }

    pub async fn save_sleep_session(&self, session: SleepSession) -> Result<()> {
        self.db.add_session(session).await
    }

    pub async fn update_sleep_session(
        &self,
        session_id: &str,
        patch: SleepSessionPatch,
    ) -> Result<()> {
        self.db.update_session(session_id, patch).await
    }

    pub async fn journal_entries(&self) -> Result<Vec<JournalEntry>> {
        self.db.get_all_entries().await
    }

    pub async fn save_journal_entry(&self, entry: JournalEntry) -> Result<()> {
        self.db.add_entry(entry).await
    }

    pub async fn coaching_insights(&self) -> Result<Vec<CoachingInsight>> {
        self.db.get_all_insights().await
    }

    pub async fn save_coaching_insight(&self, insight: CoachingInsight) -> Result<()> {
        self.db.add_insight(insight).await
    }

    /// Sync the backend when it is reachable; otherwise do nothing.
    pub async fn sync_data(&self) -> Result<()> {
        if self.db.is_online().await {
            self.db.sync().await
        } else {
            debug!(provider = %self.db.provider(), "Backend offline, sync skipped");
            Ok(())
        }
    }

    /// Statistics for sessions starting, and entries created, in
    /// `[start, end]`.
    pub async fn sleep_stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<SleepStats> {
        let sessions: Vec<SleepSession> = self
            .sleep_sessions()
            .await?
            .into_iter()
            .filter(|s| s.start_time >= start && s.start_time <= end)
            .collect();
        let total_journal_entries = self
            .journal_entries()
            .await?
            .iter()
            .filter(|e| e.created_at >= start && e.created_at <= end)
            .count();

        let total_sessions = sessions.len();
        if total_sessions == 0 {
            return Ok(SleepStats {
                total_journal_entries,
                ..SleepStats::default()
            });
        }

        let count = total_sessions as f64;
        let total_minutes: i64 = sessions.iter().map(SleepSession::duration_minutes).sum();
        let total_quality: u64 = sessions.iter().map(|s| u64::from(s.quality_score)).sum();

        Ok(SleepStats {
            total_sessions,
            average_duration: total_minutes as f64 / count,
            average_quality: total_quality as f64 / count,
            total_journal_entries,
        })
    }
}

impl std::fmt::Debug for DataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataManager")
            .field("provider", &self.db.provider())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use dreamweaver_core::types::EntryType;
    use dreamweaver_storage::{KvStore, Repositories};

    use crate::local::LocalDatabase;

    fn manager() -> DataManager {
        DataManager::new(Arc::new(LocalDatabase::new(Repositories::unbounded(
            KvStore::in_memory(),
        ))))
    }

    fn night(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, day, 23, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_stats_empty() {
        let stats = manager().sleep_stats(night(1), night(28)).await.unwrap();
        assert_eq!(stats, SleepStats::default());
    }

    #[tokio::test]
    async fn test_stats_averages() {
        let mgr = manager();
        // 450 min 59 s floors to 450.
        let start = night(1);
        mgr.save_sleep_session(SleepSession::new(
            "u1",
            start,
            start + Duration::minutes(450) + Duration::seconds(59),
            80,
        ))
        .await
        .unwrap();
        let start = night(2);
        mgr.save_sleep_session(SleepSession::new("u1", start, start + Duration::minutes(390), 61))
            .await
            .unwrap();
        // Outside the range.
        let start = night(20);
        mgr.save_sleep_session(SleepSession::new("u1", start, start + Duration::minutes(60), 10))
            .await
            .unwrap();

        let mut entry = JournalEntry::new("u1", EntryType::Post, "ok");
        entry.created_at = night(2);
        mgr.save_journal_entry(entry).await.unwrap();
        let mut late = JournalEntry::new("u1", EntryType::Post, "late");
        late.created_at = night(25);
        mgr.save_journal_entry(late).await.unwrap();

        let stats = mgr.sleep_stats(night(1), night(3)).await.unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.average_duration, 420.0);
        assert_eq!(stats.average_quality, 70.5);
        assert_eq!(stats.total_journal_entries, 1);
    }

    #[tokio::test]
    async fn test_stats_floor_reversed_session() {
        let mgr = manager();
        let start = night(1);
        mgr.save_sleep_session(SleepSession::new(
            "u1",
            start,
            start - Duration::minutes(90) - Duration::seconds(30),
            50,
        ))
        .await
        .unwrap();

        let stats = mgr.sleep_stats(night(1), night(2)).await.unwrap();
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.average_duration, -91.0);
    }

    #[tokio::test]
    async fn test_stats_serialize_camel_case() {
        let json = serde_json::to_value(SleepStats::default()).unwrap();
        assert!(json.get("totalSessions").is_some());
        assert!(json.get("averageDuration").is_some());
        assert!(json.get("totalJournalEntries").is_some());
    }

    #[tokio::test]
    async fn test_sync_data_local() {
        let mgr = manager();
        mgr.sync_data().await.unwrap();
        assert!(mgr.current_user().await.unwrap().is_none());

        let user = User::new("Kai");
        mgr.save_user(&user).await.unwrap();
        assert_eq!(mgr.current_user().await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_update_session_through_manager() {
        let mgr = manager();
        let session = SleepSession::new("u1", night(1), night(2), 40);
        let id = session.session_id.clone();
        mgr.save_sleep_session(session).await.unwrap();
        mgr.update_sleep_session(
            &id,
            SleepSessionPatch {
                quality_score: Some(55),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(mgr.sleep_sessions().await.unwrap()[0].quality_score, 55);

        mgr.save_coaching_insight(CoachingInsight::new("u1", "Go to bed earlier"))
            .await
            .unwrap();
        assert_eq!(mgr.coaching_insights().await.unwrap().len(), 1);
    }
}
