//! On-device backend over the entity repositories.

use async_trait::async_trait;
use tracing::debug;

use dreamweaver_core::error::Result;
use dreamweaver_core::types::{
    CoachingInsight, CoachingInsightPatch, JournalEntry, JournalEntryPatch, SleepSession,
    SleepSessionPatch, User, UserPatch,
};
use dreamweaver_storage::Repositories;

use crate::operations::{DatabaseOperations, Provider};

/// Backend that reads and writes the local store. Always online; sync is a
/// no-op.
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    repos: Repositories,
}

impl LocalDatabase {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }
}

#[async_trait]
impl DatabaseOperations for LocalDatabase {
    fn provider(&self) -> Provider {
        Provider::Local
    }

    async fn get_user(&self) -> Result<Option<User>> {
        Ok(self.repos.users.get())
    }

    async fn set_user(&self, user: &User) -> Result<()> {
        self.repos.users.set(user);
        Ok(())
    }

    async fn update_user(&self, patch: UserPatch) -> Result<()> {
        self.repos.users.update(patch);
        Ok(())
    }

    async fn get_all_sessions(&self) -> Result<Vec<SleepSession>> {
        Ok(self.repos.sessions.get_all())
    }

    async fn add_session(&self, session: SleepSession) -> Result<()> {
        self.repos.sessions.add(session);
        Ok(())
    }

    async fn update_session(&self, session_id: &str, patch: SleepSessionPatch) -> Result<()> {
        self.repos.sessions.update(session_id, patch);
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.repos.sessions.delete(session_id);
        Ok(())
    }

    async fn get_all_entries(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.repos.entries.get_all())
    }

    async fn add_entry(&self, entry: JournalEntry) -> Result<()> {
        self.repos.entries.add(entry);
        Ok(())
    }

    async fn update_entry(&self, entry_id: &str, patch: JournalEntryPatch) -> Result<()> {
        self.repos.entries.update(entry_id, patch);
        Ok(())
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<()> {
        self.repos.entries.delete(entry_id);
        Ok(())
    }

    async fn get_all_insights(&self) -> Result<Vec<CoachingInsight>> {
        Ok(self.repos.insights.get_all())
    }

    async fn add_insight(&self, insight: CoachingInsight) -> Result<()> {
        self.repos.insights.add(insight);
        Ok(())
    }

    async fn update_insight(&self, insight_id: &str, patch: CoachingInsightPatch) -> Result<()> {
        self.repos.insights.update(insight_id, patch);
        Ok(())
    }

    async fn delete_insight(&self, insight_id: &str) -> Result<()> {
        self.repos.insights.delete(insight_id);
        Ok(())
    }

    async fn sync(&self) -> Result<()> {
        debug!("Local backend has nothing to sync");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dreamweaver_core::types::EntryType;
    use dreamweaver_storage::KvStore;

    fn local() -> LocalDatabase {
        LocalDatabase::new(Repositories::unbounded(KvStore::in_memory()))
    }

    #[tokio::test]
    async fn test_session_crud() {
        let db = local();
        let now = Utc::now();
        let session = SleepSession::new("u1", now - Duration::hours(8), now, 70);
        let id = session.session_id.clone();

        db.add_session(session).await.unwrap();
        assert_eq!(db.get_all_sessions().await.unwrap().len(), 1);

        db.update_session(
            &id,
            SleepSessionPatch {
                notes: Some(Some("woke at 3am".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let stored = db.get_all_sessions().await.unwrap();
        assert_eq!(stored[0].notes.as_deref(), Some("woke at 3am"));
        assert_eq!(stored[0].quality_score, 70);

        db.delete_session(&id).await.unwrap();
        db.delete_session(&id).await.unwrap();
        assert!(db.get_all_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entry_update_merges() {
        let db = local();
        let mut entry = JournalEntry::new("u1", EntryType::Pre, "wired");
        entry.entry_id = "e1".to_string();
        db.add_entry(entry).await.unwrap();

        db.update_entry(
            "e1",
            JournalEntryPatch {
                feelings_log: Some("calm".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let entries = db.get_all_entries().await.unwrap();
        assert_eq!(entries[0].feelings_log, "calm");
        assert_eq!(entries[0].entry_type, EntryType::Pre);
    }

    #[tokio::test]
    async fn test_user_and_insights() {
        let db = local();
        assert!(db.get_user().await.unwrap().is_none());

        let user = User::new("Sam");
        db.set_user(&user).await.unwrap();
        db.update_user(UserPatch {
            farcaster_id: Some(Some("fc-1".to_string())),
            ..Default::default()
        })
        .await
        .unwrap();
        let stored = db.get_user().await.unwrap().unwrap();
        assert_eq!(stored.farcaster_id.as_deref(), Some("fc-1"));

        let insight = CoachingInsight::new(&user.user_id, "Dim the lights earlier");
        let id = insight.insight_id.clone();
        db.add_insight(insight).await.unwrap();
        db.update_insight(
            &id,
            CoachingInsightPatch {
                recommendation: Some("Dim the lights an hour earlier".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(
            db.get_all_insights().await.unwrap()[0].recommendation,
            "Dim the lights an hour earlier"
        );
        db.delete_insight(&id).await.unwrap();
        assert!(db.get_all_insights().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_is_online_and_sync_noop() {
        let db = local();
        assert!(db.is_online().await);
        db.sync().await.unwrap();
        assert_eq!(db.provider(), Provider::Local);
    }
}
