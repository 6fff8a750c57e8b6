//! The backend contract every data source implements.

use async_trait::async_trait;

use dreamweaver_core::error::Result;
use dreamweaver_core::types::{
    CoachingInsight, CoachingInsightPatch, JournalEntry, JournalEntryPatch, SleepSession,
    SleepSessionPatch, User, UserPatch,
};

/// Known backend providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Local,
    Supabase,
    Firebase,
    /// Reserved for third-party backends; no implementation ships.
    Custom,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::Supabase => "supabase",
            Provider::Firebase => "firebase",
            Provider::Custom => "custom",
        }
    }

    /// Parse a configuration tag. Matching is case-insensitive.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Provider::Local),
            "supabase" => Some(Provider::Supabase),
            "firebase" => Some(Provider::Firebase),
            "custom" => Some(Provider::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CRUD and sync operations over users, sessions, journal entries and
/// insights.
///
/// Updates and deletes of ids that do not exist succeed without effect.
#[async_trait]
pub trait DatabaseOperations: Send + Sync {
    fn provider(&self) -> Provider;

    async fn get_user(&self) -> Result<Option<User>>;
    async fn set_user(&self, user: &User) -> Result<()>;
    async fn update_user(&self, patch: UserPatch) -> Result<()>;

    async fn get_all_sessions(&self) -> Result<Vec<SleepSession>>;
    async fn add_session(&self, session: SleepSession) -> Result<()>;
    async fn update_session(&self, session_id: &str, patch: SleepSessionPatch) -> Result<()>;
    async fn delete_session(&self, session_id: &str) -> Result<()>;

    async fn get_all_entries(&self) -> Result<Vec<JournalEntry>>;
    async fn add_entry(&self, entry: JournalEntry) -> Result<()>;
    async fn update_entry(&self, entry_id: &str, patch: JournalEntryPatch) -> Result<()>;
    async fn delete_entry(&self, entry_id: &str) -> Result<()>;

    async fn get_all_insights(&self) -> Result<Vec<CoachingInsight>>;
    async fn add_insight(&self, insight: CoachingInsight) -> Result<()>;
    async fn update_insight(&self, insight_id: &str, patch: CoachingInsightPatch) -> Result<()>;
    async fn delete_insight(&self, insight_id: &str) -> Result<()>;

    /// Reconcile with the remote side, if any.
    async fn sync(&self) -> Result<()>;

    async fn is_online(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("local"), Some(Provider::Local));
        assert_eq!(Provider::parse("Supabase"), Some(Provider::Supabase));
        assert_eq!(Provider::parse(" firebase "), Some(Provider::Firebase));
        assert_eq!(Provider::parse("custom"), Some(Provider::Custom));
        assert_eq!(Provider::parse("mongo"), None);
    }

    #[test]
    fn test_provider_display_round_trip() {
        for provider in [
            Provider::Local,
            Provider::Supabase,
            Provider::Firebase,
            Provider::Custom,
        ] {
            assert_eq!(Provider::parse(&provider.to_string()), Some(provider));
        }
    }
}
