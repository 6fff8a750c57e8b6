//! Remote backends.
//!
//! The hosted providers are configured but not wired: every CRUD call logs
//! and returns an empty result. Reachability of the configured endpoint is
//! real, so callers can already gate sync on it.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};
use url::Url;

use dreamweaver_core::config::DatabaseConfig;
use dreamweaver_core::error::{DreamweaverError, Result};
use dreamweaver_core::types::{
    CoachingInsight, CoachingInsightPatch, JournalEntry, JournalEntryPatch, SleepSession,
    SleepSessionPatch, User, UserPatch,
};

use crate::operations::{DatabaseOperations, Provider};

/// Connection details shared by the remote backends.
#[derive(Debug, Clone)]
pub struct RemoteEndpoint {
    provider: Provider,
    config: DatabaseConfig,
}

impl RemoteEndpoint {
    pub fn new(provider: Provider, config: DatabaseConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Host and port of the configured endpoint.
    fn address(&self) -> Option<(String, u16)> {
        let raw = self.config.api_url.as_deref()?;
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(provider = %self.provider, url = %raw, error = %e, "Invalid endpoint URL");
                return None;
            }
        };
        let host = url.host_str()?.to_string();
        let port = url.port_or_known_default()?;
        Some((host, port))
    }

    /// Whether a TCP connection to the endpoint opens within the probe
    /// timeout. `false` when no endpoint is configured.
    pub async fn probe(&self) -> bool {
        let Some((host, port)) = self.address() else {
            debug!(provider = %self.provider, "No endpoint configured, reporting offline");
            return false;
        };
        let timeout = Duration::from_millis(self.config.probe_timeout_ms);
        match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(provider = %self.provider, host = %host, port, error = %e, "Endpoint unreachable");
                false
            }
            Err(_) => {
                debug!(provider = %self.provider, host = %host, port, "Endpoint probe timed out");
                false
            }
        }
    }

    fn unwired(&self, operation: &str) {
        let err = DreamweaverError::NotImplemented {
            provider: self.provider.to_string(),
            operation: operation.to_string(),
        };
        info!("{}", err);
    }
}

macro_rules! unwired_backend {
    ($(#[$meta:meta])* $name:ident, $provider:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            endpoint: RemoteEndpoint,
        }

        impl $name {
            pub fn new(config: DatabaseConfig) -> Self {
                Self {
                    endpoint: RemoteEndpoint::new($provider, config),
                }
            }

            pub fn config(&self) -> &DatabaseConfig {
                self.endpoint.config()
            }
        }

        #[async_trait]
        impl DatabaseOperations for $name {
            fn provider(&self) -> Provider {
                $provider
            }

            async fn get_user(&self) -> Result<Option<User>> {
                self.endpoint.unwired("user query");
                Ok(None)
            }

            async fn set_user(&self, _user: &User) -> Result<()> {
                self.endpoint.unwired("user save");
                Ok(())
            }

            async fn update_user(&self, _patch: UserPatch) -> Result<()> {
                self.endpoint.unwired("user update");
                Ok(())
            }

            async fn get_all_sessions(&self) -> Result<Vec<SleepSession>> {
                self.endpoint.unwired("sleep sessions query");
                Ok(Vec::new())
            }

            async fn add_session(&self, _session: SleepSession) -> Result<()> {
                self.endpoint.unwired("sleep session save");
                Ok(())
            }

            async fn update_session(&self, _session_id: &str, _patch: SleepSessionPatch) -> Result<()> {
                self.endpoint.unwired("sleep session update");
                Ok(())
            }

            async fn delete_session(&self, _session_id: &str) -> Result<()> {
                self.endpoint.unwired("sleep session delete");
                Ok(())
            }

            async fn get_all_entries(&self) -> Result<Vec<JournalEntry>> {
                self.endpoint.unwired("journal entries query");
                Ok(Vec::new())
            }

            async fn add_entry(&self, _entry: JournalEntry) -> Result<()> {
                self.endpoint.unwired("journal entry save");
                Ok(())
            }

            async fn update_entry(&self, _entry_id: &str, _patch: JournalEntryPatch) -> Result<()> {
                self.endpoint.unwired("journal entry update");
                Ok(())
            }

            async fn delete_entry(&self, _entry_id: &str) -> Result<()> {
                self.endpoint.unwired("journal entry delete");
                Ok(())
            }

            async fn get_all_insights(&self) -> Result<Vec<CoachingInsight>> {
                self.endpoint.unwired("coaching insights query");
                Ok(Vec::new())
            }

            async fn add_insight(&self, _insight: CoachingInsight) -> Result<()> {
                self.endpoint.unwired("coaching insight save");
                Ok(())
            }

            async fn update_insight(
                &self,
                _insight_id: &str,
                _patch: CoachingInsightPatch,
            ) -> Result<()> {
                self.endpoint.unwired("coaching insight update");
                Ok(())
            }

            async fn delete_insight(&self, _insight_id: &str) -> Result<()> {
                self.endpoint.unwired("coaching insight delete");
                Ok(())
            }

            async fn sync(&self) -> Result<()> {
                self.endpoint.unwired("sync");
                Ok(())
            }

            async fn is_online(&self) -> bool {
                self.endpoint.probe().await
            }
        }
    };
}

unwired_backend!(
    /// Supabase (hosted Postgres) backend.
    SupabaseDatabase,
    Provider::Supabase
);

unwired_backend!(
    /// Firebase (Firestore) backend.
    FirebaseDatabase,
    Provider::Firebase
);
