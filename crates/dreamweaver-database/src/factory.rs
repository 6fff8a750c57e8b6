use std::sync::Arc;

use tracing::{info, warn};

use dreamweaver_core::config::DatabaseConfig;
use dreamweaver_storage::Repositories;

use crate::local::LocalDatabase;
use crate::operations::{DatabaseOperations, Provider};
use crate::remote::{FirebaseDatabase, SupabaseDatabase};

/// Builds the backend selected by a [`DatabaseConfig`].
pub struct DatabaseFactory;

impl DatabaseFactory {
    /// Create the backend named by `config.provider`.
    ///
    /// Unknown providers, and `custom` which has no implementation, fall back
    /// to the local backend.
    pub fn create(config: &DatabaseConfig, repos: Repositories) -> Arc<dyn DatabaseOperations> {
        match Provider::parse(&config.provider) {
            Some(Provider::Local) => {
                info!("Using local database");
                Arc::new(LocalDatabase::new(repos))
            }
            Some(Provider::Supabase) => {
                info!(url = ?config.api_url, "Using Supabase database");
                Arc::new(SupabaseDatabase::new(config.clone()))
            }
            Some(Provider::Firebase) => {
                info!(project = ?config.project_id, "Using Firebase database");
                Arc::new(FirebaseDatabase::new(config.clone()))
            }
            Some(Provider::Custom) | None => {
                warn!(
                    "Unknown database provider: {}. Using local storage.",
                    config.provider
                );
                Arc::new(LocalDatabase::new(repos))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamweaver_storage::KvStore;

    fn create(provider: &str) -> Arc<dyn DatabaseOperations> {
        let config = DatabaseConfig {
            provider: provider.to_string(),
            ..DatabaseConfig::default()
        };
        DatabaseFactory::create(&config, Repositories::unbounded(KvStore::in_memory()))
    }

    #[test]
    fn test_known_providers() {
        assert_eq!(create("local").provider(), Provider::Local);
        assert_eq!(create("supabase").provider(), Provider::Supabase);
        assert_eq!(create("firebase").provider(), Provider::Firebase);
    }

    #[test]
    fn test_fallback_to_local() {
        assert_eq!(create("custom").provider(), Provider::Local);
        assert_eq!(create("mongo").provider(), Provider::Local);
        assert_eq!(create("").provider(), Provider::Local);
    }
}
