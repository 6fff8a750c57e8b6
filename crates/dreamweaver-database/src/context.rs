//! Holder of the active backend.

use std::sync::{Arc, RwLock};

use tracing::info;

use dreamweaver_core::config::DatabaseConfig;
use dreamweaver_storage::Repositories;

use crate::factory::DatabaseFactory;
use crate::operations::DatabaseOperations;

/// One active backend for the lifetime of the application.
///
/// Constructed once by the composition root and passed to whatever needs
/// data access. The local backend is created on first access unless another
/// one was selected with [`DatabaseContext::set_database`].
pub struct DatabaseContext {
    repos: Repositories,
    active: RwLock<Option<Arc<dyn DatabaseOperations>>>,
}

impl DatabaseContext {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            active: RwLock::new(None),
        }
    }

    /// The active backend.
    pub fn database(&self) -> Arc<dyn DatabaseOperations> {
        if let Some(db) = self
            .active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            return Arc::clone(db);
        }

        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        let db = active.get_or_insert_with(|| {
            DatabaseFactory::create(&DatabaseConfig::local(), self.repos.clone())
        });
        Arc::clone(db)
    }

    /// Replace the active backend with the one `config` selects.
    pub fn set_database(&self, config: &DatabaseConfig) {
        let db = DatabaseFactory::create(config, self.repos.clone());
        info!(provider = %db.provider(), "Active database replaced");
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = Some(db);
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }
}

impl std::fmt::Debug for DatabaseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let provider = self
            .active
            .read()
            .ok()
            .and_then(|active| active.as_ref().map(|db| db.provider()));
        f.debug_struct("DatabaseContext")
            .field("active", &provider)
            .finish()
    }
}
