//! Cloud sync bookkeeping.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use dreamweaver_storage::SettingsStore;

use crate::operations::DatabaseOperations;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upload,
    Download,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Upload => "upload",
            Direction::Download => "download",
        }
    }
}

/// Tracks when data was last synced and gates transfers on connectivity.
///
/// No transfer is wired yet: both directions report `false` and leave the
/// store untouched.
pub struct DataSync {
    database: Arc<dyn DatabaseOperations>,
    settings: SettingsStore,
}

impl DataSync {
    pub fn new(database: Arc<dyn DatabaseOperations>, settings: SettingsStore) -> Self {
        Self { database, settings }
    }

    pub fn last_sync_date(&self) -> Option<DateTime<Utc>> {
        self.settings.last_sync_date()
    }

    /// Stamp the current instant as the last sync.
    pub fn update_last_sync_date(&self) {
        let now = Utc::now();
        self.settings.set_last_sync_date(now);
        debug!(at = %now, "Last sync date updated");
    }

    /// Push local data to the remote side. Returns whether anything was
    /// transferred.
    pub async fn sync_to_cloud(&self) -> bool {
        self.run(Direction::Upload).await
    }

    /// Pull remote data into the local store.
    pub async fn sync_from_cloud(&self) -> bool {
        self.run(Direction::Download).await
    }

    async fn run(&self, direction: Direction) -> bool {
        if !self.database.is_online().await {
            debug!(
                direction = direction.as_str(),
                provider = %self.database.provider(),
                "Offline, skipping cloud sync"
            );
            return false;
        }

        let transferred = self.transfer(direction);
        if transferred {
            self.update_last_sync_date();
        }
        transferred
    }

    fn transfer(&self, direction: Direction) -> bool {
        info!(
            direction = direction.as_str(),
            provider = %self.database.provider(),
            "Cloud sync not yet implemented"
        );
        false
    }
}
