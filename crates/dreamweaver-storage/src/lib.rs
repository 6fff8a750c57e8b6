//! DreamWeaver storage crate - local-first persistence.
//!
//! A key-value store over SQLite (or memory), the entity repositories built
//! on top of it, the preference and settings stores, and snapshot
//! export/import.

pub mod db;
pub mod keys;
pub mod kv;
pub mod migrations;
pub mod preferences;
pub mod repository;
pub mod snapshot;

pub use db::Database;
pub use kv::{Key, KvBackend, KvStore, MemoryBackend, SqliteBackend};
pub use preferences::{PreferencesStore, SettingsStore};
pub use repository::{
    CoachingInsightRepository, Collection, JournalEntryRepository, Repositories,
    SleepSessionRepository, UserRepository, DEFAULT_RECENT_LIMIT,
};
pub use snapshot::{backup_file_name, clear_all, export_all, import_all, SnapshotDocument};
