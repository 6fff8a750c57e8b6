//! Entity repositories over the key-value store.
//!
//! Each collection lives under one key as an ordered list. Every mutation is a
//! single read-modify-write of that key.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use dreamweaver_core::config::MaxItemsConfig;
use dreamweaver_core::types::{
    CoachingInsight, Entity, EntryType, JournalEntry, SleepSession, User, UserPatch,
};

use crate::keys;
use crate::kv::{Key, KvStore};
use crate::preferences::{PreferencesStore, SettingsStore};

/// Number of insights returned by [`CoachingInsightRepository::get_recent`]
/// when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Ordered collection of entities stored under a single key.
#[derive(Debug, Clone)]
pub struct Collection<E: Entity> {
    store: KvStore,
    key: Key<Vec<E>>,
    max_items: usize,
}

pub type SleepSessionRepository = Collection<SleepSession>;
pub type JournalEntryRepository = Collection<JournalEntry>;
pub type CoachingInsightRepository = Collection<CoachingInsight>;

impl<E: Entity> Collection<E> {
    /// Open the collection stored under `key`, without a capacity limit.
    pub fn open(store: KvStore, key: Key<Vec<E>>) -> Self {
        Self {
            store,
            key,
            max_items: 0,
        }
    }

    /// Cap the collection at `max_items` records; `0` disables the cap.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// All records in insertion order. Empty when nothing is stored.
    pub fn get_all(&self) -> Vec<E> {
        self.store.get(self.key).unwrap_or_default()
    }

    /// First record whose id matches.
    pub fn get_by_id(&self, id: &str) -> Option<E> {
        self.get_all().into_iter().find(|item| item.id() == id)
    }

    /// Append a record.
    ///
    /// A record whose id is already present is still appended; lookups keep
    /// resolving to the earlier one. When the collection is over capacity the
    /// oldest records are evicted.
    pub fn add(&self, entity: E) {
        let mut items = self.get_all();
        if items.iter().any(|item| item.id() == entity.id()) {
            warn!(kind = E::KIND, id = %entity.id(), "Adding record with duplicate id");
        }
        items.push(entity);

        if self.max_items > 0 && items.len() > self.max_items {
            let excess = items.len() - self.max_items;
            items.drain(..excess);
            debug!(kind = E::KIND, evicted = excess, "Collection at capacity, evicted oldest");
        }

        self.store.set(self.key, &items);
    }

    /// Merge `patch` onto the first record with `id`, keeping its position.
    /// Does nothing when no record matches.
    pub fn update(&self, id: &str, patch: E::Patch) {
        let mut items = self.get_all();
        match items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.apply(patch);
                self.store.set(self.key, &items);
            }
            None => debug!(kind = E::KIND, id = %id, "Update skipped, record not found"),
        }
    }

    /// Remove every record with `id`. Does nothing when none match.
    pub fn delete(&self, id: &str) {
        let mut items = self.get_all();
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() != before {
            self.store.set(self.key, &items);
        }
    }

    /// Overwrite the whole collection. The capacity is not applied.
    pub fn replace_all(&self, items: &[E]) {
        self.store.set(self.key, &items.to_vec());
    }

    /// Records matching `predicate`, in insertion order.
    pub fn filter<P>(&self, predicate: P) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        self.get_all().into_iter().filter(|item| predicate(item)).collect()
    }
}

impl Collection<SleepSession> {
    pub fn new(store: KvStore) -> Self {
        Self::open(store, keys::SLEEP_SESSIONS)
    }

    /// Sessions whose start time lies in `[start, end]`.
    pub fn get_by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<SleepSession> {
        self.filter(|s| s.start_time >= start && s.start_time <= end)
    }

    pub fn get_by_user(&self, user_id: &str) -> Vec<SleepSession> {
        self.filter(|s| s.user_id == user_id)
    }
}

impl Collection<JournalEntry> {
    pub fn new(store: KvStore) -> Self {
        Self::open(store, keys::JOURNAL_ENTRIES)
    }

    pub fn get_by_session(&self, session_id: &str) -> Vec<JournalEntry> {
        self.filter(|e| e.session_id.as_deref() == Some(session_id))
    }

    pub fn get_by_type(&self, entry_type: EntryType) -> Vec<JournalEntry> {
        self.filter(|e| e.entry_type == entry_type)
    }

    pub fn get_by_user(&self, user_id: &str) -> Vec<JournalEntry> {
        self.filter(|e| e.user_id == user_id)
    }

    /// Entries created in `[start, end]`.
    pub fn get_by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<JournalEntry> {
        self.filter(|e| e.created_at >= start && e.created_at <= end)
    }
}

impl Collection<CoachingInsight> {
    pub fn new(store: KvStore) -> Self {
        Self::open(store, keys::COACHING_INSIGHTS)
    }

    pub fn get_by_user(&self, user_id: &str) -> Vec<CoachingInsight> {
        self.filter(|i| i.user_id == user_id)
    }

    pub fn get_by_session(&self, session_id: &str) -> Vec<CoachingInsight> {
        self.filter(|i| i.session_id.as_deref() == Some(session_id))
    }

    /// Newest insights first, at most `limit` (default 10). Insights generated
    /// at the same instant keep their insertion order.
    pub fn get_recent(&self, limit: Option<usize>) -> Vec<CoachingInsight> {
        let mut items = self.get_all();
        items.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        items.truncate(limit.unwrap_or(DEFAULT_RECENT_LIMIT));
        items
    }
}

/// The single stored user.
#[derive(Debug, Clone)]
pub struct UserRepository {
    store: KvStore,
}

impl UserRepository {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Option<User> {
        self.store.get(keys::USER)
    }

    pub fn set(&self, user: &User) {
        self.store.set(keys::USER, user);
    }

    /// Merge `patch` onto the stored user. Does nothing when no user exists.
    pub fn update(&self, patch: UserPatch) {
        match self.get() {
            Some(mut user) => {
                user.apply(patch);
                self.set(&user);
            }
            None => debug!("User update skipped, no user stored"),
        }
    }

    pub fn clear(&self) {
        self.store.remove(keys::USER);
    }
}

/// Every repository, sharing one store.
#[derive(Debug, Clone)]
pub struct Repositories {
    store: KvStore,
    pub users: UserRepository,
    pub sessions: SleepSessionRepository,
    pub entries: JournalEntryRepository,
    pub insights: CoachingInsightRepository,
    pub preferences: PreferencesStore,
    pub settings: SettingsStore,
}

impl Repositories {
    pub fn new(store: KvStore, max_items: &MaxItemsConfig) -> Self {
        Self {
            users: UserRepository::new(store.clone()),
            sessions: SleepSessionRepository::new(store.clone())
                .with_max_items(max_items.sleep_sessions),
            entries: JournalEntryRepository::new(store.clone())
                .with_max_items(max_items.journal_entries),
            insights: CoachingInsightRepository::new(store.clone())
                .with_max_items(max_items.coaching_insights),
            preferences: PreferencesStore::new(store.clone()),
            settings: SettingsStore::new(store.clone()),
            store,
        }
    }

    /// Repositories without capacity limits.
    pub fn unbounded(store: KvStore) -> Self {
        Self::new(
            store,
            &MaxItemsConfig {
                sleep_sessions: 0,
                journal_entries: 0,
                coaching_insights: 0,
            },
        )
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }
}
