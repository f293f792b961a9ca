//! Entity config cache and player roster.
//!
//! Non-player entities are looked up far more often than they change, so
//! their configs live in an idle-expiring map: any access refreshes the
//! entry, and an entry untouched for the idle window is rebuilt from scratch
//! on its next lookup. Players are never silently evicted; the roster holds
//! them until the owner removes them on leave.
//!
//! Both maps hand out `Arc<Mutex<_>>` handles: the map lock is held only for
//! the lookup, and mutation of one entity serializes on its own handle.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::entity::config::EntityConfig;
use crate::entity::player::PlayerConfig;

/// How long an entity config may go unaccessed before it is dropped.
pub const IDLE_EXPIRY: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    config: Arc<Mutex<EntityConfig>>,
    last_access: Instant,
}

pub struct EntityCache {
    entries: Mutex<HashMap<Uuid, CacheEntry>>,
    idle_expiry: Duration,
    clock: Arc<dyn Clock>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), IDLE_EXPIRY)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, idle_expiry: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            idle_expiry,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, CacheEntry>> {
        self.entries.lock().expect("entity cache lock poisoned")
    }

    /// The live config for `uuid`, constructing one when absent or expired.
    ///
    /// Compute-if-absent happens under the map lock, so two concurrent first
    /// accesses for the same identity observe one instance.
    pub fn get(&self, uuid: Uuid) -> Arc<Mutex<EntityConfig>> {
        let now = self.clock.now();
        let mut entries = self.lock();
        // Expired entries are swept on lookup rather than revived, so an
        // idle entity comes back with fresh (default) transient state.
        let idle_expiry = self.idle_expiry;
        entries.retain(|_, entry| now.duration_since(entry.last_access) < idle_expiry);
        let entry = entries.entry(uuid).or_insert_with(|| CacheEntry {
            config: Arc::new(Mutex::new(EntityConfig::new(uuid))),
            last_access: now,
        });
        entry.last_access = now;
        entry.config.clone()
    }

    /// Drop expired entries without touching the rest. Returns how many were
    /// evicted. For callers that sweep on a timer instead of relying on the
    /// lookup-path sweep.
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        let idle_expiry = self.idle_expiry;
        entries.retain(|_, entry| now.duration_since(entry.last_access) < idle_expiry);
        before - entries.len()
    }

    /// Drop one identity outright, e.g. when a durable player config takes
    /// over the same UUID.
    pub fn remove(&self, uuid: Uuid) {
        self.lock().remove(&uuid);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Durable player configs, held for as long as the player is present.
pub struct PlayerRoster {
    players: Mutex<HashMap<Uuid, Arc<Mutex<PlayerConfig>>>>,
    config_dir: PathBuf,
}

impl PlayerRoster {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
            config_dir: config_dir.into(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<Mutex<PlayerConfig>>>> {
        self.players.lock().expect("player roster lock poisoned")
    }

    pub fn get(&self, uuid: Uuid) -> Option<Arc<Mutex<PlayerConfig>>> {
        self.lock().get(&uuid).cloned()
    }

    /// The player's config, created on first reference.
    pub fn get_or_add(&self, uuid: Uuid) -> Arc<Mutex<PlayerConfig>> {
        self.lock()
            .entry(uuid)
            .or_insert_with(|| {
                Arc::new(Mutex::new(PlayerConfig::new(uuid, &self.config_dir)))
            })
            .clone()
    }

    /// Register a joining player, dropping any transient entity-cache entry
    /// the durable config replaces.
    pub fn join(&self, uuid: Uuid, entities: &EntityCache) -> Arc<Mutex<PlayerConfig>> {
        entities.remove(uuid);
        self.get_or_add(uuid)
    }

    /// Forget a departed player. The handle stays valid for anyone still
    /// holding it.
    pub fn remove(&self, uuid: Uuid) -> Option<Arc<Mutex<PlayerConfig>>> {
        self.lock().remove(&uuid)
    }

    /// Snapshot of the present players.
    pub fn uuids(&self) -> Vec<Uuid> {
        self.lock().keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache_with_clock() -> (EntityCache, ManualClock) {
        let clock = ManualClock::new();
        let cache = EntityCache::with_clock(Arc::new(clock.clone()), IDLE_EXPIRY);
        (cache, clock)
    }

    #[test]
    fn repeated_lookup_returns_same_instance() {
        let (cache, _clock) = cache_with_clock();
        let uuid = Uuid::new_v4();
        let first = cache.get(uuid);
        let second = cache.get(uuid);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn idle_entry_is_rebuilt_after_expiry() {
        let (cache, clock) = cache_with_clock();
        let uuid = Uuid::new_v4();
        let first = cache.get(uuid);
        clock.advance(IDLE_EXPIRY + Duration::from_secs(1));
        let second = cache.get(uuid);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn access_resets_the_idle_timer() {
        let (cache, clock) = cache_with_clock();
        let uuid = Uuid::new_v4();
        let first = cache.get(uuid);
        clock.advance(IDLE_EXPIRY - Duration::from_secs(1));
        cache.get(uuid);
        clock.advance(IDLE_EXPIRY - Duration::from_secs(1));
        let third = cache.get(uuid);
        assert!(Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn evict_idle_reports_removed_count() {
        let (cache, clock) = cache_with_clock();
        cache.get(Uuid::new_v4());
        cache.get(Uuid::new_v4());
        clock.advance(Duration::from_secs(60));
        let survivor = Uuid::new_v4();
        cache.get(survivor);
        clock.advance(IDLE_EXPIRY - Duration::from_secs(30));
        assert_eq!(cache.evict_idle(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn join_replaces_transient_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (cache, _clock) = cache_with_clock();
        let roster = PlayerRoster::new(dir.path());
        let uuid = Uuid::new_v4();

        cache.get(uuid);
        assert_eq!(cache.len(), 1);
        let player = roster.join(uuid, &cache);
        assert!(cache.is_empty());
        assert_eq!(player.lock().unwrap().uuid(), uuid);
        assert!(Arc::ptr_eq(&player, &roster.get_or_add(uuid)));
    }

    #[test]
    fn roster_remove_forgets_the_player() {
        let dir = tempfile::tempdir().expect("tempdir");
        let roster = PlayerRoster::new(dir.path());
        let uuid = Uuid::new_v4();
        roster.get_or_add(uuid);
        assert_eq!(roster.uuids(), vec![uuid]);
        assert!(roster.remove(uuid).is_some());
        assert!(roster.get(uuid).is_none());
    }
}
