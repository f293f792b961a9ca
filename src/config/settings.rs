//! Process-wide settings.
//!
//! Explicitly constructed and passed by reference; nothing in this crate
//! reaches for a global instance. A pure-server process can hold an
//! [`GlobalSettings::ephemeral`] copy that never touches disk.

use std::path::Path;

use super::enums::{ShowPlayerListMode, SyncVerbosity};
use super::key::{BoolKey, EnumKey, Rejected, StringKey};
use super::store::ConfigStore;

pub mod keys {
    use super::*;

    pub const FIRST_TIME_LOAD: BoolKey = BoolKey::new("firstTimeLoad", true);

    pub const CLOUD_SYNC_ENABLED: BoolKey = BoolKey::new("cloud_sync", false);
    pub const AUTOMATIC_CLOUD_SYNC: BoolKey = BoolKey::new("sync_player_data", false);
    pub const CLOUD_SERVER: StringKey = StringKey::new("cloud_server", "");
    pub const SYNC_LOG_VERBOSITY: EnumKey<SyncVerbosity> =
        EnumKey::by_ordinal("sync_log_verbosity", SyncVerbosity::Default);

    pub const ALWAYS_SHOW_LIST: EnumKey<ShowPlayerListMode> =
        EnumKey::by_ordinal("alwaysShowList", ShowPlayerListMode::ModUiOnly);
}

pub struct GlobalSettings {
    store: ConfigStore,
    /// Debug toggles extra diagnostics; a plain field rather than a
    /// registered key so it is never persisted.
    pub debug: bool,
}

impl GlobalSettings {
    fn with_store(mut store: ConfigStore) -> Self {
        store.register(&keys::FIRST_TIME_LOAD);
        store.register(&keys::CLOUD_SYNC_ENABLED);
        store.register(&keys::AUTOMATIC_CLOUD_SYNC);
        store.register(&keys::CLOUD_SERVER);
        store.register(&keys::SYNC_LOG_VERBOSITY);
        store.register(&keys::ALWAYS_SHOW_LIST);
        Self {
            store,
            debug: false,
        }
    }

    /// Settings persisted at `<dir>/settings.json`, without touching disk.
    pub fn new(dir: &Path) -> Self {
        Self::with_store(ConfigStore::named(dir, "settings"))
    }

    /// Settings that never touch disk.
    pub fn ephemeral() -> Self {
        Self::with_store(ConfigStore::ephemeral())
    }

    /// Load the settings file, writing the defaults first when no file
    /// exists yet.
    pub fn load_or_init(dir: &Path) -> Self {
        let mut settings = Self::new(dir);
        if settings.store.exists() {
            settings.store.load();
        } else {
            settings.store.save();
        }
        settings
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    pub fn save(&self) {
        self.store.save();
    }

    pub fn first_time_load(&self) -> bool {
        self.store.get(&keys::FIRST_TIME_LOAD)
    }

    pub fn cloud_sync_enabled(&self) -> bool {
        self.store.get(&keys::CLOUD_SYNC_ENABLED)
    }

    pub fn set_cloud_sync_enabled(&mut self, enabled: bool) -> Result<(), Rejected> {
        self.store.set(&keys::CLOUD_SYNC_ENABLED, enabled)
    }

    pub fn automatic_cloud_sync(&self) -> bool {
        self.store.get(&keys::AUTOMATIC_CLOUD_SYNC)
    }

    pub fn set_automatic_cloud_sync(&mut self, enabled: bool) -> Result<(), Rejected> {
        self.store.set(&keys::AUTOMATIC_CLOUD_SYNC, enabled)
    }

    pub fn cloud_server(&self) -> String {
        self.store.get(&keys::CLOUD_SERVER)
    }

    pub fn sync_log_verbosity(&self) -> SyncVerbosity {
        self.store.get(&keys::SYNC_LOG_VERBOSITY)
    }

    pub fn always_show_list(&self) -> ShowPlayerListMode {
        self.store.get(&keys::ALWAYS_SHOW_LIST)
    }
}
