//! File-backed configuration store.
//!
//! A store is a keyed collection of typed slots bound to at most one backing
//! file. Fields found on disk that no registered key claims are kept verbatim
//! in an unrecognized bag and written back on save, so round-tripping a
//! document from an older or newer build never drops data.
//!
//! I/O and parse failures are logged here and never unwind past the store
//! boundary: a failed load changes nothing, a failed save leaves the previous
//! file intact.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::key::{ConfigKey, ListKey, Rejected};

/// Flat JSON object holding a store's serialized state.
pub type Document = Map<String, Value>;

/// Type-erased view of a registered key, kept so [`ConfigStore::apply`] can
/// re-validate document fields without knowing their concrete types.
trait Codec: Send + Sync {
    /// Decode a document field and re-encode the accepted value, or `None`
    /// when validation rejects it.
    fn absorb(&self, raw: &Value) -> Option<Value>;
}

impl<K: ConfigKey + Send + Sync> Codec for K {
    fn absorb(&self, raw: &Value) -> Option<Value> {
        let value = self.read(raw);
        self.check(&value).ok()?;
        Some(self.write(&value))
    }
}

struct Slot {
    raw: Value,
    immutable: bool,
    codec: Box<dyn Codec>,
}

pub struct ConfigStore {
    path: Option<PathBuf>,
    slots: BTreeMap<String, Slot>,
    unrecognized: BTreeMap<String, Value>,
}

impl ConfigStore {
    /// A store persisted at `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            slots: BTreeMap::new(),
            unrecognized: BTreeMap::new(),
        }
    }

    /// A store persisted at `<dir>/<name>.json`.
    pub fn named(dir: &Path, name: &str) -> Self {
        Self::at_path(dir.join(format!("{name}.json")))
    }

    /// A store with persistence disallowed: transient entity state, frozen
    /// defaults, pure-server execution contexts.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            slots: BTreeMap::new(),
            unrecognized: BTreeMap::new(),
        }
    }

    pub fn allows_persistence(&self) -> bool {
        self.path.is_some()
    }

    /// Register a key, seeding its slot with the default value.
    ///
    /// Panics if a key with the same name is already registered; duplicate
    /// registration is a programming error, not a runtime condition.
    pub fn register<K>(&mut self, key: &K)
    where
        K: ConfigKey + Clone + Send + Sync + 'static,
    {
        let name = key.name();
        if self.slots.contains_key(name) {
            panic!("configuration key `{name}` is already registered");
        }
        self.slots.insert(
            name.to_string(),
            Slot {
                raw: key.write(&key.default_value()),
                immutable: false,
                codec: Box::new(key.clone()),
            },
        );
    }

    fn slot(&self, name: &str) -> &Slot {
        self.slots
            .get(name)
            .unwrap_or_else(|| panic!("configuration key `{name}` is not registered"))
    }

    fn slot_mut(&mut self, name: &str) -> &mut Slot {
        self.slots
            .get_mut(name)
            .unwrap_or_else(|| panic!("configuration key `{name}` is not registered"))
    }

    /// Current value of a registered key.
    pub fn get<K: ConfigKey>(&self, key: &K) -> K::Value {
        key.read(&self.slot(key.name()).raw)
    }

    /// Set a registered key. A rejected value leaves the slot unchanged.
    pub fn set<K: ConfigKey>(&mut self, key: &K, value: K::Value) -> Result<(), Rejected> {
        let name = key.name();
        let slot = self.slot_mut(name);
        if slot.immutable {
            return Err(Rejected::Immutable { key: name.into() });
        }
        key.check(&value)?;
        slot.raw = key.write(&value);
        Ok(())
    }

    /// Map the current value through `f`, returning the value now stored.
    /// The result equals the old value when the mapper produced a rejected
    /// one.
    pub fn update<K: ConfigKey>(
        &mut self,
        key: &K,
        f: impl FnOnce(K::Value) -> K::Value,
    ) -> K::Value {
        let next = f(self.get(key));
        let _ = self.set(key, next);
        self.get(key)
    }

    /// Append to a bounded list key. Fails once the list is at capacity,
    /// leaving the stored list unchanged.
    pub fn push<K>(&mut self, key: &ListKey<K>, item: K::Value) -> Result<(), Rejected>
    where
        K: ConfigKey,
    {
        let mut items = self.get(key);
        if items.len() >= key.cap() {
            return Err(Rejected::CapacityExceeded {
                key: key.name().into(),
                cap: key.cap(),
            });
        }
        items.push(item);
        self.set(key, items)
    }

    /// Freeze one key. Idempotent and one-directional.
    pub fn make_immutable(&mut self, name: &str) {
        self.slot_mut(name).immutable = true;
    }

    /// Freeze every registered key.
    pub fn freeze(&mut self) {
        for slot in self.slots.values_mut() {
            slot.immutable = true;
        }
    }

    /// Registered key names, in stable order.
    pub fn key_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Fields loaded from disk that no registered key claims.
    pub fn unrecognized(&self) -> &BTreeMap<String, Value> {
        &self.unrecognized
    }

    /// Whether the backing file is present on disk.
    pub fn exists(&self) -> bool {
        self.path.as_deref().is_some_and(Path::exists)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply claimed fields from a document to the registered keys.
    ///
    /// Fields no key claims are ignored here; the unrecognized bag is only
    /// rebuilt by [`load`](Self::load). Rejected and immutable slots keep
    /// their current values.
    pub fn apply(&mut self, doc: &Document) {
        for (name, slot) in self.slots.iter_mut() {
            if slot.immutable {
                continue;
            }
            if let Some(raw) = doc.get(name)
                && let Some(accepted) = slot.codec.absorb(raw)
            {
                slot.raw = accepted;
            }
        }
    }

    /// Load the backing file, if present and persistence is allowed.
    ///
    /// A file that fails to read or parse is reported and treated as
    /// "nothing changed": slots and the unrecognized bag keep their current
    /// contents.
    pub fn load(&mut self) {
        let Some(path) = self.path.clone() else {
            return;
        };
        if !path.exists() {
            return;
        }
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::error!("failed to read config file {}: {e}", path.display());
                return;
            }
        };
        let doc: Document = match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("failed to parse config file {}: {e}", path.display());
                return;
            }
        };
        self.unrecognized.clear();
        for (name, raw) in &doc {
            if !self.slots.contains_key(name) {
                self.unrecognized.insert(name.clone(), raw.clone());
            }
        }
        self.apply(&doc);
    }

    /// Save to the backing file, if persistence is allowed.
    ///
    /// The parent directory is created as needed and the document is written
    /// to a temp file then renamed into place, so a concurrent reader never
    /// observes a half-written file. Failures are logged and swallowed.
    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(dir) = path.parent()
            && let Err(e) = fs::create_dir_all(dir)
        {
            tracing::error!("failed to create config dir {}: {e}", dir.display());
            return;
        }
        let mut doc = self.to_document();
        for (name, raw) in &self.unrecognized {
            doc.insert(name.clone(), raw.clone());
        }
        let contents = match serde_json::to_string_pretty(&doc) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::error!("failed to render config file {}: {e}", path.display());
                return;
            }
        };
        if let Err(e) = atomic_write(path, contents.as_bytes()) {
            tracing::error!("failed to save config file {}: {e}", path.display());
        }
    }

    /// Pure snapshot of every registered key's current value, for
    /// transmission independent of the on-disk file.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (name, slot) in &self.slots {
            doc.insert(name.clone(), slot.raw.clone());
        }
        doc
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other("config path missing parent directory"))?;
    let temp = tempfile::NamedTempFile::new_in(dir)?;
    fs::write(temp.path(), data)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::key::{BoolKey, FloatKey, StringKey};

    const SIZE: FloatKey = FloatKey::bounded("bust_size", 0.6, 0.0, 0.8);
    const FLAG: BoolKey = BoolKey::new("flag", true);
    const LABEL: StringKey = StringKey::new("label", "none");

    fn store_at(dir: &Path) -> ConfigStore {
        let mut store = ConfigStore::named(dir, "test");
        store.register(&SIZE);
        store.register(&FLAG);
        store.register(&LABEL);
        store
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_registration_panics() {
        let mut store = ConfigStore::ephemeral();
        store.register(&SIZE);
        store.register(&SIZE);
    }

    #[test]
    fn get_returns_default_until_set() {
        let mut store = ConfigStore::ephemeral();
        store.register(&SIZE);
        assert_eq!(store.get(&SIZE), 0.6);
        store.set(&SIZE, 0.75).unwrap();
        assert_eq!(store.get(&SIZE), 0.75);
    }

    #[test]
    fn out_of_bound_set_keeps_current_value() {
        let mut store = ConfigStore::ephemeral();
        store.register(&SIZE);
        assert_eq!(
            store.set(&SIZE, 1.5),
            Err(Rejected::InvalidValue {
                key: "bust_size".into()
            })
        );
        assert_eq!(store.get(&SIZE), 0.6);
    }

    #[test]
    fn immutable_key_rejects_every_set() {
        let mut store = ConfigStore::ephemeral();
        store.register(&SIZE);
        store.set(&SIZE, 0.5).unwrap();
        store.make_immutable("bust_size");
        assert_eq!(
            store.set(&SIZE, 0.5),
            Err(Rejected::Immutable {
                key: "bust_size".into()
            })
        );
        assert_eq!(
            store.set(&SIZE, 0.7),
            Err(Rejected::Immutable {
                key: "bust_size".into()
            })
        );
        assert_eq!(store.get(&SIZE), 0.5);
    }

    #[test]
    fn update_returns_stored_value_after_rejection() {
        let mut store = ConfigStore::ephemeral();
        store.register(&SIZE);
        assert_eq!(store.update(&SIZE, |v| v + 10.0), 0.6);
        assert_eq!(store.update(&SIZE, |v| v + 0.1), 0.7);
    }

    #[test]
    fn ephemeral_store_skips_disk() {
        let mut store = ConfigStore::ephemeral();
        store.register(&SIZE);
        assert!(!store.allows_persistence());
        assert!(!store.exists());
        store.save();
        store.load();
        assert_eq!(store.get(&SIZE), 0.6);
    }

    #[test]
    fn save_load_round_trips_registered_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_at(dir.path());
        store.set(&SIZE, 0.75).unwrap();
        store.set(&FLAG, false).unwrap();
        store.set(&LABEL, "woven".into()).unwrap();
        store.save();
        assert!(store.exists());

        let mut fresh = store_at(dir.path());
        fresh.load();
        assert_eq!(fresh.get(&SIZE), 0.75);
        assert!(!fresh.get(&FLAG));
        assert_eq!(fresh.get(&LABEL), "woven");
    }

    #[test]
    fn unrecognized_fields_survive_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.json");
        fs::write(
            &path,
            r#"{"bust_size": 0.3, "from_the_future": {"nested": [1, 2]}}"#,
        )
        .expect("seed config");

        let mut store = store_at(dir.path());
        store.load();
        assert_eq!(store.get(&SIZE), 0.3);
        assert_eq!(store.unrecognized().len(), 1);
        store.save();

        let reread: Document =
            serde_json::from_str(&fs::read_to_string(&path).expect("reread")).expect("parse");
        assert_eq!(
            reread.get("from_the_future"),
            Some(&serde_json::json!({"nested": [1, 2]}))
        );
        assert!(reread.contains_key("flag"));
    }

    #[test]
    fn malformed_file_changes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.json");
        fs::write(&path, "{not json").expect("seed config");

        let mut store = store_at(dir.path());
        store.set(&SIZE, 0.42).unwrap();
        store.load();
        assert_eq!(store.get(&SIZE), 0.42);
        assert!(store.unrecognized().is_empty());
    }

    #[test]
    fn out_of_bound_disk_value_keeps_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("test.json"), r#"{"bust_size": 7.5}"#).expect("seed config");

        let mut store = store_at(dir.path());
        store.load();
        assert_eq!(store.get(&SIZE), 0.6);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = ConfigStore::named(&dir.path().join("deep/nested"), "test");
        store.register(&SIZE);
        store.save();
        assert!(store.exists());
    }

    #[test]
    fn to_document_contains_every_registered_key() {
        let mut store = ConfigStore::ephemeral();
        store.register(&SIZE);
        store.register(&FLAG);
        let doc = store.to_document();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("bust_size"), Some(&Value::from(0.6f32)));
        assert_eq!(doc.get("flag"), Some(&Value::Bool(true)));
    }

    #[test]
    fn apply_ignores_unclaimed_fields() {
        let mut store = ConfigStore::ephemeral();
        store.register(&SIZE);
        let mut doc = Document::new();
        doc.insert("bust_size".into(), Value::from(0.2));
        doc.insert("mystery".into(), Value::from(9));
        store.apply(&doc);
        assert_eq!(store.get(&SIZE), 0.2);
        assert!(store.unrecognized().is_empty());
    }
}
