//! The per-entity appearance key set.
//!
//! Key names, defaults, and bounds are wire format shared with existing
//! on-disk documents; changing any of them breaks loading.

use std::path::Path;

use super::enums::{Gender, Pronoun};
use super::key::{BoolKey, EnumKey, FloatKey, ListKey};
use super::store::ConfigStore;

pub mod keys {
    use super::*;

    pub const GENDER: EnumKey<Gender> = EnumKey::by_ordinal("gender", Gender::Male);
    pub const BUST_SIZE: FloatKey = FloatKey::bounded("bust_size", 0.6, 0.0, 0.8);
    pub const HURT_SOUNDS: BoolKey = BoolKey::new("hurt_sounds", true);
    pub const PRONOUNS: ListKey<EnumKey<Pronoun>> =
        ListKey::bounded("pronouns", 6, EnumKey::by_name("pronoun", Pronoun::They));

    pub const BREASTS_X_OFFSET: FloatKey = FloatKey::bounded("breasts_xOffset", 0.0, -1.0, 1.0);
    pub const BREASTS_Y_OFFSET: FloatKey = FloatKey::bounded("breasts_yOffset", 0.0, -1.0, 1.0);
    pub const BREASTS_Z_OFFSET: FloatKey = FloatKey::bounded("breasts_zOffset", 0.0, -1.0, 0.0);
    pub const BREASTS_UNIBOOB: BoolKey = BoolKey::new("breasts_uniboob", true);
    pub const BREASTS_CLEAVAGE: FloatKey = FloatKey::bounded("breasts_cleavage", 0.0, 0.0, 0.1);

    pub const BREAST_PHYSICS: BoolKey = BoolKey::new("breast_physics", true);
    pub const ARMOR_PHYSICS_OVERRIDE: BoolKey = BoolKey::new("armor_physics_override", false);
    pub const SHOW_IN_ARMOR: BoolKey = BoolKey::new("show_in_armor", true);
    pub const BOUNCE_MULTIPLIER: FloatKey = FloatKey::bounded("bounce_multiplier", 0.333, 0.0, 0.5);
    pub const FLOPPY_MULTIPLIER: FloatKey = FloatKey::bounded("floppy_multiplier", 0.75, 0.25, 1.0);

    pub const VOICE_PITCH: FloatKey = FloatKey::bounded("voice_pitch", 1.0, 0.8, 1.2);
}

fn register_all(store: &mut ConfigStore) {
    store.register(&keys::GENDER);
    store.register(&keys::BUST_SIZE);
    store.register(&keys::HURT_SOUNDS);
    store.register(&keys::PRONOUNS);
    store.register(&keys::BREASTS_X_OFFSET);
    store.register(&keys::BREASTS_Y_OFFSET);
    store.register(&keys::BREASTS_Z_OFFSET);
    store.register(&keys::BREASTS_UNIBOOB);
    store.register(&keys::BREASTS_CLEAVAGE);
    store.register(&keys::BREAST_PHYSICS);
    store.register(&keys::ARMOR_PHYSICS_OVERRIDE);
    store.register(&keys::SHOW_IN_ARMOR);
    store.register(&keys::BOUNCE_MULTIPLIER);
    store.register(&keys::FLOPPY_MULTIPLIER);
    store.register(&keys::VOICE_PITCH);
}

/// Appearance store persisted at `<dir>/<name>.json`.
pub fn persistent(dir: &Path, name: &str) -> ConfigStore {
    let mut store = ConfigStore::named(dir, name);
    register_all(&mut store);
    store
}

/// Appearance store with persistence disallowed, for transient entities.
pub fn ephemeral() -> ConfigStore {
    let mut store = ConfigStore::ephemeral();
    register_all(&mut store);
    store
}

/// A frozen store holding every appearance key at its default. Any `set`
/// against it fails with an immutability rejection.
pub fn defaults() -> ConfigStore {
    let mut store = ephemeral();
    store.freeze();
    store
}
