//! Per-identity runtime configuration.
//!
//! An [`EntityConfig`] bundles a (transient, never persisted) appearance
//! store with the pair of physics simulators and the decoded-snapshot cache.
//! Durable players wrap one of these in
//! [`PlayerConfig`](crate::entity::player::PlayerConfig).

use uuid::Uuid;

use crate::config::character::{self, keys};
use crate::config::{ConfigStore, Gender};
use crate::entity::breasts::Breasts;
use crate::entity::snapshot::BreastSnapshot;
use crate::physics::BreastPhysics;

/// Decoded bust sizes at or above this imply the has-breasts gender state
/// when reading item snapshots. A heuristic carried over from the snapshot
/// wire format, which stores no explicit gender.
pub const BREAST_SIZE_THRESHOLD: f32 = 0.02;

pub struct EntityConfig {
    uuid: Uuid,
    store: ConfigStore,
    left_physics: BreastPhysics,
    right_physics: BreastPhysics,
    jacket_layer: bool,
    /// Raw bytes of the last snapshot applied, kept so repeated per-frame
    /// calls with unchanged item data skip the decode entirely.
    snapshot_token: Option<Vec<u8>>,
}

impl EntityConfig {
    /// Transient config for a non-player entity.
    pub fn new(uuid: Uuid) -> Self {
        Self::with_store(uuid, character::ephemeral())
    }

    pub(crate) fn with_store(uuid: Uuid, store: ConfigStore) -> Self {
        Self {
            uuid,
            store,
            left_physics: BreastPhysics::new(),
            right_physics: BreastPhysics::new(),
            jacket_layer: true,
            snapshot_token: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    pub fn gender(&self) -> Gender {
        self.store.get(&keys::GENDER)
    }

    pub fn bust_size(&self) -> f32 {
        self.store.get(&keys::BUST_SIZE)
    }

    pub fn breasts(&self) -> Breasts {
        Breasts::from_store(&self.store)
    }

    pub fn has_breast_physics(&self) -> bool {
        self.store.get(&keys::BREAST_PHYSICS)
    }

    /// Fixed for non-player entities; players read their key instead.
    pub fn armor_physics_override(&self) -> bool {
        false
    }

    /// Fixed for non-player entities; players read their key instead.
    pub fn show_in_armor(&self) -> bool {
        true
    }

    pub fn bounce_multiplier(&self) -> f32 {
        self.store.get(&keys::BOUNCE_MULTIPLIER)
    }

    pub fn floppiness(&self) -> f32 {
        self.store.get(&keys::FLOPPY_MULTIPLIER)
    }

    pub fn voice_pitch(&self) -> f32 {
        self.store.get(&keys::VOICE_PITCH)
    }

    /// Whether the entity wearing this config shows its jacket layer. Only
    /// meaningful for snapshot-driven entities such as armor stands.
    pub fn jacket_layer(&self) -> bool {
        self.jacket_layer
    }

    /// Copy appearance settings from externally supplied item bytes onto
    /// this entity.
    ///
    /// Byte-identical input to the last applied snapshot is a no-op. Absent
    /// or empty input resets to the no-breasts state and disables physics.
    pub fn read_from_snapshot(&mut self, bytes: Option<&[u8]>) {
        let Some(bytes) = bytes.filter(|b| !b.is_empty()) else {
            self.snapshot_token = None;
            let _ = self.store.set(&keys::GENDER, Gender::Male);
            let _ = self.store.set(&keys::BREAST_PHYSICS, false);
            self.left_physics.reset();
            self.right_physics.reset();
            return;
        };
        if self.snapshot_token.as_deref() == Some(bytes) {
            // Nothing changed since we last looked at this item; skip the
            // decode.
            return;
        }
        let Some(snapshot) = BreastSnapshot::decode(bytes) else {
            self.snapshot_token = None;
            let _ = self.store.set(&keys::GENDER, Gender::Male);
            return;
        };
        self.snapshot_token = Some(bytes.to_vec());
        let _ = self.store.set(&keys::BREAST_PHYSICS, false);
        let _ = self.store.set(&keys::BUST_SIZE, snapshot.breast_size);
        let gender = if snapshot.breast_size >= BREAST_SIZE_THRESHOLD {
            Gender::Female
        } else {
            Gender::Male
        };
        let _ = self.store.set(&keys::GENDER, gender);
        let _ = self
            .store
            .set(&keys::BREASTS_CLEAVAGE, snapshot.cleavage);
        Breasts::update_offsets(&mut self.store, snapshot.offsets);
        self.jacket_layer = snapshot.jacket;
    }

    /// Advance both simulators one tick toward the entity's current motion
    /// target. Call once per render/update tick.
    pub fn tick_physics(&mut self, motion: f32) {
        if !self.has_breast_physics() {
            self.left_physics.reset();
            self.right_physics.reset();
            return;
        }
        let bounce = self.bounce_multiplier();
        let floppiness = self.floppiness();
        self.left_physics.update(motion, bounce, floppiness);
        self.right_physics.update(motion, bounce, floppiness);
    }

    pub fn left_physics(&self) -> &BreastPhysics {
        &self.left_physics
    }

    pub fn right_physics(&self) -> &BreastPhysics {
        &self.right_physics
    }
}
