//! Durable, cloud-sync-participating player configuration.
//!
//! Composition rather than inheritance: a [`PlayerConfig`] is an
//! [`EntityConfig`] whose store persists to disk, plus a [`SyncState`]
//! capability recording where the held values came from and who still needs
//! to hear about local changes.

use std::path::Path;

use uuid::Uuid;

use crate::config::character::{self, keys};
use crate::config::{Document, Gender, Pronoun, Rejected};
use crate::entity::breasts::Breasts;
use crate::entity::config::EntityConfig;

/// Provenance of the currently held values relative to disk and cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Nothing loaded yet.
    #[default]
    Unknown,
    /// Values came from the local file.
    Cached,
    /// Values came from a remote document.
    Synced,
}

/// Durable-sync capability attached to player-backed configs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncState {
    pub(crate) needs_local_propagation: bool,
    pub(crate) needs_cloud_sync: bool,
    pub(crate) status: SyncStatus,
}

pub struct PlayerConfig {
    entity: EntityConfig,
    sync: SyncState,
}

impl PlayerConfig {
    /// Player config persisted at `<config_dir>/players/<uuid>.json`.
    pub fn new(uuid: Uuid, config_dir: &Path) -> Self {
        let store = character::persistent(&config_dir.join("players"), &uuid.to_string());
        Self {
            entity: EntityConfig::with_store(uuid, store),
            sync: SyncState::default(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.entity.uuid()
    }

    pub fn entity(&self) -> &EntityConfig {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut EntityConfig {
        &mut self.entity
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status
    }

    /// Peers have not yet been told about the latest local change.
    pub fn needs_local_propagation(&self) -> bool {
        self.sync.needs_local_propagation
    }

    /// The cloud copy is stale relative to local state.
    pub fn needs_cloud_sync(&self) -> bool {
        self.sync.needs_cloud_sync
    }

    /// Called by whatever told the peers.
    pub fn acknowledge_local_propagation(&mut self) {
        self.sync.needs_local_propagation = false;
    }

    /// Called by the cloud driver once a push is confirmed. A pull never
    /// clears the flag: applying remote data says nothing about whether the
    /// cloud has ours.
    pub fn acknowledge_cloud_push(&mut self) {
        self.sync.needs_cloud_sync = false;
    }

    /// Whether a local file exists for this player.
    pub fn has_local_config(&self) -> bool {
        self.entity.store().exists()
    }

    /// Load the local file if one exists; no-op otherwise.
    ///
    /// A successful load marks the values as disk-cached, and optionally
    /// flags them for propagation to peers.
    pub fn load_from_disk(&mut self, mark_for_propagation: bool) {
        if !self.has_local_config() {
            return;
        }
        self.entity.store_mut().load();
        self.sync.status = SyncStatus::Cached;
        if mark_for_propagation {
            self.sync.needs_local_propagation = true;
        }
    }

    /// Persist to disk. A local change always leaves both peers and the
    /// cloud stale relative to it, so both flags are raised unconditionally.
    pub fn save(&mut self) {
        self.entity.store().save();
        self.sync.needs_local_propagation = true;
        self.sync.needs_cloud_sync = true;
    }

    /// Apply a cloud-provided document and mark the values as remote.
    /// Deliberately does not touch `needs_cloud_sync`.
    pub fn apply_remote_document(&mut self, doc: &Document) {
        self.entity.store_mut().apply(doc);
        self.sync.status = SyncStatus::Synced;
    }

    /// Snapshot for transmission to the cloud endpoint.
    pub fn to_document(&self) -> Document {
        self.entity.store().to_document()
    }

    pub fn gender(&self) -> Gender {
        self.entity.gender()
    }

    pub fn set_gender(&mut self, value: Gender) -> Result<(), Rejected> {
        self.entity.store_mut().set(&keys::GENDER, value)
    }

    pub fn bust_size(&self) -> f32 {
        self.entity.bust_size()
    }

    pub fn set_bust_size(&mut self, value: f32) -> Result<(), Rejected> {
        self.entity.store_mut().set(&keys::BUST_SIZE, value)
    }

    pub fn breasts(&self) -> Breasts {
        self.entity.breasts()
    }

    pub fn hurt_sounds(&self) -> bool {
        self.entity.store().get(&keys::HURT_SOUNDS)
    }

    pub fn set_hurt_sounds(&mut self, value: bool) -> Result<(), Rejected> {
        self.entity.store_mut().set(&keys::HURT_SOUNDS, value)
    }

    pub fn pronouns(&self) -> Vec<Pronoun> {
        self.entity.store().get(&keys::PRONOUNS)
    }

    pub fn add_pronoun(&mut self, pronoun: Pronoun) -> Result<(), Rejected> {
        self.entity.store_mut().push(&keys::PRONOUNS, pronoun)
    }

    pub fn has_breast_physics(&self) -> bool {
        self.entity.has_breast_physics()
    }

    pub fn set_breast_physics(&mut self, value: bool) -> Result<(), Rejected> {
        self.entity.store_mut().set(&keys::BREAST_PHYSICS, value)
    }

    /// Unlike non-player entities, players read their registered key.
    pub fn armor_physics_override(&self) -> bool {
        self.entity.store().get(&keys::ARMOR_PHYSICS_OVERRIDE)
    }

    pub fn set_armor_physics_override(&mut self, value: bool) -> Result<(), Rejected> {
        self.entity
            .store_mut()
            .set(&keys::ARMOR_PHYSICS_OVERRIDE, value)
    }

    /// Unlike non-player entities, players read their registered key.
    pub fn show_in_armor(&self) -> bool {
        self.entity.store().get(&keys::SHOW_IN_ARMOR)
    }

    pub fn set_show_in_armor(&mut self, value: bool) -> Result<(), Rejected> {
        self.entity.store_mut().set(&keys::SHOW_IN_ARMOR, value)
    }

    pub fn set_bounce_multiplier(&mut self, value: f32) -> Result<(), Rejected> {
        self.entity.store_mut().set(&keys::BOUNCE_MULTIPLIER, value)
    }

    pub fn set_floppiness(&mut self, value: f32) -> Result<(), Rejected> {
        self.entity
            .store_mut()
            .set(&keys::FLOPPY_MULTIPLIER, value)
    }

    pub fn voice_pitch(&self) -> f32 {
        self.entity.voice_pitch()
    }

    pub fn set_voice_pitch(&mut self, value: f32) -> Result<(), Rejected> {
        self.entity.store_mut().set(&keys::VOICE_PITCH, value)
    }
}
