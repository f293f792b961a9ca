//! Breast appearance value record.

use serde::{Deserialize, Serialize};

use crate::config::character::keys;
use crate::config::ConfigStore;

/// Snapshot of an entity's breast appearance settings, detached from any
/// store so it can travel in peer-propagation payloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breasts {
    pub offset: [f32; 3],
    pub uniboob: bool,
    pub cleavage: f32,
}

impl Breasts {
    pub fn from_store(store: &ConfigStore) -> Self {
        Self {
            offset: [
                store.get(&keys::BREASTS_X_OFFSET),
                store.get(&keys::BREASTS_Y_OFFSET),
                store.get(&keys::BREASTS_Z_OFFSET),
            ],
            uniboob: store.get(&keys::BREASTS_UNIBOOB),
            cleavage: store.get(&keys::BREASTS_CLEAVAGE),
        }
    }

    /// Copy the offset triple onto a store. Out-of-bound axes are rejected
    /// per key and leave that axis unchanged.
    pub fn update_offsets(store: &mut ConfigStore, offset: [f32; 3]) {
        let _ = store.set(&keys::BREASTS_X_OFFSET, offset[0]);
        let _ = store.set(&keys::BREASTS_Y_OFFSET, offset[1]);
        let _ = store.set(&keys::BREASTS_Z_OFFSET, offset[2]);
    }

    /// Copy every field of this record onto a store.
    pub fn apply_to(&self, store: &mut ConfigStore) {
        Self::update_offsets(store, self.offset);
        let _ = store.set(&keys::BREASTS_CLEAVAGE, self.cleavage);
        let _ = store.set(&keys::BREASTS_UNIBOOB, self.uniboob);
    }
}
