//! Per-identity runtime state: entity and player configs, their caches, and
//! the item-snapshot codec.

mod breasts;
mod cache;
mod config;
mod player;
mod snapshot;

pub use breasts::Breasts;
pub use cache::{EntityCache, IDLE_EXPIRY, PlayerRoster};
pub use config::{BREAST_SIZE_THRESHOLD, EntityConfig};
pub use player::{PlayerConfig, SyncState, SyncStatus};
pub use snapshot::{BreastSnapshot, RESERVED_KEY};
