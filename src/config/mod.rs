//! Typed config keys, file-backed stores, and the global settings context.

pub mod character;
mod enums;
mod key;
mod settings;
mod store;

pub use enums::{Gender, Pronoun, ShowPlayerListMode, SyncVerbosity};
pub use key::{
    BoolKey, ConfigEnum, ConfigKey, EnumFormat, EnumKey, FloatKey, ListKey, Rejected, StringKey,
};
pub use settings::GlobalSettings;
pub use store::{ConfigStore, Document};
