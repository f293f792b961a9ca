//! Cloud synchronization: audit log, rate gate, and the sync driver.

mod cloud;
mod error;
mod gate;
mod log;

pub use cloud::{CloudClient, CloudSync, SyncOutcome, SyncWorker};
pub use error::SyncError;
pub use gate::{MIN_SYNC_INTERVAL, RateGate};
pub use log::{COLOR_ERROR, COLOR_INFO, COLOR_OK, SYNC_LOG_CAPACITY, SyncLog, SyncLogEntry};
