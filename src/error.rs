use thiserror::Error;

use crate::config::Rejected;
use crate::sync::SyncError;

/// Crate-level convenience error.
///
/// A thin wrapper over the module error types; APIs return the specific type
/// and callers that want one bucket convert into this.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Rejected(#[from] Rejected),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl Error {
    /// Whether retrying the operation may succeed without changing inputs.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Rejected(_) => false,
            Error::Sync(e) => e.is_retryable(),
        }
    }
}
