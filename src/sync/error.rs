//! Cloud sync error types.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Why a sync attempt did not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    /// Cloud sync is turned off in the global settings.
    #[error("cloud sync is disabled")]
    Disabled,

    /// The rate gate refused this identity. Distinguished so UI can show
    /// "try again later" instead of a generic failure.
    #[error("synced too recently; retry in {}s", retry_in.as_secs())]
    TooFrequent { retry_in: Duration },

    /// Another sync for the same identity is still outstanding.
    #[error("a sync for {uuid} is already in flight")]
    InFlight { uuid: Uuid },

    /// The remote call itself failed.
    #[error("cloud request failed: {reason}")]
    Transport { reason: String },
}

impl SyncError {
    /// Whether retrying later may succeed without a settings change.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SyncError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability() {
        assert!(!SyncError::Disabled.is_retryable());
        assert!(
            SyncError::TooFrequent {
                retry_in: Duration::from_secs(9)
            }
            .is_retryable()
        );
        assert!(
            SyncError::Transport {
                reason: "timeout".into()
            }
            .is_retryable()
        );
    }
}
