//! Per-identity minimum-interval rate gate.
//!
//! The remote service tolerates far fewer syncs than callers attempt, so the
//! gate refuses an identity's attempt until the interval since its previous
//! attempt has elapsed. Time is passed in by the caller, mirroring the
//! injected-clock discipline used by the cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Minimum wait between sync attempts for one identity.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_attempt: HashMap<Uuid, Instant>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_attempt: HashMap::new(),
        }
    }

    /// Record an attempt for `id` at `now`, or reject with the remaining
    /// wait when the previous attempt was too recent. A rejection does not
    /// count as an attempt.
    pub fn try_acquire(&mut self, id: Uuid, now: Instant) -> Result<(), Duration> {
        if let Some(&last) = self.last_attempt.get(&id) {
            let elapsed = now.duration_since(last);
            if elapsed < self.min_interval {
                return Err(self.min_interval - elapsed);
            }
        }
        self.last_attempt.insert(id, now);
        Ok(())
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(MIN_SYNC_INTERVAL)
    }
}
