//! Cloud sync driver.
//!
//! Reconciles a player's local store against the cloud-held copy through a
//! [`CloudClient`] seam: locally changed state is pushed, otherwise the
//! remote document is fetched and applied. The driver owns the per-identity
//! minimum interval, the no-overlap guard, and the audit log; the concrete
//! transport lives outside this crate.
//!
//! A failed attempt leaves the store and sync status exactly as they were;
//! only the log gains an entry.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::{Document, GlobalSettings, SyncVerbosity};
use crate::entity::{PlayerConfig, PlayerRoster};
use crate::sync::error::SyncError;
use crate::sync::gate::RateGate;
use crate::sync::log::{COLOR_ERROR, COLOR_INFO, COLOR_OK, SyncLog, SyncLogEntry};

/// Remote endpoint seam. Implementations are expected to block for network
/// I/O; the driver is invoked off the per-tick path.
pub trait CloudClient: Send + Sync {
    /// The cloud-held document for an identity, or `None` when the cloud has
    /// nothing stored.
    fn fetch(&self, uuid: Uuid) -> Result<Option<Document>, SyncError>;

    /// Store a document as the cloud copy for an identity.
    fn push(&self, uuid: Uuid, doc: &Document) -> Result<(), SyncError>;
}

/// What a completed sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local changes were pushed to the cloud.
    Pushed,
    /// A remote document was applied locally.
    Applied,
    /// Nothing was pending locally and the cloud had nothing stored.
    NoRemoteData,
}

pub struct CloudSync {
    client: Arc<dyn CloudClient>,
    settings: Arc<Mutex<GlobalSettings>>,
    gate: Mutex<RateGate>,
    in_flight: Mutex<HashSet<Uuid>>,
    log: Mutex<SyncLog>,
    clock: Arc<dyn Clock>,
}

impl CloudSync {
    pub fn new(client: Arc<dyn CloudClient>, settings: Arc<Mutex<GlobalSettings>>) -> Self {
        Self::with_clock(client, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        client: Arc<dyn CloudClient>,
        settings: Arc<Mutex<GlobalSettings>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            settings,
            gate: Mutex::new(RateGate::default()),
            in_flight: Mutex::new(HashSet::new()),
            log: Mutex::new(SyncLog::new()),
            clock,
        }
    }

    /// Snapshot of the audit log, oldest first.
    pub fn log_entries(&self) -> Vec<SyncLogEntry> {
        self.log.lock().expect("sync log lock poisoned").entries()
    }

    /// Append a caller-supplied entry, e.g. from UI code reporting its own
    /// sync-adjacent events.
    pub fn log_message(&self, text: impl Into<String>, color: u32) {
        self.log
            .lock()
            .expect("sync log lock poisoned")
            .add(text, color);
    }

    /// Run one sync for `player`.
    ///
    /// Rejects up front when sync is disabled, another sync for the same
    /// identity is outstanding, or the rate gate refuses the attempt. The
    /// player lock is only held to snapshot and to apply results, never
    /// across the remote call; callers must not hold it while invoking this.
    pub fn sync(&self, player: &Mutex<PlayerConfig>) -> Result<SyncOutcome, SyncError> {
        let (enabled, verbosity) = {
            let settings = self.settings.lock().expect("settings lock poisoned");
            (settings.cloud_sync_enabled(), settings.sync_log_verbosity())
        };
        if !enabled {
            return Err(SyncError::Disabled);
        }

        let uuid = player.lock().expect("player lock poisoned").uuid();
        let _guard = InFlightGuard::acquire(&self.in_flight, uuid)?;

        if let Err(retry_in) = self
            .gate
            .lock()
            .expect("rate gate lock poisoned")
            .try_acquire(uuid, self.clock.now())
        {
            self.log_message(
                format!("sync refused: tried again within {}s", retry_in.as_secs() + 1),
                COLOR_ERROR,
            );
            return Err(SyncError::TooFrequent { retry_in });
        }

        if verbosity == SyncVerbosity::Verbose {
            self.log_message(format!("syncing {uuid}"), COLOR_INFO);
        }

        let result = self.run(player, uuid);
        match &result {
            Ok(outcome) => {
                if verbosity != SyncVerbosity::Silent {
                    let text = match outcome {
                        SyncOutcome::Pushed => "settings uploaded",
                        SyncOutcome::Applied => "settings updated from the cloud",
                        SyncOutcome::NoRemoteData => "nothing to sync",
                    };
                    self.log_message(text, COLOR_OK);
                }
            }
            Err(e) => {
                tracing::warn!("cloud sync for {uuid} failed: {e}");
                self.log_message(format!("sync failed: {e}"), COLOR_ERROR);
            }
        }
        result
    }

    fn run(&self, player: &Mutex<PlayerConfig>, uuid: Uuid) -> Result<SyncOutcome, SyncError> {
        let (needs_push, doc) = {
            let player = player.lock().expect("player lock poisoned");
            (player.needs_cloud_sync(), player.to_document())
        };
        if needs_push {
            self.client.push(uuid, &doc)?;
            player
                .lock()
                .expect("player lock poisoned")
                .acknowledge_cloud_push();
            return Ok(SyncOutcome::Pushed);
        }
        match self.client.fetch(uuid)? {
            Some(remote) => {
                player
                    .lock()
                    .expect("player lock poisoned")
                    .apply_remote_document(&remote);
                Ok(SyncOutcome::Applied)
            }
            None => Ok(SyncOutcome::NoRemoteData),
        }
    }
}

/// Scoped membership in the in-flight set; removal happens on every exit
/// path, including panics in the remote client.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Uuid>>,
    uuid: Uuid,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<Uuid>>, uuid: Uuid) -> Result<Self, SyncError> {
        let mut in_flight = set.lock().expect("in-flight set lock poisoned");
        if !in_flight.insert(uuid) {
            return Err(SyncError::InFlight { uuid });
        }
        Ok(Self { set, uuid })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("in-flight set lock poisoned")
            .remove(&self.uuid);
    }
}

/// Background sync worker.
///
/// Requests queue over a channel and run on one dedicated thread, keeping
/// remote I/O off the per-tick path and serializing syncs globally. Repeat
/// requests for an identity coalesce until the worker picks the first one
/// up. The thread exits when the worker is dropped.
pub struct SyncWorker {
    tx: crossbeam::channel::Sender<Uuid>,
    pending: Arc<Mutex<HashSet<Uuid>>>,
}

impl SyncWorker {
    pub fn spawn(sync: Arc<CloudSync>, roster: Arc<PlayerRoster>) -> Self {
        let (tx, rx) = crossbeam::channel::unbounded::<Uuid>();
        let pending = Arc::new(Mutex::new(HashSet::new()));
        let worker_pending = Arc::clone(&pending);
        std::thread::spawn(move || {
            for uuid in rx {
                worker_pending
                    .lock()
                    .expect("pending set lock poisoned")
                    .remove(&uuid);
                let Some(player) = roster.get(uuid) else {
                    continue;
                };
                if let Err(e) = sync.sync(&player) {
                    tracing::debug!("queued cloud sync for {uuid} did not run: {e}");
                }
            }
        });
        Self { tx, pending }
    }

    /// Queue a sync for an identity. Returns `false` when a request for the
    /// same identity is already waiting (the new one coalesces into it).
    pub fn enqueue(&self, uuid: Uuid) -> bool {
        let mut pending = self.pending.lock().expect("pending set lock poisoned");
        if !pending.insert(uuid) {
            return false;
        }
        drop(pending);
        self.tx.send(uuid).is_ok()
    }
}
