//! The reconciler — unified reads and queue drains.

use crate::merge::merge_view;
use fieldlog_remote::LedgerClient;
use fieldlog_store::RecordStore;
use fieldlog_types::{Record, RecordId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

/// Configuration for queue drains.
#[derive(Debug, Clone)]
pub struct DrainConfig {
    /// Pause between queue records. The endpoint handles one in-flight
    /// operation's worth of correlation bookkeeping at a time, so records
    /// are spaced out rather than pipelined.
    pub pause: Duration,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            pause: Duration::from_millis(500),
        }
    }
}

/// Why a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainStatus {
    /// The snapshot was processed to the end.
    Completed,
    /// The connectivity probe reported unreachable; nothing was attempted.
    Offline,
    /// The record store has not been opened; nothing was attempted.
    StoreNotReady,
    /// Another drain of the same module is still running; this one backed
    /// off without touching the queue.
    AlreadyRunning,
}

/// What happened to one queued record during a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The ledger acknowledged the record; it left the local queue.
    Acknowledged,
    /// The call failed (or the cleanup did); the record stays queued for a
    /// later drain.
    Retained,
}

/// Per-record accounting for one drain run.
#[derive(Debug, Clone)]
pub struct DrainReport {
    pub status: DrainStatus,
    pub outcomes: Vec<(RecordId, RecordOutcome)>,
}

impl DrainReport {
    fn skipped(status: DrainStatus) -> Self {
        Self {
            status,
            outcomes: Vec::new(),
        }
    }

    /// Records the ledger accepted during this run.
    #[must_use]
    pub fn acknowledged(&self) -> usize {
        self.count(RecordOutcome::Acknowledged)
    }

    /// Records left queued for a later drain.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.count(RecordOutcome::Retained)
    }

    fn count(&self, wanted: RecordOutcome) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == wanted)
            .count()
    }
}

/// Merges local and remote listings into one view, and drains the
/// pending-write queue when connectivity allows.
pub struct Reconciler {
    store: Arc<RecordStore>,
    remote: Arc<LedgerClient>,
    config: DrainConfig,
    draining: Mutex<HashSet<String>>,
}

impl Reconciler {
    /// Creates a reconciler with the default drain configuration.
    pub fn new(store: Arc<RecordStore>, remote: Arc<LedgerClient>) -> Self {
        Self::with_config(store, remote, DrainConfig::default())
    }

    /// Creates a reconciler with a custom drain configuration.
    pub fn with_config(
        store: Arc<RecordStore>,
        remote: Arc<LedgerClient>,
        config: DrainConfig,
    ) -> Self {
        Self {
            store,
            remote,
            config,
            draining: Mutex::new(HashSet::new()),
        }
    }

    /// The unified view of a module: both fetches issued concurrently,
    /// merged once both settle. Either side failing degrades the view to
    /// whatever the other returned; the read itself never fails.
    pub async fn merged_list(&self, module: &str) -> Vec<Record> {
        let local_task = {
            let store = self.store.clone();
            let module = module.to_string();
            spawn_blocking(move || store.list_all(&module))
        };
        let (local, remote) = tokio::join!(local_task, self.remote.list(module));

        let local = match local {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                warn!(module, error = %err, "local listing failed");
                Vec::new()
            }
            Err(err) => {
                warn!(module, error = %err, "local listing task panicked");
                Vec::new()
            }
        };
        let remote = match remote {
            Ok(records) => records
                .into_iter()
                .map(|record| record.into_record(module))
                .collect(),
            Err(err) => {
                debug!(module, error = %err, "remote listing unavailable, serving local records");
                Vec::new()
            }
        };

        merge_view(remote, local)
    }

    /// Replays the module's pending-write queue against the ledger.
    ///
    /// A silent no-op when offline or before the store is ready. Snapshots
    /// the queue once — records queued while the drain runs wait for the
    /// next invocation — and processes it strictly in sequence: each
    /// acknowledged record is removed from the store, each failure is left
    /// queued and the run continues with the next record.
    pub async fn drain(&self, module: &str) -> DrainReport {
        if !self.remote.is_reachable() {
            debug!(module, "drain skipped, endpoint unreachable");
            return DrainReport::skipped(DrainStatus::Offline);
        }
        if !self.store.is_ready() {
            debug!(module, "drain skipped, store not ready");
            return DrainReport::skipped(DrainStatus::StoreNotReady);
        }
        if !self.draining.lock().unwrap().insert(module.to_string()) {
            debug!(module, "drain already in flight");
            return DrainReport::skipped(DrainStatus::AlreadyRunning);
        }

        let report = self.drain_snapshot(module).await;
        self.draining.lock().unwrap().remove(module);
        report
    }

    async fn drain_snapshot(&self, module: &str) -> DrainReport {
        let snapshot = {
            let store = self.store.clone();
            let module = module.to_string();
            spawn_blocking(move || store.list_unsynced(&module)).await
        };
        let snapshot = match snapshot {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                warn!(module, error = %err, "queue snapshot failed");
                return DrainReport::skipped(DrainStatus::Completed);
            }
            Err(err) => {
                warn!(module, error = %err, "queue snapshot task panicked");
                return DrainReport::skipped(DrainStatus::Completed);
            }
        };

        if snapshot.is_empty() {
            debug!(module, "queue empty, nothing to drain");
            return DrainReport::skipped(DrainStatus::Completed);
        }

        info!(module, pending = snapshot.len(), "draining queue");
        let mut outcomes = Vec::with_capacity(snapshot.len());

        for (index, record) in snapshot.into_iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.pause).await;
            }
            let Some(id) = record.id else { continue };

            match self.remote.create(module, record.fields).await {
                Ok(_) => {
                    let removed = {
                        let store = self.store.clone();
                        let module = module.to_string();
                        spawn_blocking(move || store.remove(&module, id)).await
                    };
                    match removed {
                        Ok(Ok(())) => {
                            debug!(module, %id, "record synced and purged locally");
                            outcomes.push((id, RecordOutcome::Acknowledged));
                        }
                        Ok(Err(err)) => {
                            warn!(module, %id, error = %err, "synced record could not be purged, will resend");
                            outcomes.push((id, RecordOutcome::Retained));
                        }
                        Err(err) => {
                            warn!(module, %id, error = %err, "purge task panicked, will resend");
                            outcomes.push((id, RecordOutcome::Retained));
                        }
                    }
                }
                Err(err) => {
                    warn!(module, %id, error = %err, "record not accepted, kept in queue");
                    outcomes.push((id, RecordOutcome::Retained));
                }
            }
        }

        let report = DrainReport {
            status: DrainStatus::Completed,
            outcomes,
        };
        info!(
            module,
            acknowledged = report.acknowledged(),
            retained = report.retained(),
            "drain finished"
        );
        report
    }
}
