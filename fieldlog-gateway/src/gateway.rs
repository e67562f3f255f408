//! The per-module facade.

use crate::schema::{ModuleSchema, ValidationError};
use fieldlog_remote::{ConnectivityProbe, LedgerClient};
use fieldlog_store::{RecordStore, StoreError};
use fieldlog_sync::Reconciler;
use fieldlog_types::{FieldMap, Record, RecordId};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::{info, warn};

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Terminal, caller-visible failures. Remote trouble never appears here —
/// it is absorbed by the local fallback.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Rejected before any store or network interaction.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The local store could not preserve the write.
    #[error("local store failed: {0}")]
    Store(#[from] StoreError),
}

/// How a write reached durability. The caller's notification layer keys its
/// wording off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The remote ledger acknowledged the write; nothing was kept locally.
    Remote,
    /// The ledger was unreachable or said no; the write sits in the local
    /// queue until a drain delivers it.
    LocalFallback,
}

/// Write and read surface for one module.
pub struct ModuleGateway {
    schema: ModuleSchema,
    store: Arc<RecordStore>,
    remote: Arc<LedgerClient>,
    reconciler: Arc<Reconciler>,
    connectivity: Arc<dyn ConnectivityProbe>,
}

impl ModuleGateway {
    /// Creates a gateway scoped to the schema's module.
    pub fn new(
        schema: ModuleSchema,
        store: Arc<RecordStore>,
        remote: Arc<LedgerClient>,
        reconciler: Arc<Reconciler>,
        connectivity: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            schema,
            store,
            remote,
            reconciler,
            connectivity,
        }
    }

    /// The module this gateway serves.
    #[must_use]
    pub fn module(&self) -> &str {
        self.schema.module()
    }

    /// Records a new entry: remote-first when reachable, local fallback
    /// otherwise.
    pub async fn register(&self, mut fields: FieldMap) -> GatewayResult<WriteOutcome> {
        self.schema.validate(&fields)?;
        stamp_registered(&mut fields);

        if self.connectivity.is_reachable() {
            match self.remote.create(self.module(), fields.clone()).await {
                Ok(_) => {
                    info!(module = self.module(), "entry accepted by remote ledger");
                    self.spawn_drain();
                    return Ok(WriteOutcome::Remote);
                }
                Err(err) => {
                    warn!(module = self.module(), error = %err, "remote create failed, keeping entry locally");
                }
            }
        }

        let record = self.put_local(fields).await?;
        info!(module = self.module(), id = ?record.id, "entry queued locally");
        Ok(WriteOutcome::LocalFallback)
    }

    /// Edits an existing entry, remote-first with a local fallback. A
    /// fallback targeting an identity the local store does not hold fails
    /// with [`StoreError::NotFound`].
    pub async fn edit(&self, id: RecordId, mut fields: FieldMap) -> GatewayResult<WriteOutcome> {
        self.schema.validate(&fields)?;
        stamp_registered(&mut fields);

        if self.connectivity.is_reachable() {
            match self.remote.update(self.module(), id, fields.clone()).await {
                Ok(_) => {
                    info!(module = self.module(), %id, "edit accepted by remote ledger");
                    self.spawn_drain();
                    return Ok(WriteOutcome::Remote);
                }
                Err(err) => {
                    warn!(module = self.module(), %id, error = %err, "remote update failed, editing locally");
                }
            }
        }

        let record = {
            let store = self.store.clone();
            let module = self.module().to_string();
            run_store_task(spawn_blocking(move || store.update(&module, id, &fields))).await?
        };
        info!(module = self.module(), id = ?record.id, "entry edited locally");
        Ok(WriteOutcome::LocalFallback)
    }

    /// Removes an entry, remote-first with a local fallback. The local
    /// removal is idempotent.
    pub async fn remove(&self, id: RecordId) -> GatewayResult<WriteOutcome> {
        if self.connectivity.is_reachable() {
            match self.remote.delete(self.module(), id).await {
                Ok(_) => {
                    info!(module = self.module(), %id, "removal accepted by remote ledger");
                    self.spawn_drain();
                    return Ok(WriteOutcome::Remote);
                }
                Err(err) => {
                    warn!(module = self.module(), %id, error = %err, "remote delete failed, removing locally");
                }
            }
        }

        {
            let store = self.store.clone();
            let module = self.module().to_string();
            run_store_task(spawn_blocking(move || store.remove(&module, id))).await?;
        }
        info!(module = self.module(), %id, "entry removed locally");
        Ok(WriteOutcome::LocalFallback)
    }

    /// The merged view of this module.
    pub async fn list(&self) -> Vec<Record> {
        self.reconciler.merged_list(self.module()).await
    }

    /// Replays this module's pending queue now. The post-write triggers use
    /// the same path in the background.
    pub async fn drain_now(&self) -> fieldlog_sync::DrainReport {
        self.reconciler.drain(self.module()).await
    }

    fn spawn_drain(&self) {
        let reconciler = self.reconciler.clone();
        let module = self.module().to_string();
        tokio::spawn(async move {
            reconciler.drain(&module).await;
        });
    }

    async fn put_local(&self, fields: FieldMap) -> GatewayResult<Record> {
        let store = self.store.clone();
        let module = self.module().to_string();
        run_store_task(spawn_blocking(move || store.put(&module, &fields))).await
    }
}

async fn run_store_task<T>(
    task: tokio::task::JoinHandle<Result<T, StoreError>>,
) -> GatewayResult<T> {
    match task.await {
        Ok(result) => result.map_err(GatewayError::from),
        Err(err) => {
            warn!(error = %err, "store task panicked");
            Err(GatewayError::Store(StoreError::Unavailable))
        }
    }
}

/// Display-formatted creation stamp, carried inside the payload so it
/// travels to the remote ledger with the entry.
fn stamp_registered(fields: &mut FieldMap) {
    fields.insert(
        "registered".into(),
        Value::String(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    );
}
