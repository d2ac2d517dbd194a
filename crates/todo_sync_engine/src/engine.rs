//! The sync engine: local store, remote service and the glue between them.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::retry::RetryPolicy;
use crate::state::{RevisionTracker, SyncCycleResult, SyncState, SyncStats};
use crate::transport::RemoteService;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinSet;
use todo_codec::{Item, ItemCodec, Timestamp};
use todo_core::ItemStore;
use todo_storage::StorageBackend;
use todo_sync_protocol::{ElementResponse, ItemNetworkModel, ListResponse};

/// The kind of single-item call a mutation replicates as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationKind {
    /// POST of a new item.
    Add,
    /// PUT of an existing item.
    Edit,
    /// DELETE of an item.
    Remove,
}

impl fmt::Display for ReplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReplicationKind::Add => "add",
            ReplicationKind::Edit => "edit",
            ReplicationKind::Remove => "remove",
        })
    }
}

/// Result of one background replication.
#[derive(Debug)]
pub struct ReplicationOutcome {
    /// Id of the replicated item.
    pub id: String,
    /// Which call was made.
    pub kind: ReplicationKind,
    /// The remote revision on success.
    pub result: SyncResult<i64>,
}

/// Responses that carry a remote revision.
trait Revisioned {
    fn revision(&self) -> i64;
}

impl Revisioned for ListResponse {
    fn revision(&self) -> i64 {
        self.revision
    }
}

impl Revisioned for ElementResponse {
    fn revision(&self) -> i64 {
        self.revision
    }
}

/// Runs one remote call under the retry policy.
///
/// Each attempt reads the tracker afresh, so a retry picks up revisions
/// observed by other calls in the meantime.
async fn call_with_retry<R, T, F, Fut>(
    retry: &RetryPolicy,
    remote: &Arc<R>,
    revision: &RevisionTracker,
    op: F,
) -> SyncResult<T>
where
    R: RemoteService,
    T: Revisioned,
    F: Fn(Arc<R>, i64) -> Fut,
    Fut: Future<Output = SyncResult<T>>,
{
    let response = retry
        .run_if(
            || op(Arc::clone(remote), revision.get()),
            SyncError::is_retryable,
        )
        .await?;
    revision.observe(response.revision());
    Ok(response)
}

/// Resets the published state if a cycle future is dropped midway.
struct CycleGuard {
    state: Arc<watch::Sender<SyncState>>,
    armed: bool,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if self.armed {
            let interrupted = *self.state.borrow();
            tracing::debug!(state = %interrupted, "sync cycle cancelled");
            self.state.send_replace(SyncState::Idle);
        }
    }
}

/// Keeps an [`ItemStore`] consistent with a remote service.
///
/// Mutations apply to the store and its persisted snapshot synchronously,
/// then replicate the single changed item in a background task. A full
/// [`begin_sync`](Self::begin_sync) cycle merges the remote list into the
/// store with local copies winning, pushes the result back and persists it.
///
/// The engine is single-owner: mutating methods take `&mut self`.
/// Background tasks share only the remote and the revision tracker.
/// Dropping the engine aborts in-flight replication.
pub struct SyncEngine<B, C, R> {
    config: SyncConfig,
    store: ItemStore<B, C>,
    remote: Arc<R>,
    retry: RetryPolicy,
    revision: Arc<RevisionTracker>,
    state: Arc<watch::Sender<SyncState>>,
    stats: SyncStats,
    replication: JoinSet<ReplicationOutcome>,
    runtime: Handle,
}

impl<B, C, R> SyncEngine<B, C, R>
where
    B: StorageBackend,
    C: ItemCodec,
    R: RemoteService,
{
    /// Creates an engine over `store` and `remote`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Runtime`] when called outside a Tokio runtime.
    pub fn new(config: SyncConfig, store: ItemStore<B, C>, remote: R) -> SyncResult<Self> {
        Self::with_shared_remote(config, store, Arc::new(remote))
    }

    /// Creates an engine over a remote the caller keeps a handle to.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Runtime`] when called outside a Tokio runtime.
    pub fn with_shared_remote(
        config: SyncConfig,
        store: ItemStore<B, C>,
        remote: Arc<R>,
    ) -> SyncResult<Self> {
        let runtime = Handle::try_current().map_err(|e| SyncError::Runtime(e.to_string()))?;
        let (state, _) = watch::channel(SyncState::Idle);
        Ok(Self {
            retry: RetryPolicy::new(config.retry.clone()),
            config,
            store,
            remote,
            revision: Arc::new(RevisionTracker::default()),
            state: Arc::new(state),
            stats: SyncStats::default(),
            replication: JoinSet::new(),
            runtime,
        })
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Returns true while a sync cycle is running.
    pub fn is_loading(&self) -> bool {
        self.state().is_active()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.clone()
    }

    /// The last revision observed from the remote.
    pub fn revision(&self) -> i64 {
        self.revision.get()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the local store.
    pub fn store(&self) -> &ItemStore<B, C> {
        &self.store
    }

    /// Returns the remote service.
    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// All items ordered by creation time.
    pub fn current_items(&self) -> Vec<Item> {
        self.store.items_by_creation()
    }

    /// Returns the item with `id`.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.store.get(id)
    }

    fn set_state(&self, state: SyncState) {
        tracing::trace!(%state, "sync state");
        self.state.send_replace(state);
    }

    /// Runs one full sync cycle.
    ///
    /// Loads the local snapshot, fetches the remote list, merges it (local
    /// copies win, remote-only items are added), pushes the merged list
    /// back and persists it locally. The network legs run under the retry
    /// policy.
    ///
    /// Dropping the returned future cancels the cycle and resets the state
    /// to [`SyncState::Idle`]; the working set keeps whatever was merged.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing step; the state becomes
    /// [`SyncState::Failed`] and the working set keeps the last good local
    /// state.
    pub async fn begin_sync(&mut self) -> SyncResult<SyncCycleResult> {
        let current = self.state();
        if !current.can_start_sync() {
            return Err(SyncError::InvalidStateTransition {
                from: current.to_string(),
                to: SyncState::Loading.to_string(),
            });
        }
        if current == SyncState::Failed {
            self.set_state(SyncState::Idle);
        }

        let mut guard = CycleGuard {
            state: Arc::clone(&self.state),
            armed: true,
        };
        let start = Instant::now();
        let outcome = self.run_cycle(start).await;
        guard.armed = false;

        match outcome {
            Ok(result) => {
                self.set_state(SyncState::Idle);
                self.stats.cycles_completed += 1;
                self.stats.items_pulled += result.pulled as u64;
                self.stats.items_pushed += result.pushed as u64;
                self.stats.last_sync_time = Some(Instant::now());
                self.stats.last_error = None;
                tracing::info!(
                    pulled = result.pulled,
                    pushed = result.pushed,
                    kept_local = result.kept_local,
                    revision = result.revision,
                    "sync complete"
                );
                Ok(result)
            }
            Err(err) => {
                self.handle_error(&err);
                Err(err)
            }
        }
    }

    async fn run_cycle(&mut self, start: Instant) -> SyncResult<SyncCycleResult> {
        self.set_state(SyncState::Loading);
        let loaded = self.store.load_if_present()?;
        tracing::debug!(loaded, items = self.store.len(), "local snapshot loaded");

        self.set_state(SyncState::FetchingRemote);
        let remote_list = call_with_retry(
            &self.retry,
            &self.remote,
            &self.revision,
            |remote, revision| async move { remote.list(revision).await },
        )
        .await?;

        self.set_state(SyncState::Merging);
        let mut pulled = 0;
        let mut kept_local = 0;
        let mut dropped = 0;
        for model in remote_list.list {
            match model.into_item() {
                Ok(item) if self.store.contains(item.id()) => kept_local += 1,
                Ok(item) => {
                    self.store.add(item);
                    pulled += 1;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "dropping remote record");
                    dropped += 1;
                }
            }
        }

        self.set_state(SyncState::PushingRemote);
        let list: Vec<ItemNetworkModel> = self
            .store
            .items_by_creation()
            .iter()
            .map(|item| ItemNetworkModel::from_item(item, &self.config.device_id))
            .collect();
        let pushed = list.len();
        let response = call_with_retry(
            &self.retry,
            &self.remote,
            &self.revision,
            move |remote, revision| {
                let list = list.clone();
                async move { remote.update(revision, list).await }
            },
        )
        .await?;

        self.set_state(SyncState::PersistingLocal);
        self.store.save()?;

        Ok(SyncCycleResult {
            pulled,
            pushed,
            kept_local,
            dropped,
            revision: response.revision,
            duration: start.elapsed(),
        })
    }

    /// Handles an error by updating state and stats.
    fn handle_error(&mut self, error: &SyncError) {
        tracing::warn!(%error, "sync failed, keeping local state");
        self.set_state(SyncState::Failed);
        self.stats.cycles_failed += 1;
        self.stats.last_error = Some(error.to_string());
    }

    /// Creates an item from `text` and replicates it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the item could not be saved; the
    /// working set is left unchanged.
    pub fn add_item(&mut self, text: impl Into<String>) -> SyncResult<Item> {
        let item = Item::create(text);
        self.put(item.clone())?;
        self.replicate(ReplicationKind::Add, &item);
        Ok(item)
    }

    /// Stores `item`, replacing any item with the same id.
    ///
    /// An existing item is stamped with `changed_at = now` and replicated as
    /// an edit; an unknown id is replicated as an add.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the item could not be saved.
    pub fn edit_item(&mut self, item: Item) -> SyncResult<Item> {
        let exists = self.store.contains(item.id());
        let (item, kind) = if exists {
            (item.edited(Timestamp::now()), ReplicationKind::Edit)
        } else {
            (item, ReplicationKind::Add)
        };
        self.put(item.clone())?;
        self.replicate(kind, &item);
        Ok(item)
    }

    /// Marks the item `id` done or not done.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] for an unknown id, or
    /// [`SyncError::Store`] if the change could not be saved.
    pub fn set_done(&mut self, id: &str, done: bool) -> SyncResult<Item> {
        let current = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        let item = current.with_done(done).edited(Timestamp::now());
        self.put(item.clone())?;
        self.replicate(ReplicationKind::Edit, &item);
        Ok(item)
    }

    /// Removes the item `id` and replicates the deletion.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] for an unknown id, or
    /// [`SyncError::Store`] if the deletion could not be saved; the item is
    /// kept in that case.
    pub fn remove_item(&mut self, id: &str) -> SyncResult<Item> {
        let removed = self
            .store
            .remove(id)
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;

        if let Err(err) = self.store.save() {
            tracing::warn!(id, error = %err, "could not delete the item");
            self.store.add(removed);
            return Err(err.into());
        }

        self.replicate(ReplicationKind::Remove, &removed);
        Ok(removed)
    }

    /// Adds `item` to the store and saves, undoing the change on failure.
    fn put(&mut self, item: Item) -> SyncResult<()> {
        let id = item.id().to_string();
        let previous = self.store.add(item);

        if let Err(err) = self.store.save() {
            tracing::warn!(id = %id, error = %err, "could not save the item");
            match previous {
                Some(previous) => {
                    self.store.add(previous);
                }
                None => {
                    self.store.remove(&id);
                }
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Spawns the background call that mirrors one local change.
    fn replicate(&mut self, kind: ReplicationKind, item: &Item) {
        let remote = Arc::clone(&self.remote);
        let revision = Arc::clone(&self.revision);
        let retry = self.retry.clone();
        let id = item.id().to_string();
        let model = ItemNetworkModel::from_item(item, &self.config.device_id);

        let task = async move {
            let result = match kind {
                ReplicationKind::Add => {
                    call_with_retry(&retry, &remote, &revision, move |remote, rev| {
                        let model = model.clone();
                        async move { remote.add(rev, model).await }
                    })
                    .await
                }
                ReplicationKind::Edit => {
                    call_with_retry(&retry, &remote, &revision, move |remote, rev| {
                        let model = model.clone();
                        async move { remote.edit(rev, model).await }
                    })
                    .await
                }
                ReplicationKind::Remove => {
                    let target = id.clone();
                    call_with_retry(&retry, &remote, &revision, move |remote, rev| {
                        let target = target.clone();
                        async move { remote.remove(rev, &target).await }
                    })
                    .await
                }
            }
            .map(|response| response.revision);

            match &result {
                Ok(rev) => tracing::debug!(%id, %kind, revision = rev, "replicated"),
                Err(error) => tracing::warn!(%id, %kind, %error, "replication failed"),
            }
            ReplicationOutcome { id, kind, result }
        };

        self.reap_finished();
        self.replication.spawn_on(task, &self.runtime);
    }

    /// Number of replication tasks not yet collected.
    ///
    /// Finished tasks are collected by [`wait_for_replication`] and by the
    /// next mutation.
    ///
    /// [`wait_for_replication`]: Self::wait_for_replication
    pub fn pending_replication(&self) -> usize {
        self.replication.len()
    }

    /// Waits for every in-flight replication and returns their outcomes.
    ///
    /// Failures are reported, never rolled back locally. Aborted tasks are
    /// omitted, as are tasks already collected by a later mutation; those
    /// only show up in [`stats`](Self::stats).
    pub async fn wait_for_replication(&mut self) -> Vec<ReplicationOutcome> {
        let mut outcomes = Vec::new();
        while let Some(joined) = self.replication.join_next().await {
            outcomes.extend(self.record(joined));
        }
        outcomes
    }

    /// Collects tasks that have already finished.
    fn reap_finished(&mut self) {
        let mut reaped = 0usize;
        while let Some(joined) = self.replication.try_join_next() {
            self.record(joined);
            reaped += 1;
        }
        if reaped > 0 {
            tracing::trace!(reaped, "collected finished replication");
        }
    }

    /// Counts a joined task in the stats.
    fn record(
        &mut self,
        joined: Result<ReplicationOutcome, tokio::task::JoinError>,
    ) -> Option<ReplicationOutcome> {
        match joined.map_err(SyncError::from) {
            Ok(outcome) => {
                if outcome.result.is_ok() {
                    self.stats.replications_succeeded += 1;
                } else {
                    self.stats.replications_failed += 1;
                }
                Some(outcome)
            }
            Err(SyncError::Cancelled) => None,
            Err(error) => {
                tracing::warn!(%error, "replication task panicked");
                self.stats.replications_failed += 1;
                None
            }
        }
    }

    /// Aborts every in-flight replication, returning how many were pending.
    pub fn cancel_replication(&mut self) -> usize {
        let pending = self.replication.len();
        self.replication.abort_all();
        if pending > 0 {
            tracing::debug!(pending, "replication cancelled");
        }
        pending
    }
}

impl<B, C, R> Drop for SyncEngine<B, C, R> {
    fn drop(&mut self) {
        if !self.replication.is_empty() {
            tracing::debug!(
                pending = self.replication.len(),
                "aborting replication on drop"
            );
            self.replication.abort_all();
        }
    }
}

impl<B, C, R> fmt::Debug for SyncEngine<B, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("base_url", &self.config.base_url)
            .field("state", &*self.state.borrow())
            .field("revision", &self.revision.get())
            .field("pending_replication", &self.replication.len())
            .finish()
    }
}
