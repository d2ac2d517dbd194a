//! Sync state machine types.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

/// The current state of the sync engine.
///
/// A cycle walks `Idle → Loading → FetchingRemote → Merging →
/// PushingRemote → PersistingLocal → Idle`; any failing step moves to
/// `Failed`, from which the next cycle starts again through `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncState {
    /// Engine is idle, not syncing.
    #[default]
    Idle,
    /// Reading the local snapshot.
    Loading,
    /// Fetching the remote list.
    FetchingRemote,
    /// Merging remote items into the working set.
    Merging,
    /// Pushing the merged list to the remote.
    PushingRemote,
    /// Writing the merged list to the local store.
    PersistingLocal,
    /// The last cycle failed.
    Failed,
}

impl SyncState {
    /// Returns true while a sync cycle is running (the "loading" flag).
    pub fn is_active(&self) -> bool {
        !matches!(self, SyncState::Idle | SyncState::Failed)
    }

    /// Returns true if the engine can start a new sync.
    pub fn can_start_sync(&self) -> bool {
        matches!(self, SyncState::Idle | SyncState::Failed)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Idle => "idle",
            SyncState::Loading => "loading",
            SyncState::FetchingRemote => "fetching remote",
            SyncState::Merging => "merging",
            SyncState::PushingRemote => "pushing remote",
            SyncState::PersistingLocal => "persisting local",
            SyncState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The last revision observed from the remote service.
///
/// Shared between the engine and its replication tasks; the most recent
/// response wins.
#[derive(Debug, Default)]
pub struct RevisionTracker {
    value: AtomicI64,
}

impl RevisionTracker {
    /// Creates a tracker starting at `revision`.
    pub fn new(revision: i64) -> Self {
        Self {
            value: AtomicI64::new(revision),
        }
    }

    /// The revision to attach to the next request.
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Records the revision carried by a response.
    pub fn observe(&self, revision: i64) {
        self.value.store(revision, Ordering::SeqCst);
    }
}

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Total number of sync cycles completed.
    pub cycles_completed: u64,
    /// Total number of sync cycles that failed.
    pub cycles_failed: u64,
    /// Remote-only items added to the working set.
    pub items_pulled: u64,
    /// Items sent in bulk updates.
    pub items_pushed: u64,
    /// Single-item replications that succeeded.
    pub replications_succeeded: u64,
    /// Single-item replications that failed.
    pub replications_failed: u64,
    /// Last successful sync time.
    pub last_sync_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Result of a sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCycleResult {
    /// Remote-only items inserted into the working set.
    pub pulled: usize,
    /// Items sent in the bulk update.
    pub pushed: usize,
    /// Items present on both sides where the local copy was kept.
    pub kept_local: usize,
    /// Remote records that could not be converted and were skipped.
    pub dropped: usize,
    /// Remote revision after the push.
    pub revision: i64,
    /// Duration of the sync cycle.
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_state_checks() {
        assert!(SyncState::Idle.can_start_sync());
        assert!(SyncState::Failed.can_start_sync());
        assert!(!SyncState::Loading.can_start_sync());
        assert!(!SyncState::PushingRemote.can_start_sync());

        for state in [
            SyncState::Loading,
            SyncState::FetchingRemote,
            SyncState::Merging,
            SyncState::PushingRemote,
            SyncState::PersistingLocal,
        ] {
            assert!(state.is_active(), "{state}");
        }
        assert!(!SyncState::Idle.is_active());
        assert!(!SyncState::Failed.is_active());
        assert_eq!(SyncState::default(), SyncState::Idle);
    }

    #[test]
    fn revision_tracker_keeps_latest() {
        let tracker = RevisionTracker::default();
        assert_eq!(tracker.get(), 0);
        tracker.observe(5);
        tracker.observe(3);
        assert_eq!(tracker.get(), 3);
        assert_eq!(RevisionTracker::new(9).get(), 9);
    }
}
