//! # Todo Sync Engine
//!
//! Keeps a local [`ItemStore`](todo_core::ItemStore) consistent with a
//! remote todo list service under unreliable connectivity.
//!
//! This crate provides:
//! - [`RetryPolicy`], bounded-time retry with growing, jittered delays
//! - [`RemoteService`], the transport abstraction, with an HTTP
//!   implementation ([`HttpTransport`]) and an in-memory one ([`MockRemote`])
//! - [`SyncEngine`], the sync state machine and collaborator-facing API
//!
//! ## Sync cycle
//!
//! 1. Load the local snapshot into the working set
//! 2. Fetch the remote list; add remote-only items, keep local copies of
//!    items present on both sides
//! 3. Push the merged list back in one bulk update
//! 4. Persist the merged list locally
//!
//! Between cycles every mutation is saved locally first, then replicated as
//! a single-item call in the background.
//!
//! ## Revisions
//!
//! Every response carries the remote revision. The engine remembers the
//! latest one and sends it with the next request; the service rejects
//! stale writes and the retry policy handles the rejection like any other
//! failure.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod retry;
mod state;
mod transport;

pub use config::{RetryConfig, SyncConfig, DEFAULT_DEVICE_ID, DEFAULT_MAX_RETRIES};
pub use engine::{ReplicationKind, ReplicationOutcome, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use http::HttpTransport;
pub use retry::{RetryError, RetryPolicy};
pub use state::{RevisionTracker, SyncCycleResult, SyncState, SyncStats};
pub use transport::{MockRemote, RemoteService};
