//! Sync command implementation.

use super::{open_store, Output};
use serde::Serialize;
use std::io::Write;
use todo_core::StoreConfig;
use todo_sync_engine::{HttpTransport, SyncConfig, SyncCycleResult, SyncEngine};

/// Summary of a finished sync, as printed by the command.
#[derive(Debug, Serialize)]
pub struct SyncSummary {
    /// Remote-only items added locally.
    pub pulled: usize,
    /// Items sent to the remote.
    pub pushed: usize,
    /// Items where the local copy won.
    pub kept_local: usize,
    /// Remote records skipped as invalid.
    pub dropped: usize,
    /// Remote revision after the sync.
    pub revision: i64,
    /// Wall time in milliseconds.
    pub duration_ms: u128,
}

impl From<&SyncCycleResult> for SyncSummary {
    fn from(result: &SyncCycleResult) -> Self {
        Self {
            pulled: result.pulled,
            pushed: result.pushed,
            kept_local: result.kept_local,
            dropped: result.dropped,
            revision: result.revision,
            duration_ms: result.duration.as_millis(),
        }
    }
}

/// Runs one sync cycle against the service at `base_url`.
pub fn run(
    config: &StoreConfig,
    base_url: String,
    token: String,
    device_id: String,
    format: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = Output::parse(format)?;
    let sync_config = SyncConfig::new(base_url, token).with_device_id(device_id);
    let store = open_store(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(async move {
        let transport = HttpTransport::new(&sync_config)?;
        let mut engine = SyncEngine::new(sync_config, store, transport)?;
        let result = engine.begin_sync().await?;
        Ok::<_, todo_sync_engine::SyncError>(SyncSummary::from(&result))
    })?;

    match output {
        Output::Json => {
            serde_json::to_writer_pretty(&mut *out, &summary)?;
            writeln!(out)?;
        }
        Output::Text => writeln!(
            out,
            "Synced: {} pulled, {} pushed, {} kept local, revision {}",
            summary.pulled, summary.pushed, summary.kept_local, summary.revision
        )?,
    }
    Ok(())
}
