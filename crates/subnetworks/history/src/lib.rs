#![warn(clippy::unwrap_used)]
#![warn(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod events;
pub mod network;
pub mod storage;
#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_utils;
pub mod validation;

use std::{path::Path, sync::Arc};

use portal_storage::PortalStorageConfig;
use portal_validation::{accumulator::PreMergeAccumulator, header_validator::HeaderValidator};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
    time::{interval, Duration},
};
use tracing::info;

use crate::{
    config::HistoryConfig,
    events::{HistoryEvents, OfferedContent},
    network::{ContentNetwork, HistoryNetwork},
    storage::HistoryStorage,
    validation::ChainHistoryValidator,
};

/// Handles to a running history network.
pub struct HistoryNetworkHandle<N> {
    pub network: Arc<HistoryNetwork<N>>,
    /// Feeds content offered by peers into the events loop.
    pub content_tx: mpsc::Sender<OfferedContent>,
    /// Stops the events loop and the heartbeat.
    pub shutdown_tx: broadcast::Sender<()>,
    pub events_task: JoinHandle<()>,
    pub heartbeat_task: JoinHandle<()>,
}

/// Loads the pre-merge accumulator, opens history storage and starts the events loop and the
/// heartbeat.
///
/// Fails if the accumulator at `pre_merge_acc_path` does not hash to
/// [HistoryConfig::pre_merge_acc_root]. Must be called from within a Tokio runtime.
pub fn initialize_history_network<N: ContentNetwork>(
    overlay: Arc<N>,
    storage_config: PortalStorageConfig,
    pre_merge_acc_path: &Path,
    config: HistoryConfig,
) -> anyhow::Result<HistoryNetworkHandle<N>> {
    let pre_merge_acc = PreMergeAccumulator::try_from_file_with_root(
        pre_merge_acc_path,
        config.pre_merge_acc_root,
    )?;
    let storage = HistoryStorage::new(storage_config)?;
    let validator = ChainHistoryValidator::new(HeaderValidator::new(Arc::new(pre_merge_acc)));
    let network = Arc::new(HistoryNetwork::new(overlay, storage, validator));

    let (content_tx, content_rx) = mpsc::channel(config.content_queue_size);
    let (shutdown_tx, _) = broadcast::channel(1);
    let events = HistoryEvents {
        network: Arc::clone(&network),
        content_rx,
        shutdown_rx: shutdown_tx.subscribe(),
    };
    info!(
        radius = %network.storage.radius(),
        "About to spawn History Network"
    );
    let events_task = tokio::spawn(events.start());
    let heartbeat_task = spawn_history_heartbeat(
        Arc::clone(&network),
        config.heartbeat_interval,
        shutdown_tx.subscribe(),
    );

    Ok(HistoryNetworkHandle {
        network,
        content_tx,
        shutdown_tx,
        events_task,
        heartbeat_task,
    })
}

pub fn spawn_history_heartbeat<N: ContentNetwork>(
    network: Arc<HistoryNetwork<N>>,
    heartbeat_interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut heart_interval = interval(heartbeat_interval);
        // The first tick completes immediately.
        heart_interval.tick().await;

        loop {
            tokio::select! {
                _ = heart_interval.tick() => {
                    let storage_log = network.storage.get_summary_info();
                    info!("reports~ data: {storage_log}");
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    })
}
