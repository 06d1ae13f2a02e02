use std::sync::Arc;

use discv5::enr::NodeId;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn, Instrument};

use crate::network::{ContentNetwork, HistoryNetwork};

/// Content a peer pushed to this node, as received on the wire.
#[derive(Debug, Clone)]
pub struct OfferedContent {
    pub peer: NodeId,
    pub content_keys: Vec<Vec<u8>>,
    pub contents: Vec<Vec<u8>>,
}

pub struct HistoryEvents<N> {
    pub network: Arc<HistoryNetwork<N>>,
    pub content_rx: mpsc::Receiver<OfferedContent>,
    pub shutdown_rx: broadcast::Receiver<()>,
}

impl<N: ContentNetwork> HistoryEvents<N> {
    /// Handles offered content until a shutdown signal arrives or the content channel closes.
    ///
    /// Batches are handled one at a time, in the order they were received.
    pub async fn start(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("History events received shutdown signal");
                    break;
                }
                offered = self.content_rx.recv() => {
                    let Some(offered) = offered else {
                        error!("History content channel closed, shutting down");
                        break;
                    };
                    self.handle_offered_content(offered).await;
                }
            }
        }
    }

    /// Validates and stores a batch, then gossips it from a detached task.
    async fn handle_offered_content(&self, offered: OfferedContent) {
        let OfferedContent {
            peer,
            content_keys,
            contents,
        } = offered;
        let validated = match self
            .network
            .validate_contents(&content_keys, &contents)
            .instrument(tracing::info_span!("history_network", peer = %peer))
            .await
        {
            Ok(validated) => validated,
            Err(err) => {
                warn!(peer = %peer, error = %err, "Rejected offered content");
                return;
            }
        };
        if validated.is_empty() {
            debug!(peer = %peer, "No offered content was accepted");
            return;
        }
        debug!(peer = %peer, count = validated.len(), "Stored offered content");

        let network = Arc::clone(&self.network);
        tokio::spawn(async move {
            match network.gossip(Some(peer), validated).await {
                Ok(offered_to) => debug!(peers = offered_to, "Gossiped offered content"),
                Err(err) => warn!(error = %err, "Unable to gossip offered content"),
            }
        });
    }
}
