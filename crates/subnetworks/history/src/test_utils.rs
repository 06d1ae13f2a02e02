use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use alloy_primitives::B256;
use anyhow::anyhow;
use discv5::enr::NodeId;
use parking_lot::Mutex;
use portal_api::{
    types::execution::block_body::BlockBodyLegacy, HistoryContentKey, PortalBlockBody,
    PortalReceipts,
};
use portal_storage::{
    test_utils::create_test_portal_storage_config_with_capacity, PortalStorageConfig,
};
use portal_validation::test_utils::{chain, ProvenChain};
use ssz::Encode;
use tempfile::TempDir;
use tokio::sync::mpsc;

use crate::{network::HistoryNetwork, storage::HistoryStorage, validation::ChainHistoryValidator};

pub type Gossiped = (Option<NodeId>, Vec<(HistoryContentKey, Vec<u8>)>);

/// Overlay that serves queued responses per content key and reports gossip on a channel.
pub struct MockNetwork {
    responses: Mutex<HashMap<HistoryContentKey, VecDeque<Vec<u8>>>>,
    pub lookups: AtomicUsize,
    gossip_tx: mpsc::UnboundedSender<Gossiped>,
}

impl MockNetwork {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Gossiped>) {
        let (gossip_tx, gossip_rx) = mpsc::unbounded_channel();
        let network = Self {
            responses: Mutex::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
            gossip_tx,
        };
        (network, gossip_rx)
    }

    /// Queues `content` as the response to the next unanswered lookup of `content_key`.
    pub fn respond(&self, content_key: &HistoryContentKey, content: Vec<u8>) {
        self.responses
            .lock()
            .entry(content_key.clone())
            .or_default()
            .push_back(content);
    }
}

impl crate::network::ContentNetwork for MockNetwork {
    async fn content_lookup(&self, content_key: &HistoryContentKey) -> anyhow::Result<Vec<u8>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .get_mut(content_key)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| anyhow!("No peer returned content for {content_key}"))
    }

    async fn gossip(
        &self,
        source: Option<NodeId>,
        content: Vec<(HistoryContentKey, Vec<u8>)>,
    ) -> anyhow::Result<usize> {
        let offered = content.len();
        self.gossip_tx.send((source, content))?;
        Ok(offered)
    }
}

/// A history network over a short synthetic chain. The header at [TestHistory::FULL_BLOCK]
/// commits to `body` and `receipts`.
pub struct TestHistory {
    pub network: Arc<HistoryNetwork<MockNetwork>>,
    pub overlay: Arc<MockNetwork>,
    pub proven: ProvenChain,
    pub body: PortalBlockBody,
    pub receipts: PortalReceipts,
    pub gossiped: mpsc::UnboundedReceiver<Gossiped>,
    pub storage_config: PortalStorageConfig,
    _temp_dir: TempDir,
}

impl TestHistory {
    pub const FULL_BLOCK: usize = 3;

    pub fn new() -> Self {
        let body = PortalBlockBody::Legacy(BlockBodyLegacy {
            txs: vec![vec![0xc0], vec![0xc1, 0x80]],
            uncles: vec![0xc0],
        });
        let receipts = PortalReceipts(vec![vec![0xc2, 0x80, 0x80]]);
        let mut headers = chain(6);
        let header = &mut headers[Self::FULL_BLOCK];
        header.transactions_root = body.transactions_root().unwrap();
        header.uncles_hash = body.uncles_root();
        header.receipts_root = receipts.root().unwrap();
        let proven = ProvenChain::from_headers(headers).unwrap();

        let (temp_dir, config) = create_test_portal_storage_config_with_capacity(10).unwrap();
        let storage = HistoryStorage::new(config.clone()).unwrap();
        let (overlay, gossiped) = MockNetwork::new();
        let overlay = Arc::new(overlay);
        let network = HistoryNetwork::new(
            Arc::clone(&overlay),
            storage,
            ChainHistoryValidator::new(proven.header_validator()),
        );

        Self {
            network: Arc::new(network),
            overlay,
            proven,
            body,
            receipts,
            gossiped,
            storage_config: config,
            _temp_dir: temp_dir,
        }
    }

    pub fn block_hash(&self, index: usize) -> B256 {
        self.proven.headers[index].hash()
    }

    /// Lets the overlay answer one lookup of the header at `index`.
    pub fn serve_header(&self, index: usize) {
        let header_with_proof = self.proven.header_with_proof(index).unwrap();
        self.overlay.respond(
            &HistoryContentKey::new_block_header(self.block_hash(index)),
            header_with_proof.as_ssz_bytes(),
        );
    }
}
