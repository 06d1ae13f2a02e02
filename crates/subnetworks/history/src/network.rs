use std::{future::Future, sync::Arc};

use alloy_primitives::B256;
use anyhow::anyhow;
use discv5::enr::NodeId;
use portal_api::{
    utils::bytes::hex_encode, EpochAccumulator, HeaderWithProof, HistoryContentKey,
    PortalBlockBody, PortalReceipts,
};
use portal_validation::validator::{ValidationResult, Validator};
use ssz::Decode;
use tracing::{debug, warn};

use crate::{error::HistoryError, storage::HistoryStorage, validation::ChainHistoryValidator};

/// Number of network lookups made for one piece of content before giving up.
pub const MAX_LOOKUP_ATTEMPTS: usize = 4;

/// The overlay operations the history network relies on.
pub trait ContentNetwork: Send + Sync + 'static {
    /// Asks the overlay for the content stored under `content_key`.
    fn content_lookup(
        &self,
        content_key: &HistoryContentKey,
    ) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;

    /// Offers content to interested peers, skipping `source` if set. Implementations pick up to 4
    /// of the closest interested peers plus up to 4 random farther ones.
    ///
    /// Returns the number of peers the content was offered to.
    fn gossip(
        &self,
        source: Option<NodeId>,
        content: Vec<(HistoryContentKey, Vec<u8>)>,
    ) -> impl Future<Output = anyhow::Result<usize>> + Send;
}

/// History network layer on top of the overlay network. Resolves content locally when possible,
/// and only stores content fetched from the network after it validated.
pub struct HistoryNetwork<N> {
    pub overlay: Arc<N>,
    pub storage: Arc<HistoryStorage>,
    pub validator: Arc<ChainHistoryValidator>,
}

impl<N: ContentNetwork> HistoryNetwork<N> {
    pub fn new(overlay: Arc<N>, storage: HistoryStorage, validator: ChainHistoryValidator) -> Self {
        Self {
            overlay,
            storage: Arc::new(storage),
            validator: Arc::new(validator),
        }
    }

    pub async fn get_block_header(
        &self,
        block_hash: B256,
    ) -> Result<HeaderWithProof, HistoryError> {
        self.get_content(
            HistoryContentKey::new_block_header(block_hash),
            decode_ssz::<HeaderWithProof>,
            |content| self.validator.validate_header(block_hash, content),
        )
        .await
    }

    pub async fn get_block_body(&self, block_hash: B256) -> Result<PortalBlockBody, HistoryError> {
        let header = self.get_block_header(block_hash).await?.header;
        self.get_content(
            HistoryContentKey::new_block_body(block_hash),
            decode_ssz::<PortalBlockBody>,
            |content| self.validator.validate_block_body(content, &header),
        )
        .await
    }

    pub async fn get_receipts(&self, block_hash: B256) -> Result<PortalReceipts, HistoryError> {
        let header = self.get_block_header(block_hash).await?.header;
        self.get_content(
            HistoryContentKey::new_block_receipts(block_hash),
            decode_ssz::<PortalReceipts>,
            |content| self.validator.validate_receipts(content, &header),
        )
        .await
    }

    pub async fn get_epoch_accumulator(
        &self,
        epoch_hash: B256,
    ) -> Result<EpochAccumulator, HistoryError> {
        self.get_content(
            HistoryContentKey::new_epoch_accumulator(epoch_hash),
            decode_ssz::<EpochAccumulator>,
            |content| self.validator.validate_epoch_accumulator(epoch_hash, content),
        )
        .await
    }

    /// Validates and stores each offered item in order.
    ///
    /// Items outside the radius, or already stored, are skipped without being validated. The
    /// first item that fails validation aborts the batch. Items before it stay stored. Returns
    /// the accepted content, ready to be gossiped.
    pub async fn validate_contents(
        &self,
        content_keys: &[Vec<u8>],
        contents: &[Vec<u8>],
    ) -> Result<Vec<(HistoryContentKey, Vec<u8>)>, HistoryError> {
        if content_keys.len() != contents.len() {
            return Err(HistoryError::InvalidContent(format!(
                "Offered {} content keys with {} content values",
                content_keys.len(),
                contents.len()
            )));
        }

        let mut validated = Vec::with_capacity(contents.len());
        for (raw_key, content) in content_keys.iter().zip(contents) {
            let content_key = HistoryContentKey::try_from(raw_key.as_slice()).map_err(|err| {
                HistoryError::InvalidContent(format!(
                    "Unable to decode content key {}: {err}",
                    hex_encode(raw_key)
                ))
            })?;
            if !self
                .storage
                .is_key_within_radius_and_unavailable(&content_key)?
            {
                debug!(
                    content.key = %content_key,
                    "Skipping offered content outside radius or already stored"
                );
                continue;
            }
            if let ValidationResult::Invalid(reason) =
                self.validate_content(&content_key, content).await
            {
                return Err(HistoryError::Validation {
                    content_key,
                    reason,
                });
            }
            self.storage.put(&content_key, content)?;
            validated.push((content_key, content.clone()));
        }
        Ok(validated)
    }

    pub async fn gossip(
        &self,
        source: Option<NodeId>,
        content: Vec<(HistoryContentKey, Vec<u8>)>,
    ) -> anyhow::Result<usize> {
        self.overlay.gossip(source, content).await
    }

    /// Looks up content locally, then on the network up to [MAX_LOOKUP_ATTEMPTS] times.
    ///
    /// Stored content was validated before it was written, so it is only decoded. Content from
    /// the network goes through `validate`, which also decodes it, and is stored once it passes.
    async fn get_content<T>(
        &self,
        content_key: HistoryContentKey,
        decode: fn(&[u8]) -> anyhow::Result<T>,
        validate: impl Fn(&[u8]) -> anyhow::Result<T>,
    ) -> Result<T, HistoryError> {
        if !self.storage.in_range(&content_key) {
            return Err(HistoryError::OutOfRange { content_key });
        }

        if let Some(content) = self.storage.get(&content_key)? {
            match decode(&content) {
                Ok(value) => return Ok(value),
                Err(err) => warn!(
                    content.key = %content_key,
                    error = %err,
                    "Unable to decode stored content, looking it up on the network"
                ),
            }
        }

        for attempt in 1..=MAX_LOOKUP_ATTEMPTS {
            let content = match self.overlay.content_lookup(&content_key).await {
                Ok(content) => content,
                Err(err) => {
                    warn!(
                        content.key = %content_key,
                        attempt,
                        error = %err,
                        "Content lookup failed"
                    );
                    continue;
                }
            };
            match validate(&content) {
                Ok(value) => {
                    debug!(
                        content.key = %content_key,
                        attempt,
                        "Found valid content on the network"
                    );
                    self.storage.put(&content_key, &content)?;
                    return Ok(value);
                }
                Err(err) => warn!(
                    content.key = %content_key,
                    attempt,
                    error = %err,
                    "Content validation failed"
                ),
            }
        }
        Err(HistoryError::ContentNotFound { content_key })
    }

    async fn check_content(
        &self,
        content_key: &HistoryContentKey,
        content: &[u8],
    ) -> anyhow::Result<()> {
        match content_key {
            HistoryContentKey::BlockHeaderWithProof(key) => {
                self.validator.validate_header(key.block_hash, content)?;
            }
            HistoryContentKey::BlockBody(key) => {
                let header = self.get_block_header(key.block_hash).await?.header;
                self.validator.validate_block_body(content, &header)?;
            }
            HistoryContentKey::BlockReceipts(key) => {
                let header = self.get_block_header(key.block_hash).await?.header;
                self.validator.validate_receipts(content, &header)?;
            }
            HistoryContentKey::EpochAccumulator(key) => {
                self.validator
                    .validate_epoch_accumulator(key.epoch_hash, content)?;
            }
        }
        Ok(())
    }
}

impl<N: ContentNetwork> Validator<HistoryContentKey> for HistoryNetwork<N> {
    async fn validate_content(
        &self,
        content_key: &HistoryContentKey,
        content: &[u8],
    ) -> ValidationResult {
        match self.check_content(content_key, content).await {
            Ok(()) => ValidationResult::CanonicallyValid,
            Err(err) => ValidationResult::Invalid(err.to_string()),
        }
    }
}

fn decode_ssz<T: Decode>(content: &[u8]) -> anyhow::Result<T> {
    T::from_ssz_bytes(content)
        .map_err(|err| anyhow!("Stored content has invalid encoding: {err:?}"))
}
