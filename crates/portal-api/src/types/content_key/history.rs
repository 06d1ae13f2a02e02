use std::{fmt, hash::Hash};

use alloy_primitives::B256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    types::content_key::{error::ContentKeyError, overlay::OverlayContentKey},
    utils::bytes::{hex_decode, hex_encode_compact},
};

pub const HISTORY_BLOCK_HEADER_KEY_PREFIX: u8 = 0x00;
pub const HISTORY_BLOCK_BODY_KEY_PREFIX: u8 = 0x01;
pub const HISTORY_BLOCK_RECEIPTS_KEY_PREFIX: u8 = 0x02;
pub const HISTORY_EPOCH_ACCUMULATOR_KEY_PREFIX: u8 = 0x03;

/// Every history key is a selector byte followed by a 32 byte hash.
const HISTORY_CONTENT_KEY_LENGTH: usize = 33;

/// A content key in the history overlay network.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HistoryContentKey {
    /// A block header with its accumulator proof.
    BlockHeaderWithProof(BlockHashKey),
    BlockBody(BlockHashKey),
    /// The receipts of every transaction in a block.
    BlockReceipts(BlockHashKey),
    /// A committed epoch of header records, keyed by its root.
    EpochAccumulator(EpochAccumulatorKey),
}

/// Payload of header, body and receipts keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct BlockHashKey {
    pub block_hash: B256,
}

impl From<B256> for BlockHashKey {
    fn from(block_hash: B256) -> Self {
        Self { block_hash }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct EpochAccumulatorKey {
    pub epoch_hash: B256,
}

impl HistoryContentKey {
    pub fn new_block_header(block_hash: B256) -> Self {
        Self::BlockHeaderWithProof(block_hash.into())
    }

    pub fn new_block_body(block_hash: B256) -> Self {
        Self::BlockBody(block_hash.into())
    }

    pub fn new_block_receipts(block_hash: B256) -> Self {
        Self::BlockReceipts(block_hash.into())
    }

    pub fn new_epoch_accumulator(epoch_hash: B256) -> Self {
        Self::EpochAccumulator(EpochAccumulatorKey { epoch_hash })
    }

    pub fn selector(&self) -> u8 {
        match self {
            Self::BlockHeaderWithProof(_) => HISTORY_BLOCK_HEADER_KEY_PREFIX,
            Self::BlockBody(_) => HISTORY_BLOCK_BODY_KEY_PREFIX,
            Self::BlockReceipts(_) => HISTORY_BLOCK_RECEIPTS_KEY_PREFIX,
            Self::EpochAccumulator(_) => HISTORY_EPOCH_ACCUMULATOR_KEY_PREFIX,
        }
    }

    /// The hash carried after the selector.
    pub fn hash(&self) -> B256 {
        match self {
            Self::BlockHeaderWithProof(key) | Self::BlockBody(key) | Self::BlockReceipts(key) => {
                key.block_hash
            }
            Self::EpochAccumulator(key) => key.epoch_hash,
        }
    }

    pub fn from_hex(data: &str) -> Result<Self, ContentKeyError> {
        let bytes = hex_decode(data).map_err(|err| ContentKeyError::InvalidHex(err.to_string()))?;
        Self::try_from(bytes)
    }
}

impl Hash for HistoryContentKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write(&self.to_bytes());
    }
}

impl Serialize for HistoryContentKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HistoryContentKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl From<&HistoryContentKey> for Vec<u8> {
    fn from(val: &HistoryContentKey) -> Self {
        val.to_bytes()
    }
}

impl From<HistoryContentKey> for Vec<u8> {
    fn from(val: HistoryContentKey) -> Self {
        val.to_bytes()
    }
}

impl TryFrom<&[u8]> for HistoryContentKey {
    type Error = ContentKeyError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.len() != HISTORY_CONTENT_KEY_LENGTH {
            return Err(ContentKeyError::InvalidLength {
                received: value.len(),
                expected: HISTORY_CONTENT_KEY_LENGTH,
            });
        }
        let selector = value[0];
        let hash = B256::from_slice(&value[1..]);
        match selector {
            HISTORY_BLOCK_HEADER_KEY_PREFIX => Ok(Self::new_block_header(hash)),
            HISTORY_BLOCK_BODY_KEY_PREFIX => Ok(Self::new_block_body(hash)),
            HISTORY_BLOCK_RECEIPTS_KEY_PREFIX => Ok(Self::new_block_receipts(hash)),
            HISTORY_EPOCH_ACCUMULATOR_KEY_PREFIX => Ok(Self::new_epoch_accumulator(hash)),
            selector => Err(ContentKeyError::UnknownSelector(selector)),
        }
    }
}

impl TryFrom<Vec<u8>> for HistoryContentKey {
    type Error = ContentKeyError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl fmt::Display for HistoryContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hash = hex_encode_compact(self.hash());
        match self {
            Self::BlockHeaderWithProof(_) => {
                write!(f, "BlockHeaderWithProof {{ block_hash: {hash} }}")
            }
            Self::BlockBody(_) => write!(f, "BlockBody {{ block_hash: {hash} }}"),
            Self::BlockReceipts(_) => write!(f, "BlockReceipts {{ block_hash: {hash} }}"),
            Self::EpochAccumulator(_) => write!(f, "EpochAccumulator {{ epoch_hash: {hash} }}"),
        }
    }
}

impl OverlayContentKey for HistoryContentKey {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HISTORY_CONTENT_KEY_LENGTH);
        bytes.push(self.selector());
        bytes.extend_from_slice(self.hash().as_slice());
        bytes
    }
}
