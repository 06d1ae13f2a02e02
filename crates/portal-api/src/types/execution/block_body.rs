use alloy_primitives::{keccak256, B256};
use anyhow::{bail, ensure};
use ssz::{Decode, DecodeError, Encode};
use ssz_derive::{Decode, Encode};

use crate::types::execution::{header::Header, trie::ordered_trie_root};

// 2 ^ 14
pub const MAX_TRANSACTION_COUNT: usize = 16384;
pub const MAX_WITHDRAWAL_COUNT: usize = 16;

/// A block body as served by the history network.
///
/// Transactions and withdrawals are carried in their canonical encodings and the uncles as the
/// RLP encoded uncle list. Bodies without withdrawals use the legacy container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalBlockBody {
    Legacy(BlockBodyLegacy),
    Shanghai(BlockBodyShanghai),
}

/// SSZ `{ transactions: List[ByteList], uncles: ByteList }`
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BlockBodyLegacy {
    pub txs: Vec<Vec<u8>>,
    pub uncles: Vec<u8>,
}

/// SSZ `{ transactions: List[ByteList], uncles: ByteList, withdrawals: List[ByteList] }`
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BlockBodyShanghai {
    pub txs: Vec<Vec<u8>>,
    pub uncles: Vec<u8>,
    pub withdrawals: Vec<Vec<u8>>,
}

impl PortalBlockBody {
    pub fn transactions(&self) -> &[Vec<u8>] {
        match self {
            Self::Legacy(body) => &body.txs,
            Self::Shanghai(body) => &body.txs,
        }
    }

    pub fn uncles(&self) -> &[u8] {
        match self {
            Self::Legacy(body) => &body.uncles,
            Self::Shanghai(body) => &body.uncles,
        }
    }

    pub fn withdrawals(&self) -> Option<&[Vec<u8>]> {
        match self {
            Self::Legacy(_) => None,
            Self::Shanghai(body) => Some(&body.withdrawals),
        }
    }

    pub fn transactions_root(&self) -> anyhow::Result<B256> {
        ordered_trie_root(self.transactions())
    }

    pub fn uncles_root(&self) -> B256 {
        keccak256(self.uncles())
    }

    pub fn withdrawals_root(&self) -> anyhow::Result<Option<B256>> {
        self.withdrawals().map(ordered_trie_root).transpose()
    }

    /// Checks that every list in the body hashes to the commitment in `header`.
    pub fn validate_against_header(&self, header: &Header) -> anyhow::Result<()> {
        let uncles_root = self.uncles_root();
        ensure!(
            uncles_root == header.uncles_hash,
            "Block body uncles root doesn't match header uncles root. Found: {uncles_root} - Expected: {}",
            header.uncles_hash
        );

        let txs_root = self.transactions_root()?;
        ensure!(
            txs_root == header.transactions_root,
            "Block body transactions root doesn't match header transactions root. Found: {txs_root} - Expected: {}",
            header.transactions_root
        );

        match (self.withdrawals_root()?, header.withdrawals_root) {
            (None, None) => Ok(()),
            (Some(withdrawals_root), Some(expected)) => {
                ensure!(
                    withdrawals_root == expected,
                    "Block body withdrawals root doesn't match header withdrawals root. Found: {withdrawals_root} - Expected: {expected}"
                );
                Ok(())
            }
            (Some(_), None) => bail!("Block body has withdrawals but header has no withdrawals root"),
            (None, Some(_)) => bail!("Header commits to withdrawals but block body has none"),
        }
    }
}

impl Encode for PortalBlockBody {
    fn is_ssz_fixed_len() -> bool {
        false
    }

    fn ssz_append(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Legacy(body) => body.ssz_append(buf),
            Self::Shanghai(body) => body.ssz_append(buf),
        }
    }

    fn ssz_bytes_len(&self) -> usize {
        match self {
            Self::Legacy(body) => body.ssz_bytes_len(),
            Self::Shanghai(body) => body.ssz_bytes_len(),
        }
    }
}

impl Decode for PortalBlockBody {
    fn is_ssz_fixed_len() -> bool {
        false
    }

    /// The Shanghai container is tried first, the legacy one only if that fails.
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let body = match BlockBodyShanghai::from_ssz_bytes(bytes) {
            Ok(body) => {
                if body.withdrawals.len() > MAX_WITHDRAWAL_COUNT {
                    return Err(DecodeError::BytesInvalid(format!(
                        "Block body has {} withdrawals, max is {MAX_WITHDRAWAL_COUNT}",
                        body.withdrawals.len()
                    )));
                }
                Self::Shanghai(body)
            }
            Err(_) => Self::Legacy(BlockBodyLegacy::from_ssz_bytes(bytes)?),
        };
        if body.transactions().len() > MAX_TRANSACTION_COUNT {
            return Err(DecodeError::BytesInvalid(format!(
                "Block body has {} transactions, max is {MAX_TRANSACTION_COUNT}",
                body.transactions().len()
            )));
        }
        Ok(body)
    }
}
