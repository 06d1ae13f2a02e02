//! Synthetic pre-merge chains with a matching accumulator.

use std::sync::Arc;

use alloy_primitives::{Address, Bloom, Bytes, B256, B64, U256};
use anyhow::anyhow;
use portal_api::{
    BlockHeaderProof, EpochAccumulator, Header, HeaderWithProof, PreMergeAccumulatorProof,
};

use crate::{
    accumulator::{get_epoch_index, PreMergeAccumulator},
    builder::AccumulatorBuilder,
    header_validator::HeaderValidator,
};

/// A minimal pre-London header. Every block number yields a distinct hash.
pub fn header(number: u64, parent_hash: B256) -> Header {
    Header {
        parent_hash,
        uncles_hash: B256::repeat_byte(0x1d),
        author: Address::ZERO,
        state_root: B256::repeat_byte(0x02),
        transactions_root: B256::repeat_byte(0x03),
        receipts_root: B256::repeat_byte(0x04),
        logs_bloom: Bloom::ZERO,
        difficulty: U256::from(17_179_869_184u64 + number),
        number,
        gas_limit: U256::from(5000),
        gas_used: U256::ZERO,
        timestamp: 1_438_269_973 + number,
        extra_data: Bytes::new(),
        mix_hash: B256::ZERO,
        nonce: B64::ZERO,
        base_fee_per_gas: None,
        withdrawals_root: None,
        blob_gas_used: None,
        excess_blob_gas: None,
        parent_beacon_block_root: None,
    }
}

/// Headers `0..count`, each linked to the previous one.
pub fn chain(count: u64) -> Vec<Header> {
    let mut parent_hash = B256::ZERO;
    (0..count)
        .map(|number| {
            let header = header(number, parent_hash);
            parent_hash = header.hash();
            header
        })
        .collect()
}

/// A chain of headers together with the accumulator built over it.
pub struct ProvenChain {
    pub headers: Vec<Header>,
    pub epochs: Vec<EpochAccumulator>,
    pub accumulator: Arc<PreMergeAccumulator>,
}

impl ProvenChain {
    pub fn new(count: u64) -> anyhow::Result<Self> {
        Self::from_headers(chain(count))
    }

    /// Accumulates `headers`, which must be numbered from genesis without gaps.
    pub fn from_headers(headers: Vec<Header>) -> anyhow::Result<Self> {
        let mut builder = AccumulatorBuilder::new();
        let mut epochs = vec![];
        for header in &headers {
            if let Some(epoch_acc) = builder.update(header)? {
                epochs.push(epoch_acc);
            }
        }
        let (accumulator, last_epoch) = builder.finish()?;
        epochs.extend(last_epoch);
        Ok(Self {
            headers,
            epochs,
            accumulator: Arc::new(accumulator),
        })
    }

    pub fn header_validator(&self) -> HeaderValidator {
        HeaderValidator::new(Arc::clone(&self.accumulator))
    }

    pub fn epoch_accumulator(&self, block_number: u64) -> anyhow::Result<&EpochAccumulator> {
        self.epochs
            .get(get_epoch_index(block_number) as usize)
            .ok_or_else(|| anyhow!("No epoch accumulator for block {block_number}"))
    }

    pub fn accumulator_proof(&self, index: usize) -> anyhow::Result<PreMergeAccumulatorProof> {
        let header = self
            .headers
            .get(index)
            .ok_or_else(|| anyhow!("No header at index {index}"))?;
        PreMergeAccumulator::construct_proof(header, self.epoch_accumulator(header.number)?)
    }

    pub fn header_with_proof(&self, index: usize) -> anyhow::Result<HeaderWithProof> {
        let proof = self.accumulator_proof(index)?;
        Ok(HeaderWithProof {
            header: self.headers[index].clone(),
            proof: BlockHeaderProof::PreMergeAccumulatorProof(proof),
        })
    }
}
