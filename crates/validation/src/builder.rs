use alloy_primitives::{B256, U256};
use anyhow::{anyhow, bail, ensure};
use portal_api::{EpochAccumulator, Header, HeaderRecord};
use ssz_types::VariableList;
use tracing::debug;
use tree_hash::TreeHash;

use crate::{
    accumulator::PreMergeAccumulator,
    constants::{EPOCH_SIZE, MERGE_BLOCK_NUMBER},
};

/// Folds the pre-merge chain, one header at a time, into a [PreMergeAccumulator].
///
/// Headers must be fed in block number order starting from genesis.
#[derive(Debug, Clone, Default)]
pub struct AccumulatorBuilder {
    historical_epochs: Vec<B256>,
    current_epoch: Vec<HeaderRecord>,
    total_difficulty: U256,
    next_block_number: u64,
}

impl AccumulatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the next header this builder accepts.
    pub fn next_block_number(&self) -> u64 {
        self.next_block_number
    }

    /// Appends `header` to the current epoch.
    ///
    /// Returns the epoch accumulator when `header` completes an epoch.
    pub fn update(&mut self, header: &Header) -> anyhow::Result<Option<EpochAccumulator>> {
        if header.number > MERGE_BLOCK_NUMBER {
            bail!("Unable to accumulate post-merge header: {}", header.number);
        }
        ensure!(
            header.number == self.next_block_number,
            "Headers must be accumulated in order. Found: {} - Expected: {}",
            header.number,
            self.next_block_number
        );

        self.total_difficulty = self
            .total_difficulty
            .checked_add(header.difficulty)
            .ok_or_else(|| anyhow!("Total difficulty overflow at block {}", header.number))?;
        self.current_epoch.push(HeaderRecord {
            block_hash: header.hash(),
            total_difficulty: self.total_difficulty,
        });
        self.next_block_number += 1;

        if self.current_epoch.len() as u64 == EPOCH_SIZE {
            let records = std::mem::take(&mut self.current_epoch);
            return self.commit_epoch(records).map(Some);
        }
        Ok(None)
    }

    /// Pads the last epoch with empty records, commits it, and returns the accumulator along
    /// with that last epoch, if any header was left in it.
    pub fn finish(mut self) -> anyhow::Result<(PreMergeAccumulator, Option<EpochAccumulator>)> {
        let last_epoch = if self.current_epoch.is_empty() {
            None
        } else {
            let mut records = std::mem::take(&mut self.current_epoch);
            records.resize(EPOCH_SIZE as usize, HeaderRecord::default());
            Some(self.commit_epoch(records)?)
        };
        let historical_epochs = VariableList::new(self.historical_epochs)
            .map_err(|err| anyhow!("Too many epochs for the accumulator: {err:?}"))?;
        Ok((PreMergeAccumulator { historical_epochs }, last_epoch))
    }

    fn commit_epoch(&mut self, records: Vec<HeaderRecord>) -> anyhow::Result<EpochAccumulator> {
        let epoch_acc = EpochAccumulator::new(records)
            .map_err(|err| anyhow!("Unable to create epoch accumulator: {err:?}"))?;
        let epoch_root = epoch_acc.tree_hash_root();
        debug!(
            epoch.index = self.historical_epochs.len(),
            epoch.root = %epoch_root,
            "Committed epoch accumulator"
        );
        self.historical_epochs.push(epoch_root);
        Ok(epoch_acc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::{
        accumulator::get_epoch_index,
        test_utils::{chain, header},
    };

    #[test]
    fn partial_epoch_is_padded() {
        let headers = chain(10);
        let mut builder = AccumulatorBuilder::new();
        for header in &headers {
            assert!(builder.update(header).unwrap().is_none());
        }
        let (accumulator, last_epoch) = builder.finish().unwrap();
        let last_epoch = last_epoch.unwrap();

        assert_eq!(last_epoch.len(), EPOCH_SIZE as usize);
        assert_eq!(last_epoch[9].block_hash, headers[9].hash());
        assert_eq!(last_epoch[10], HeaderRecord::default());
        assert_eq!(accumulator.historical_epochs.len(), 1);
        assert_eq!(
            accumulator.historical_epochs[0],
            last_epoch.tree_hash_root()
        );
    }

    #[test]
    fn total_difficulty_accumulates() {
        let headers = chain(3);
        let mut builder = AccumulatorBuilder::new();
        for header in &headers {
            builder.update(header).unwrap();
        }
        let (_, last_epoch) = builder.finish().unwrap();
        let last_epoch = last_epoch.unwrap();
        let expected = headers
            .iter()
            .fold(U256::ZERO, |total, header| total + header.difficulty);
        assert_eq!(last_epoch[2].total_difficulty, expected);
        assert!(last_epoch[0].total_difficulty < last_epoch[1].total_difficulty);
    }

    #[test_log::test]
    fn full_epoch_rolls_over() {
        let headers = chain(EPOCH_SIZE + 2);
        let mut builder = AccumulatorBuilder::new();
        let mut committed = vec![];
        for header in &headers {
            if let Some(epoch_acc) = builder.update(header).unwrap() {
                committed.push((header.number, epoch_acc));
            }
        }
        assert_eq!(committed.len(), 1);
        let (number, first_epoch) = &committed[0];
        assert_eq!(*number, EPOCH_SIZE - 1);
        assert_eq!(first_epoch.len(), EPOCH_SIZE as usize);

        let (accumulator, last_epoch) = builder.finish().unwrap();
        assert_eq!(accumulator.historical_epochs.len(), 2);
        assert_eq!(
            accumulator.epoch_root(0),
            Some(first_epoch.tree_hash_root())
        );
        let last_epoch = last_epoch.unwrap();
        assert_eq!(last_epoch.len(), EPOCH_SIZE as usize);
        assert_eq!(get_epoch_index(headers[8193].number), 1);
        assert_eq!(last_epoch[1].block_hash, headers[8193].hash());
    }

    #[test]
    fn empty_builder_has_no_epochs() {
        let (accumulator, last_epoch) = AccumulatorBuilder::new().finish().unwrap();
        assert!(accumulator.historical_epochs.is_empty());
        assert!(last_epoch.is_none());
    }

    #[test]
    fn out_of_order_header_is_rejected() {
        let headers = chain(3);
        let mut builder = AccumulatorBuilder::new();
        builder.update(&headers[0]).unwrap();
        let err = builder.update(&headers[2]).unwrap_err();
        assert!(err.to_string().contains("in order"));
        assert_eq!(builder.next_block_number(), 1);
    }

    #[test]
    fn terminal_pow_block_is_accumulated() {
        let mut builder = AccumulatorBuilder {
            next_block_number: MERGE_BLOCK_NUMBER,
            ..Default::default()
        };
        builder
            .update(&header(MERGE_BLOCK_NUMBER, B256::ZERO))
            .unwrap();
        assert_eq!(builder.next_block_number(), MERGE_BLOCK_NUMBER + 1);

        let err = builder
            .update(&header(MERGE_BLOCK_NUMBER + 1, B256::ZERO))
            .unwrap_err();
        assert!(err.to_string().contains("post-merge"));
    }
}
