use std::{fmt, path::Path};

use alloy_primitives::B256;
use portal_validation::accumulator::PreMergeAccumulator;
use tree_hash::TreeHash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatorReport {
    pub root: B256,
    pub epoch_count: usize,
    /// Last block number covered by the accumulator.
    pub height: u64,
}

impl fmt::Display for AccumulatorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "root: {} epochs: {} height: {}",
            self.root, self.epoch_count, self.height
        )
    }
}

/// Loads the accumulator at `path`, checking it against `expected_root` when one is given.
pub fn inspect_accumulator(
    path: &Path,
    expected_root: Option<B256>,
) -> anyhow::Result<AccumulatorReport> {
    let accumulator = match expected_root {
        Some(expected_root) => PreMergeAccumulator::try_from_file_with_root(path, expected_root)?,
        None => PreMergeAccumulator::try_from_file(path)?,
    };
    Ok(AccumulatorReport {
        root: accumulator.tree_hash_root(),
        epoch_count: accumulator.historical_epochs.len(),
        height: accumulator.height(),
    })
}
