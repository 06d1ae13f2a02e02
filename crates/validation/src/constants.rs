use alloy_primitives::{b256, B256};

/// Max number of blocks / epoch = 2 ** 13
pub const EPOCH_SIZE: u64 = 8192;

/// Number of the last pre-merge (terminal PoW) block. Blocks up to and including it are covered
/// by the pre-merge accumulator.
pub const MERGE_BLOCK_NUMBER: u64 = 15_537_393;

/// Number of epochs in the pre-merge accumulator, `ceil((MERGE_BLOCK_NUMBER + 1) / EPOCH_SIZE)`.
pub const PRE_MERGE_EPOCH_COUNT: u64 = (MERGE_BLOCK_NUMBER + 1).div_ceil(EPOCH_SIZE);

/// Depth of the tree built over the records of one epoch.
pub const EPOCH_TREE_DEPTH: usize = 13;

/// The default hash of the pre-merge accumulator at the time of the merge block.
pub const DEFAULT_PRE_MERGE_ACC_HASH: B256 =
    b256!("8eac399e24480dce3cfe06f4bdecba51c6e5d0c46200e3e8611a0b44a3a69ff9");
