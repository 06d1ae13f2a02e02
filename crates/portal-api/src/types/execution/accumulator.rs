use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, VariableList};
use tree_hash_derive::TreeHash;

/// SSZ `List[HeaderRecord, max_length = EPOCH_SIZE]`: the records of one epoch in block order.
pub type EpochAccumulator = VariableList<HeaderRecord, typenum::U8192>;

/// Commitment to a single pre-merge header.
///
/// The total difficulty is the cumulative chain difficulty up to and including the block. Both
/// fields are 32 bytes, so an encoded record is always 64 bytes.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Decode, Encode, Deserialize, Serialize, TreeHash,
)]
pub struct HeaderRecord {
    pub block_hash: B256,
    pub total_difficulty: U256,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use ssz::{Decode, Encode};
    use tree_hash::TreeHash;

    use super::*;

    #[test]
    fn header_record_is_64_bytes() {
        let record = HeaderRecord {
            block_hash: B256::repeat_byte(0xaa),
            total_difficulty: U256::from(17_179_869_184u64),
        };
        let encoded = record.as_ssz_bytes();
        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[..32], record.block_hash.as_slice());
        // uint256 is little-endian on the wire
        assert_eq!(&encoded[32..], &record.total_difficulty.to_le_bytes::<32>());
        assert_eq!(HeaderRecord::from_ssz_bytes(&encoded).unwrap(), record);
    }

    #[test]
    fn epoch_accumulator_root_commits_to_length() {
        let record = HeaderRecord {
            block_hash: B256::repeat_byte(1),
            total_difficulty: U256::from(1),
        };
        let one = EpochAccumulator::new(vec![record]).unwrap();
        let two = EpochAccumulator::new(vec![record, HeaderRecord::default()]).unwrap();
        // a zero record hashes like padding, only the length mixin tells them apart
        assert_ne!(one.tree_hash_root(), two.tree_hash_root());
    }
}
