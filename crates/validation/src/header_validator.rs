use std::sync::Arc;

use anyhow::{anyhow, bail};
use portal_api::{BlockHeaderProof, Header, HeaderWithProof, PreMergeAccumulatorProof};

use crate::{
    accumulator::{get_epoch_index, get_header_record_index, PreMergeAccumulator},
    constants::{EPOCH_SIZE, MERGE_BLOCK_NUMBER},
    merkle::verify_merkle_proof,
};

/// HeaderValidator is responsible for validating headers against the proofs they are served with.
#[derive(Debug, Clone)]
pub struct HeaderValidator {
    /// Pre-merge accumulator used to validate pre-merge headers.
    pub pre_merge_acc: Arc<PreMergeAccumulator>,
}

impl HeaderValidator {
    pub fn new(pre_merge_acc: Arc<PreMergeAccumulator>) -> Self {
        Self { pre_merge_acc }
    }

    pub fn validate_header_with_proof(
        &self,
        header_with_proof: &HeaderWithProof,
    ) -> anyhow::Result<()> {
        let HeaderWithProof { header, proof } = header_with_proof;
        match proof {
            BlockHeaderProof::PreMergeAccumulatorProof(proof) => {
                if !self.verify_accumulator_proof(header, proof)? {
                    bail!("Execution block proof verification failed for pre-Merge header");
                }
                Ok(())
            }
            BlockHeaderProof::None(_) => {
                if header.number <= MERGE_BLOCK_NUMBER {
                    bail!("Missing accumulator proof for pre-merge header.");
                }
                Ok(())
            }
            BlockHeaderProof::HistoricalRootsBlockProof(_) => Err(anyhow!(
                "HistoricalRootsBlockProof header validation is not supported."
            )),
        }
    }

    /// Checks `proof` against the epoch root committed for `header`.
    ///
    /// Returns `Ok(false)` for a proof that does not verify. Errors are reserved for headers this
    /// accumulator cannot vouch for at all.
    pub fn verify_accumulator_proof(
        &self,
        header: &Header,
        proof: &PreMergeAccumulatorProof,
    ) -> anyhow::Result<bool> {
        if header.number > MERGE_BLOCK_NUMBER {
            bail!("Invalid proof type found for post-merge header.");
        }

        // Calculate generalized index for header
        // https://github.com/ethereum/consensus-specs/blob/v0.11.1/ssz/merkle-proofs.md#generalized-merkle-tree-index
        let header_index = get_header_record_index(header.number);
        let gen_index = (EPOCH_SIZE * 2 * 2) + (header_index * 2);

        let epoch_hash = self.pre_merge_acc.epoch_root(header.number).ok_or_else(|| {
            anyhow!(
                "Pre-merge accumulator has no epoch {}",
                get_epoch_index(header.number)
            )
        })?;

        Ok(verify_merkle_proof(
            header.hash(),
            &proof.proof,
            15,
            gen_index as usize,
            epoch_hash,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use alloy_primitives::{B256, U256};
    use portal_api::{types::execution::header_with_proof::SszNone, EpochAccumulator, HeaderRecord};
    use rstest::rstest;
    use ssz_types::VariableList;
    use tree_hash::TreeHash;

    use super::*;
    use crate::{
        constants::PRE_MERGE_EPOCH_COUNT,
        test_utils::{header, ProvenChain},
    };

    #[test]
    fn constructed_proofs_verify() {
        let proven = ProvenChain::new(EPOCH_SIZE + 5).unwrap();
        for index in [0, 1, 2, 4095, 8190, 8191, 8192, 8193, 8196] {
            proven
                .header_validator()
                .validate_header_with_proof(&proven.header_with_proof(index).unwrap())
                .unwrap();
        }
    }

    #[rstest]
    #[case::swapped_hashes(0, 1)]
    #[case::swapped_siblings(3, 7)]
    #[case::swapped_length(13, 14)]
    fn tampered_proof_is_invalid(#[case] first: usize, #[case] second: usize) {
        let proven = ProvenChain::new(16).unwrap();
        let header = &proven.headers[5];
        let proof = proven.accumulator_proof(5).unwrap();
        let mut tampered = proof;
        tampered.proof.swap(first, second);

        let validator = proven.header_validator();
        assert!(validator.verify_accumulator_proof(header, &proof).unwrap());
        assert!(!validator.verify_accumulator_proof(header, &tampered).unwrap());
    }

    #[test]
    #[should_panic = "Execution block proof verification failed for pre-Merge header"]
    fn proof_for_another_header_is_rejected() {
        let proven = ProvenChain::new(16).unwrap();
        let header_with_proof = HeaderWithProof {
            header: proven.headers[3].clone(),
            proof: proven.header_with_proof(4).unwrap().proof,
        };
        proven
            .header_validator()
            .validate_header_with_proof(&header_with_proof)
            .unwrap();
    }

    #[test]
    #[should_panic = "Invalid proof type found for post-merge header."]
    fn post_merge_header_with_accumulator_proof_is_rejected() {
        let proven = ProvenChain::new(1).unwrap();
        let header_with_proof = HeaderWithProof {
            header: header(MERGE_BLOCK_NUMBER + 1, B256::ZERO),
            proof: BlockHeaderProof::PreMergeAccumulatorProof(PreMergeAccumulatorProof::from(
                [B256::ZERO; 15],
            )),
        };
        proven
            .header_validator()
            .validate_header_with_proof(&header_with_proof)
            .unwrap();
    }

    #[test]
    fn none_proof_only_for_post_merge_headers() {
        let proven = ProvenChain::new(1).unwrap();
        let validator = proven.header_validator();
        let pre_merge = HeaderWithProof {
            header: proven.headers[0].clone(),
            proof: BlockHeaderProof::None(SszNone),
        };
        let err = validator.validate_header_with_proof(&pre_merge).unwrap_err();
        assert!(err.to_string().contains("Missing accumulator proof"));

        let post_merge = HeaderWithProof {
            header: header(MERGE_BLOCK_NUMBER + 1, B256::ZERO),
            proof: BlockHeaderProof::None(SszNone),
        };
        validator.validate_header_with_proof(&post_merge).unwrap();
    }

    #[test]
    fn unknown_epoch_is_an_error() {
        let proven = ProvenChain::new(1).unwrap();
        let header = header(EPOCH_SIZE * 3, B256::ZERO);
        let proof = proven.accumulator_proof(0).unwrap();
        assert!(proven
            .header_validator()
            .verify_accumulator_proof(&header, &proof)
            .is_err());
    }

    #[test]
    fn terminal_pow_block_needs_accumulator_proof() {
        let terminal = header(MERGE_BLOCK_NUMBER, B256::ZERO);
        let mut records = vec![HeaderRecord::default(); EPOCH_SIZE as usize];
        records[get_header_record_index(MERGE_BLOCK_NUMBER) as usize] = HeaderRecord {
            block_hash: terminal.hash(),
            total_difficulty: U256::from(58_750_003_716_598_352_816_469u128),
        };
        let epoch_acc = EpochAccumulator::new(records).unwrap();
        let mut historical_epochs = vec![B256::ZERO; PRE_MERGE_EPOCH_COUNT as usize];
        historical_epochs[get_epoch_index(MERGE_BLOCK_NUMBER) as usize] =
            epoch_acc.tree_hash_root();
        let accumulator = PreMergeAccumulator {
            historical_epochs: VariableList::new(historical_epochs).unwrap(),
        };
        assert_eq!(accumulator.height(), MERGE_BLOCK_NUMBER);
        let validator = HeaderValidator::new(Arc::new(accumulator));

        let proof = PreMergeAccumulator::construct_proof(&terminal, &epoch_acc).unwrap();
        validator
            .validate_header_with_proof(&HeaderWithProof {
                header: terminal.clone(),
                proof: BlockHeaderProof::PreMergeAccumulatorProof(proof),
            })
            .unwrap();

        let err = validator
            .validate_header_with_proof(&HeaderWithProof {
                header: terminal,
                proof: BlockHeaderProof::None(SszNone),
            })
            .unwrap_err();
        assert!(err.to_string().contains("Missing accumulator proof"));
    }
}
