use alloy_primitives::B256;
use anyhow::{anyhow, ensure};
use portal_api::{EpochAccumulator, Header, HeaderWithProof, PortalBlockBody, PortalReceipts};
use portal_validation::header_validator::HeaderValidator;
use ssz::Decode;
use tree_hash::TreeHash;

/// Checks history content against the block hash or epoch root it was requested under.
///
/// Bodies and receipts are checked against a header the caller already trusts. Resolving that
/// header is left to [crate::network::HistoryNetwork].
#[derive(Debug, Clone)]
pub struct ChainHistoryValidator {
    pub header_validator: HeaderValidator,
}

impl ChainHistoryValidator {
    pub fn new(header_validator: HeaderValidator) -> Self {
        Self { header_validator }
    }

    pub fn validate_header(
        &self,
        block_hash: B256,
        content: &[u8],
    ) -> anyhow::Result<HeaderWithProof> {
        let header_with_proof = HeaderWithProof::from_ssz_bytes(content)
            .map_err(|err| anyhow!("Header with proof content has invalid encoding: {err:?}"))?;
        let header_hash = header_with_proof.header.hash();
        ensure!(
            header_hash == block_hash,
            "Content validation failed: Invalid header hash. Found: {header_hash} - Expected: {block_hash}"
        );
        self.header_validator
            .validate_header_with_proof(&header_with_proof)?;
        Ok(header_with_proof)
    }

    pub fn validate_block_body(
        &self,
        content: &[u8],
        trusted_header: &Header,
    ) -> anyhow::Result<PortalBlockBody> {
        let block_body = PortalBlockBody::from_ssz_bytes(content)
            .map_err(|err| anyhow!("Block body content has invalid encoding: {err:?}"))?;
        block_body.validate_against_header(trusted_header)?;
        Ok(block_body)
    }

    pub fn validate_receipts(
        &self,
        content: &[u8],
        trusted_header: &Header,
    ) -> anyhow::Result<PortalReceipts> {
        let receipts = PortalReceipts::from_ssz_bytes(content)
            .map_err(|err| anyhow!("Receipts content has invalid encoding: {err:?}"))?;
        receipts.validate_against_header(trusted_header)?;
        Ok(receipts)
    }

    /// The epoch accumulator must hash to `epoch_hash`, and `epoch_hash` must be one of the
    /// epochs committed to by the pre-merge accumulator.
    pub fn validate_epoch_accumulator(
        &self,
        epoch_hash: B256,
        content: &[u8],
    ) -> anyhow::Result<EpochAccumulator> {
        let epoch_acc = EpochAccumulator::from_ssz_bytes(content)
            .map_err(|err| anyhow!("Epoch accumulator content has invalid encoding: {err:?}"))?;
        let epoch_root = epoch_acc.tree_hash_root();
        ensure!(
            epoch_root == epoch_hash,
            "Content validation failed: Epoch accumulator root mismatch. Found: {epoch_root} - Expected: {epoch_hash}"
        );
        ensure!(
            self.header_validator
                .pre_merge_acc
                .contains_epoch_root(&epoch_root),
            "Content validation failed: Epoch accumulator {epoch_root} is not part of the pre-merge accumulator"
        );
        Ok(epoch_acc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use portal_api::types::execution::block_body::BlockBodyLegacy;
    use portal_validation::test_utils::{chain, ProvenChain};
    use rstest::rstest;
    use ssz::Encode;

    use super::*;

    fn validator(proven: &ProvenChain) -> ChainHistoryValidator {
        ChainHistoryValidator::new(proven.header_validator())
    }

    #[test]
    fn valid_header() {
        let proven = ProvenChain::new(8).unwrap();
        let header_with_proof = proven.header_with_proof(6).unwrap();
        let validated = validator(&proven)
            .validate_header(proven.headers[6].hash(), &header_with_proof.as_ssz_bytes())
            .unwrap();
        assert_eq!(validated, header_with_proof);
    }

    #[test]
    #[should_panic = "Invalid header hash"]
    fn header_under_wrong_hash() {
        let proven = ProvenChain::new(8).unwrap();
        let content = proven.header_with_proof(6).unwrap().as_ssz_bytes();
        validator(&proven)
            .validate_header(proven.headers[5].hash(), &content)
            .unwrap();
    }

    #[test]
    #[should_panic = "invalid encoding"]
    fn undecodable_header() {
        let proven = ProvenChain::new(8).unwrap();
        validator(&proven)
            .validate_header(proven.headers[5].hash(), &[0x01, 0x02, 0x03])
            .unwrap();
    }

    #[test]
    fn body_and_receipts_against_header() {
        let body = PortalBlockBody::Legacy(BlockBodyLegacy {
            txs: vec![vec![0xc0], vec![0xc1, 0x80]],
            uncles: vec![0xc0],
        });
        let receipts = PortalReceipts(vec![vec![0xc2, 0x80, 0x80]]);
        let mut header = chain(1).remove(0);
        header.transactions_root = body.transactions_root().unwrap();
        header.uncles_hash = body.uncles_root();
        header.receipts_root = receipts.root().unwrap();

        let proven = ProvenChain::from_headers(vec![header.clone()]).unwrap();
        let validator = validator(&proven);
        assert_eq!(
            validator
                .validate_block_body(&body.as_ssz_bytes(), &header)
                .unwrap(),
            body
        );
        assert_eq!(
            validator
                .validate_receipts(&receipts.as_ssz_bytes(), &header)
                .unwrap(),
            receipts
        );

        let other_receipts = PortalReceipts(vec![vec![0xc0]]);
        let err = validator
            .validate_receipts(&other_receipts.as_ssz_bytes(), &header)
            .unwrap_err();
        assert!(err.to_string().contains("Receipts root doesn't match"));
    }

    #[test]
    fn valid_epoch_accumulator() {
        let proven = ProvenChain::new(4).unwrap();
        let epoch_acc = &proven.epochs[0];
        let validated = validator(&proven)
            .validate_epoch_accumulator(epoch_acc.tree_hash_root(), &epoch_acc.as_ssz_bytes())
            .unwrap();
        assert_eq!(&validated, epoch_acc);
    }

    #[rstest]
    #[case::first_record(0)]
    #[case::total_difficulty(40)]
    #[case::last_record(8192 * 64 - 1)]
    fn tampered_epoch_accumulator(#[case] byte: usize) {
        let proven = ProvenChain::new(4).unwrap();
        let epoch_acc = &proven.epochs[0];
        let mut content = epoch_acc.as_ssz_bytes();
        content[byte] ^= 0xff;

        let err = validator(&proven)
            .validate_epoch_accumulator(epoch_acc.tree_hash_root(), &content)
            .unwrap_err();
        assert!(err.to_string().contains("root mismatch"));
    }

    #[test]
    fn epoch_accumulator_outside_pre_merge_accumulator() {
        let proven = ProvenChain::new(4).unwrap();
        let other = ProvenChain::new(5).unwrap();
        let epoch_acc = &other.epochs[0];

        let err = validator(&proven)
            .validate_epoch_accumulator(epoch_acc.tree_hash_root(), &epoch_acc.as_ssz_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("not part of the pre-merge accumulator"));
    }
}
