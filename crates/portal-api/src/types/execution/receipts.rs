use std::ops::Deref;

use alloy_primitives::B256;
use anyhow::ensure;
use ssz::{Decode, DecodeError, Encode};

use crate::types::execution::{
    block_body::MAX_TRANSACTION_COUNT, header::Header, trie::ordered_trie_root,
};

/// The receipts of a block, each in its canonical (possibly typed) encoding.
///
/// SSZ `List[ByteList, MAX_TRANSACTION_COUNT]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalReceipts(pub Vec<Vec<u8>>);

impl PortalReceipts {
    pub fn root(&self) -> anyhow::Result<B256> {
        ordered_trie_root(&self.0)
    }

    pub fn validate_against_header(&self, header: &Header) -> anyhow::Result<()> {
        let receipts_root = self.root()?;
        ensure!(
            receipts_root == header.receipts_root,
            "Receipts root doesn't match header receipts root. Found: {receipts_root} - Expected: {}",
            header.receipts_root
        );
        Ok(())
    }
}

impl Deref for PortalReceipts {
    type Target = Vec<Vec<u8>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Encode for PortalReceipts {
    fn is_ssz_fixed_len() -> bool {
        false
    }

    fn ssz_append(&self, buf: &mut Vec<u8>) {
        self.0.ssz_append(buf)
    }

    fn ssz_bytes_len(&self) -> usize {
        self.0.ssz_bytes_len()
    }
}

impl Decode for PortalReceipts {
    fn is_ssz_fixed_len() -> bool {
        false
    }

    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let receipts = Vec::<Vec<u8>>::from_ssz_bytes(bytes)?;
        if receipts.len() > MAX_TRANSACTION_COUNT {
            return Err(DecodeError::BytesInvalid(format!(
                "Found {} receipts, max is {MAX_TRANSACTION_COUNT}",
                receipts.len()
            )));
        }
        Ok(Self(receipts))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloy_rlp::Decodable;

    use super::*;
    use crate::{types::execution::header::test::HEADER_1_RLP, utils::bytes::hex_decode};

    fn mainnet_header_1() -> Header {
        let rlp = hex_decode(HEADER_1_RLP).unwrap();
        Header::decode(&mut rlp.as_slice()).unwrap()
    }

    #[test]
    fn no_receipts_match_empty_block() {
        PortalReceipts::default()
            .validate_against_header(&mainnet_header_1())
            .unwrap();
    }

    #[test]
    fn receipts_root_mismatch() {
        let receipts = PortalReceipts(vec![vec![0xc3, 0x01, 0x02, 0x03]]);
        let mut header = mainnet_header_1();
        header.receipts_root = receipts.root().unwrap();
        receipts.validate_against_header(&header).unwrap();

        let tampered = PortalReceipts(vec![vec![0xc3, 0x01, 0x02, 0x04]]);
        let err = tampered.validate_against_header(&header).unwrap_err();
        assert!(err.to_string().contains("Receipts root doesn't match"));
    }

    #[test]
    fn ssz_round_trip() {
        let receipts = PortalReceipts(vec![vec![0xc0], vec![0x02, 0xc1, 0x05]]);
        let decoded = PortalReceipts::from_ssz_bytes(&receipts.as_ssz_bytes()).unwrap();
        assert_eq!(decoded, receipts);
    }
}
