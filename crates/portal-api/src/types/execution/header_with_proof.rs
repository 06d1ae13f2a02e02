use alloy_primitives::B256;
use alloy_rlp::{Decodable, Encodable};
use ssz::{Decode, DecodeError, Encode, SszDecoderBuilder, SszEncoder, BYTES_PER_LENGTH_OFFSET};
use ssz_derive::{Decode, Encode};
use ssz_types::{typenum, FixedVector, VariableList};

use crate::types::execution::header::Header;

/// Upper bound on the RLP encoded header carried in a [HeaderWithProof].
pub type ByteList2048 = VariableList<u8, typenum::U2048>;

/// Number of hashes in a [PreMergeAccumulatorProof].
pub const ACCUMULATOR_PROOF_LENGTH: usize = 15;

/// A block header together with the proof that it belongs to the canonical chain.
///
/// SSZ container `{ header: ByteList[2048], proof: BlockHeaderProof }`, where the header is the
/// RLP encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderWithProof {
    pub header: Header,
    pub proof: BlockHeaderProof,
}

impl Encode for HeaderWithProof {
    fn is_ssz_fixed_len() -> bool {
        false
    }

    fn ssz_append(&self, buf: &mut Vec<u8>) {
        let header = alloy_rlp::encode(&self.header);
        let mut encoder = SszEncoder::container(buf, 2 * BYTES_PER_LENGTH_OFFSET);
        encoder.append(&header);
        encoder.append(&self.proof);
        encoder.finalize();
    }

    fn ssz_bytes_len(&self) -> usize {
        2 * BYTES_PER_LENGTH_OFFSET + self.header.length() + self.proof.ssz_bytes_len()
    }
}

impl Decode for HeaderWithProof {
    fn is_ssz_fixed_len() -> bool {
        false
    }

    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut builder = SszDecoderBuilder::new(bytes);
        builder.register_type::<ByteList2048>()?;
        builder.register_type::<BlockHeaderProof>()?;
        let mut decoder = builder.build()?;

        let header_rlp: ByteList2048 = decoder.decode_next()?;
        let proof = decoder.decode_next()?;
        let header = Header::decode(&mut &header_rlp[..]).map_err(|err| {
            DecodeError::BytesInvalid(format!("Unable to decode bytes into header: {err}"))
        })?;
        Ok(Self { header, proof })
    }
}

/// Tagged union of the ways a header can be anchored to the canonical chain.
///
/// Selector 0 carries no proof, 1 a proof against the pre-merge accumulator and 2 a proof
/// against the beacon chain historical roots. Any other selector fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
#[ssz(enum_behaviour = "union")]
#[allow(clippy::large_enum_variant)]
pub enum BlockHeaderProof {
    None(SszNone),
    PreMergeAccumulatorProof(PreMergeAccumulatorProof),
    HistoricalRootsBlockProof(HistoricalRootsBlockProof),
}

/// Merkle branch from a header's hash up to its epoch root.
///
/// Entry 0 is the header record's total difficulty, entries 1..=13 the siblings inside the epoch
/// tree and entry 14 the list length mixed into the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreMergeAccumulatorProof {
    pub proof: [B256; ACCUMULATOR_PROOF_LENGTH],
}

impl From<[B256; ACCUMULATOR_PROOF_LENGTH]> for PreMergeAccumulatorProof {
    fn from(proof: [B256; ACCUMULATOR_PROOF_LENGTH]) -> Self {
        Self { proof }
    }
}

impl Encode for PreMergeAccumulatorProof {
    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        ACCUMULATOR_PROOF_LENGTH * 32
    }

    fn ssz_append(&self, buf: &mut Vec<u8>) {
        for hash in &self.proof {
            buf.extend_from_slice(hash.as_slice());
        }
    }

    fn ssz_bytes_len(&self) -> usize {
        <Self as Encode>::ssz_fixed_len()
    }
}

impl Decode for PreMergeAccumulatorProof {
    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        ACCUMULATOR_PROOF_LENGTH * 32
    }

    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let expected = <Self as Decode>::ssz_fixed_len();
        if bytes.len() != expected {
            return Err(DecodeError::InvalidByteLength {
                len: bytes.len(),
                expected,
            });
        }
        let mut proof = [B256::ZERO; ACCUMULATOR_PROOF_LENGTH];
        for (hash, chunk) in proof.iter_mut().zip(bytes.chunks_exact(32)) {
            *hash = B256::from_slice(chunk);
        }
        Ok(Self { proof })
    }
}

/// Proof that an execution header root is part of a `BeaconBlock`.
pub type BeaconBlockProof = FixedVector<B256, typenum::U11>;
/// Proof that a `BeaconBlockHeader` root is part of `historical_roots`.
pub type HistoricalRootsProof = FixedVector<B256, typenum::U14>;

/// Chain of proofs anchoring a post-merge header to the beacon chain `historical_roots`.
///
/// Decoded so that the wire format is complete, never verified by this node.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct HistoricalRootsBlockProof {
    pub beacon_block_proof: BeaconBlockProof,
    pub beacon_block_root: B256,
    pub historical_roots_proof: HistoricalRootsProof,
    pub slot: u64,
}

/// Empty union payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SszNone;

impl Decode for SszNone {
    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        0
    }

    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            Ok(Self)
        } else {
            Err(DecodeError::BytesInvalid(
                "Expected None value to be empty, found bytes.".to_string(),
            ))
        }
    }
}

impl Encode for SszNone {
    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        0
    }

    fn ssz_append(&self, _buf: &mut Vec<u8>) {}

    fn ssz_bytes_len(&self) -> usize {
        0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{types::execution::header::test::HEADER_1_RLP, utils::bytes::hex_decode};

    fn mainnet_header_1() -> Header {
        let rlp = hex_decode(HEADER_1_RLP).unwrap();
        Header::decode(&mut rlp.as_slice()).unwrap()
    }

    fn sample_proof() -> PreMergeAccumulatorProof {
        let mut proof = [B256::ZERO; ACCUMULATOR_PROOF_LENGTH];
        for (i, hash) in proof.iter_mut().enumerate() {
            *hash = B256::repeat_byte(i as u8 + 1);
        }
        proof.into()
    }

    #[test]
    fn accumulator_proof_round_trip() {
        let header_with_proof = HeaderWithProof {
            header: mainnet_header_1(),
            proof: BlockHeaderProof::PreMergeAccumulatorProof(sample_proof()),
        };
        let encoded = header_with_proof.as_ssz_bytes();
        assert_eq!(encoded.len(), header_with_proof.ssz_bytes_len());

        // the union selector follows the header bytes
        let header_len = alloy_rlp::encode(&header_with_proof.header).len();
        assert_eq!(encoded[2 * BYTES_PER_LENGTH_OFFSET + header_len], 1);
        assert_eq!(encoded.len(), 8 + header_len + 1 + 15 * 32);

        let decoded = HeaderWithProof::from_ssz_bytes(&encoded).unwrap();
        assert_eq!(decoded, header_with_proof);
    }

    #[test]
    fn none_proof_round_trip() {
        let header_with_proof = HeaderWithProof {
            header: mainnet_header_1(),
            proof: BlockHeaderProof::None(SszNone),
        };
        let encoded = header_with_proof.as_ssz_bytes();
        assert_eq!(*encoded.last().unwrap(), 0);
        assert_eq!(
            HeaderWithProof::from_ssz_bytes(&encoded).unwrap(),
            header_with_proof
        );
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let header_with_proof = HeaderWithProof {
            header: mainnet_header_1(),
            proof: BlockHeaderProof::None(SszNone),
        };
        let mut encoded = header_with_proof.as_ssz_bytes();
        let selector = encoded.len() - 1;
        encoded[selector] = 3;
        assert!(HeaderWithProof::from_ssz_bytes(&encoded).is_err());
    }

    #[test]
    fn truncated_accumulator_proof_is_rejected() {
        let mut encoded = BlockHeaderProof::PreMergeAccumulatorProof(sample_proof()).as_ssz_bytes();
        encoded.pop();
        assert!(BlockHeaderProof::from_ssz_bytes(&encoded).is_err());
    }

    #[test]
    fn invalid_header_rlp_is_rejected() {
        let header_with_proof = HeaderWithProof {
            header: mainnet_header_1(),
            proof: BlockHeaderProof::None(SszNone),
        };
        let mut encoded = header_with_proof.as_ssz_bytes();
        // first byte of the header rlp, right after both offsets
        encoded[2 * BYTES_PER_LENGTH_OFFSET] = 0x80;
        assert!(HeaderWithProof::from_ssz_bytes(&encoded).is_err());
    }
}
