use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{Decodable, Encodable, Header as RlpHeader};
use serde::{Deserialize, Serialize};

/// An execution layer block header.
///
/// Fields introduced by later forks are optional and are encoded only when present, in fork
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub parent_hash: B256,
    pub uncles_hash: B256,
    pub author: Address,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub timestamp: u64,
    pub extra_data: Bytes,
    pub mix_hash: B256,
    pub nonce: B64,
    /// EIP-1559
    pub base_fee_per_gas: Option<U256>,
    /// EIP-4895
    pub withdrawals_root: Option<B256>,
    /// EIP-4844
    pub blob_gas_used: Option<u64>,
    /// EIP-4844
    pub excess_blob_gas: Option<u64>,
    /// EIP-4788
    pub parent_beacon_block_root: Option<B256>,
}

impl Header {
    /// Keccak-256 of the RLP encoding.
    pub fn hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }

    fn encode_fields(&self, out: &mut dyn bytes::BufMut) {
        self.parent_hash.encode(out);
        self.uncles_hash.encode(out);
        self.author.encode(out);
        self.state_root.encode(out);
        self.transactions_root.encode(out);
        self.receipts_root.encode(out);
        self.logs_bloom.encode(out);
        self.difficulty.encode(out);
        self.number.encode(out);
        self.gas_limit.encode(out);
        self.gas_used.encode(out);
        self.timestamp.encode(out);
        self.extra_data.encode(out);
        self.mix_hash.encode(out);
        self.nonce.encode(out);
        if let Some(base_fee) = self.base_fee_per_gas {
            base_fee.encode(out);
        }
        if let Some(root) = self.withdrawals_root {
            root.encode(out);
        }
        if let Some(gas) = self.blob_gas_used {
            gas.encode(out);
        }
        if let Some(gas) = self.excess_blob_gas {
            gas.encode(out);
        }
        if let Some(root) = self.parent_beacon_block_root {
            root.encode(out);
        }
    }
}

impl Encodable for Header {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        let mut payload = Vec::new();
        self.encode_fields(&mut payload);
        RlpHeader {
            list: true,
            payload_length: payload.len(),
        }
        .encode(out);
        out.put_slice(&payload);
    }
}

impl Decodable for Header {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = RlpHeader::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        if buf.len() < rlp_head.payload_length {
            return Err(alloy_rlp::Error::InputTooShort);
        }
        let (mut payload, rest) = buf.split_at(rlp_head.payload_length);

        let mut header = Header {
            parent_hash: Decodable::decode(&mut payload)?,
            uncles_hash: Decodable::decode(&mut payload)?,
            author: Decodable::decode(&mut payload)?,
            state_root: Decodable::decode(&mut payload)?,
            transactions_root: Decodable::decode(&mut payload)?,
            receipts_root: Decodable::decode(&mut payload)?,
            logs_bloom: Decodable::decode(&mut payload)?,
            difficulty: Decodable::decode(&mut payload)?,
            number: Decodable::decode(&mut payload)?,
            gas_limit: Decodable::decode(&mut payload)?,
            gas_used: Decodable::decode(&mut payload)?,
            timestamp: Decodable::decode(&mut payload)?,
            extra_data: Decodable::decode(&mut payload)?,
            mix_hash: Decodable::decode(&mut payload)?,
            nonce: Decodable::decode(&mut payload)?,
            base_fee_per_gas: None,
            withdrawals_root: None,
            blob_gas_used: None,
            excess_blob_gas: None,
            parent_beacon_block_root: None,
        };
        if !payload.is_empty() {
            header.base_fee_per_gas = Some(Decodable::decode(&mut payload)?);
        }
        if !payload.is_empty() {
            header.withdrawals_root = Some(Decodable::decode(&mut payload)?);
        }
        if !payload.is_empty() {
            header.blob_gas_used = Some(Decodable::decode(&mut payload)?);
        }
        if !payload.is_empty() {
            header.excess_blob_gas = Some(Decodable::decode(&mut payload)?);
        }
        if !payload.is_empty() {
            header.parent_beacon_block_root = Some(Decodable::decode(&mut payload)?);
        }
        if !payload.is_empty() {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: rlp_head.payload_length,
                got: rlp_head.payload_length - payload.len(),
            });
        }

        *buf = rest;
        Ok(header)
    }
}
