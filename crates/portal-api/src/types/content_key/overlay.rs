use std::fmt;

use sha2::{Digest, Sha256};

use crate::utils::bytes::hex_encode;

/// Keys used to look up content in an overlay network.
pub trait OverlayContentKey:
    Into<Vec<u8>> + TryFrom<Vec<u8>> + Clone + fmt::Debug + fmt::Display + Send + Sync
{
    /// Wire encoding of the key.
    fn to_bytes(&self) -> Vec<u8>;

    /// Location of the content in the overlay keyspace: `sha256(key_bytes)`.
    fn content_id(&self) -> [u8; 32] {
        Sha256::digest(self.to_bytes()).into()
    }

    fn to_hex(&self) -> String {
        hex_encode(self.to_bytes())
    }
}
