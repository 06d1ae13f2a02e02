#![warn(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod sql;
pub mod store;
pub mod test_utils;
pub mod utils;

use std::ops::Deref;

use alloy_primitives::B256;
pub use config::{PortalStorageConfig, BYTES_IN_MB_U64};
pub use error::ContentStoreError;
use rusqlite::types::{FromSql, FromSqlError, ValueRef};
pub use store::{ContentStorage, FarthestQueryResult, UsageStats};

pub const DATABASE_NAME: &str = "portal.sqlite";

/// Identifier under which content is stored: the digest of its content key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentId(B256);

impl<T: Into<B256>> From<T> for ContentId {
    fn from(value: T) -> Self {
        Self(value.into())
    }
}

/// Keys are always written as 32 byte blobs.
impl FromSql for ContentId {
    fn column_result(value: ValueRef<'_>) -> Result<Self, FromSqlError> {
        let bytes = value.as_blob()?;
        if bytes.len() != B256::len_bytes() {
            return Err(FromSqlError::InvalidBlobSize {
                expected_size: B256::len_bytes(),
                blob_size: bytes.len(),
            });
        }
        Ok(ContentId(B256::from_slice(bytes)))
    }
}

impl Deref for ContentId {
    type Target = B256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
