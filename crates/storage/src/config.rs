use std::path::PathBuf;

use discv5::enr::NodeId;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::{error::ContentStoreError, utils::setup_sql};

pub const BYTES_IN_MB_U64: u64 = 1000 * 1000;

/// Everything a `ContentStorage` needs to open its table.
#[derive(Clone)]
pub struct PortalStorageConfig {
    /// Budget for the sum of stored key and value lengths.
    pub storage_capacity_bytes: u64,
    pub node_id: NodeId,
    pub node_data_dir: PathBuf,
    pub sql_connection_pool: Pool<SqliteConnectionManager>,
}

impl PortalStorageConfig {
    pub fn new(
        storage_capacity_mb: u64,
        node_id: NodeId,
        node_data_dir: PathBuf,
    ) -> Result<Self, ContentStoreError> {
        let sql_connection_pool = setup_sql(&node_data_dir)?;
        Ok(Self {
            storage_capacity_bytes: storage_capacity_mb * BYTES_IN_MB_U64,
            node_id,
            node_data_dir,
            sql_connection_pool,
        })
    }
}
