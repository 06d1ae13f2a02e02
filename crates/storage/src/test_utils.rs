use discv5::enr::NodeId;
use tempfile::TempDir;

use crate::{error::ContentStoreError, utils::setup_sql, PortalStorageConfig};

/// Creates temporary directory and PortalStorageConfig.
pub fn create_test_portal_storage_config_with_capacity(
    capacity_mb: u64,
) -> Result<(TempDir, PortalStorageConfig), ContentStoreError> {
    let temp_dir = TempDir::new()?;
    let config =
        PortalStorageConfig::new(capacity_mb, NodeId::random(), temp_dir.path().to_path_buf())?;
    Ok((temp_dir, config))
}

/// Same as [create_test_portal_storage_config_with_capacity], with a capacity given in bytes and
/// a fixed node id, for tests that need eviction to kick in after a handful of entries.
pub fn create_test_portal_storage_config_with_capacity_bytes(
    capacity_bytes: u64,
    node_id: NodeId,
) -> Result<(TempDir, PortalStorageConfig), ContentStoreError> {
    let temp_dir = TempDir::new()?;
    let node_data_dir = temp_dir.path().to_path_buf();
    let config = PortalStorageConfig {
        storage_capacity_bytes: capacity_bytes,
        node_id,
        sql_connection_pool: setup_sql(&node_data_dir)?,
        node_data_dir,
    };
    Ok((temp_dir, config))
}

pub fn generate_random_bytes(length: usize) -> Vec<u8> {
    (0..length).map(|_| rand::random::<u8>()).collect()
}
