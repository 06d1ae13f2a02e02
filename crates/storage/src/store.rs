use std::fmt;

use alloy_primitives::U256;
use discv5::enr::NodeId;
use parking_lot::RwLock;
use portal_api::{Distance, Metric, XorMetric};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::debug;

use crate::{error::ContentStoreError, sql, ContentId, PortalStorageConfig};

/// Share of the used capacity freed by one eviction pass, as a divisor (5%).
const EVICTION_DIVISOR: u64 = 20;

/// Number and total size of the stored entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsageStats {
    pub entry_count: u64,
    /// Sum of key and value lengths.
    pub total_entry_size_bytes: u64,
}

impl fmt::Display for UsageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entries: {} size: {}B",
            self.entry_count, self.total_entry_size_bytes
        )
    }
}

/// The result of looking for the farthest content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FarthestQueryResult {
    pub content_id: ContentId,
    pub distance: Distance,
}

/// Content id to value store that keeps its size under a byte budget.
///
/// When a write pushes usage over capacity, the content farthest from the local node id is
/// evicted and the radius shrinks to the farthest content still stored. The radius only ever
/// shrinks while the store is open.
pub struct ContentStorage {
    config: PortalStorageConfig,
    /// Largest distance from the node id of content this store accepts.
    radius: RwLock<Distance>,
}

impl ContentStorage {
    /// Opens the store and sets the radius to the farthest stored content, or to
    /// [Distance::MAX] when there is none.
    pub fn new(config: PortalStorageConfig) -> Result<Self, ContentStoreError> {
        config
            .sql_connection_pool
            .get()?
            .execute_batch(sql::CREATE_QUERY_DB)?;
        let storage = Self {
            config,
            radius: RwLock::new(Distance::MAX),
        };

        let radius = match storage.lookup_farthest()? {
            Some(farthest) => farthest.distance,
            None => Distance::MAX,
        };
        debug!(radius = %radius, "Initialized content storage radius");
        *storage.radius.write() = radius;
        Ok(storage)
    }

    pub fn node_id(&self) -> NodeId {
        self.config.node_id
    }

    pub fn storage_capacity_bytes(&self) -> u64 {
        self.config.storage_capacity_bytes
    }

    /// Returns radius that it will accept to store.
    pub fn radius(&self) -> Distance {
        *self.radius.read()
    }

    /// Returns distance to the content id.
    pub fn distance_to_content_id(&self, content_id: &ContentId) -> Distance {
        XorMetric::distance(&self.config.node_id.raw(), &content_id.0)
    }

    /// Returns whether the content id falls within the current radius.
    pub fn in_range(&self, content_id: &ContentId) -> bool {
        self.distance_to_content_id(content_id) <= self.radius()
    }

    pub fn get(&self, content_id: &ContentId) -> Result<Option<Vec<u8>>, ContentStoreError> {
        let value = self
            .config
            .sql_connection_pool
            .get()?
            .query_row(
                sql::CONTENT_VALUE_LOOKUP_QUERY,
                [content_id.to_vec()],
                |row| row.get::<_, Vec<u8>>("value"),
            )
            .optional()?;
        Ok(value)
    }

    /// Returns whether data associated with the content id is already stored.
    pub fn has_content(&self, content_id: &ContentId) -> Result<bool, ContentStoreError> {
        let has_content = self
            .config
            .sql_connection_pool
            .get()?
            .prepare(sql::CONTENT_KEY_LOOKUP_QUERY)?
            .exists([content_id.to_vec()])?;
        Ok(has_content)
    }

    /// Returns whether the content id is within radius and not stored yet.
    pub fn is_key_within_radius_and_unavailable(
        &self,
        content_id: &ContentId,
    ) -> Result<bool, ContentStoreError> {
        Ok(self.in_range(content_id) && !self.has_content(content_id)?)
    }

    /// Stores `value` under `content_id`, replacing any previous value, then evicts if the store
    /// went over capacity.
    pub fn put(&self, content_id: &ContentId, value: &[u8]) -> Result<(), ContentStoreError> {
        self.config
            .sql_connection_pool
            .get()?
            .execute(sql::INSERT_QUERY, params![content_id.to_vec(), value])?;
        self.evict_if_over_capacity()
    }

    pub fn delete(&self, content_id: &ContentId) -> Result<(), ContentStoreError> {
        let deleted = self
            .config
            .sql_connection_pool
            .get()?
            .execute(sql::DELETE_QUERY, [content_id.to_vec()])?;
        if deleted == 0 {
            debug!(content.id = %content_id.0, "Didn't delete missing content");
        }
        Ok(())
    }

    pub fn usage_stats(&self) -> Result<UsageStats, ContentStoreError> {
        let conn = self.config.sql_connection_pool.get()?;
        Self::query_usage_stats(&conn)
    }

    /// Sum of key and value lengths of everything stored.
    pub fn used_size(&self) -> Result<u64, ContentStoreError> {
        Ok(self.usage_stats()?.total_entry_size_bytes)
    }

    /// Returns the content farthest from the node id.
    pub fn lookup_farthest(&self) -> Result<Option<FarthestQueryResult>, ContentStoreError> {
        let conn = self.config.sql_connection_pool.get()?;
        self.query_farthest(&conn)
    }

    /// Scales `current_radius` down by how many times over capacity the store is.
    ///
    /// Storage is left untouched. The ratio is an integer division, so the radius is only scaled
    /// once usage reaches twice the capacity.
    pub fn estimate_new_radius(
        &self,
        current_radius: Distance,
    ) -> Result<Distance, ContentStoreError> {
        let capacity = self.config.storage_capacity_bytes;
        if capacity == 0 {
            return Ok(Distance::ZERO);
        }
        let size_ratio = self.used_size()? / capacity;
        if size_ratio > 0 {
            Ok(Distance::from(*current_radius / U256::from(size_ratio)))
        } else {
            Ok(current_radius)
        }
    }

    /// Deletes all content farther than `radius` and shrinks the store radius to it.
    ///
    /// Returns the number of deleted entries.
    pub fn force_prune(&self, radius: Distance) -> Result<usize, ContentStoreError> {
        let deleted = self.config.sql_connection_pool.get()?.execute(
            sql::DELETE_OUT_OF_RADIUS_QUERY,
            params![
                self.config.node_id.raw().to_vec(),
                radius.big_endian().to_vec()
            ],
        )?;
        let mut current = self.radius.write();
        if radius < *current {
            *current = radius;
        }
        debug!(radius = %radius, deleted, "Force pruned content storage");
        Ok(deleted)
    }

    /// Evicts the farthest 5% of the used capacity, if over capacity.
    ///
    /// The usage check, the scan and the deletes run in one write transaction, so concurrent
    /// writers evict from a consistent view.
    fn evict_if_over_capacity(&self) -> Result<(), ContentStoreError> {
        let capacity = self.config.storage_capacity_bytes;
        let mut conn = self.config.sql_connection_pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let usage = Self::query_usage_stats(&tx)?;
        if usage.total_entry_size_bytes <= capacity {
            return Ok(());
        }
        let to_free = (usage.total_entry_size_bytes / EVICTION_DIVISOR).max(1);

        let mut to_delete = vec![];
        let mut freed = 0;
        {
            let mut query = tx.prepare(sql::FARTHEST_CONTENT_SIZES_QUERY)?;
            let mut rows = query.query([self.config.node_id.raw().to_vec()])?;
            while freed < to_free {
                let Some(row) = rows.next()? else {
                    break;
                };
                to_delete.push(row.get::<_, Vec<u8>>("key")?);
                freed += row.get::<_, u64>("content_size")?;
            }
        }
        {
            let mut delete = tx.prepare(sql::DELETE_QUERY)?;
            for key in &to_delete {
                delete.execute([key])?;
            }
        }
        let farthest = self.query_farthest(&tx)?;
        tx.commit()?;

        // Nothing survived, so nothing is within any radius but zero.
        let new_radius = farthest.map_or(Distance::ZERO, |farthest| farthest.distance);
        let mut radius = self.radius.write();
        if new_radius < *radius {
            *radius = new_radius;
        }
        debug!(
            used = usage.total_entry_size_bytes,
            capacity,
            freed,
            deleted = to_delete.len(),
            radius = %*radius,
            "Evicted farthest content"
        );
        Ok(())
    }

    fn query_usage_stats(conn: &Connection) -> Result<UsageStats, ContentStoreError> {
        let usage_stats = conn.query_row(sql::USAGE_STATS_QUERY, [], |row| {
            let used_capacity: f64 = row.get("used_capacity")?;
            Ok(UsageStats {
                entry_count: row.get("count")?,
                total_entry_size_bytes: used_capacity.round() as u64,
            })
        })?;
        Ok(usage_stats)
    }

    fn query_farthest(
        &self,
        conn: &Connection,
    ) -> Result<Option<FarthestQueryResult>, ContentStoreError> {
        let content_id = conn
            .query_row(
                sql::FARTHEST_QUERY,
                [self.config.node_id.raw().to_vec()],
                |row| row.get::<_, ContentId>("key"),
            )
            .optional()?;
        Ok(content_id.map(|content_id| FarthestQueryResult {
            distance: self.distance_to_content_id(&content_id),
            content_id,
        }))
    }
}
