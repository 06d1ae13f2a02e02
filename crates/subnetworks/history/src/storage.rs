use portal_api::{Distance, HistoryContentKey, OverlayContentKey};
use portal_storage::{ContentId, ContentStorage, ContentStoreError, PortalStorageConfig};

/// Storage layer for the history network. Content is stored under the id of its content key.
pub struct HistoryStorage {
    store: ContentStorage,
}

impl HistoryStorage {
    pub fn new(config: PortalStorageConfig) -> Result<Self, ContentStoreError> {
        Ok(Self {
            store: ContentStorage::new(config)?,
        })
    }

    pub fn get(&self, key: &HistoryContentKey) -> Result<Option<Vec<u8>>, ContentStoreError> {
        self.store.get(&content_id(key))
    }

    pub fn put(&self, key: &HistoryContentKey, value: &[u8]) -> Result<(), ContentStoreError> {
        self.store.put(&content_id(key), value)
    }

    /// Whether the content falls within the radius of this node.
    pub fn in_range(&self, key: &HistoryContentKey) -> bool {
        self.store.in_range(&content_id(key))
    }

    pub fn is_key_within_radius_and_unavailable(
        &self,
        key: &HistoryContentKey,
    ) -> Result<bool, ContentStoreError> {
        self.store
            .is_key_within_radius_and_unavailable(&content_id(key))
    }

    pub fn radius(&self) -> Distance {
        self.store.radius()
    }

    /// Drops everything outside `radius` and shrinks the radius to it.
    pub fn force_prune(&self, radius: Distance) -> Result<usize, ContentStoreError> {
        self.store.force_prune(radius)
    }

    /// Get a summary of the current state of storage
    pub fn get_summary_info(&self) -> String {
        match self.store.usage_stats() {
            Ok(usage_stats) => format!("{usage_stats}; radius: {}", self.store.radius()),
            Err(err) => format!("usage stats unavailable: {err}"),
        }
    }
}

fn content_id(key: &HistoryContentKey) -> ContentId {
    ContentId::from(key.content_id())
}
