use portal_api::HistoryContentKey;
use portal_storage::ContentStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// The content lies outside the radius this node is responsible for.
    #[error("Content is outside the local radius: {content_key}")]
    OutOfRange { content_key: HistoryContentKey },

    /// Every lookup attempt failed or returned content that did not validate.
    #[error("Content not found: {content_key}")]
    ContentNotFound { content_key: HistoryContentKey },

    #[error("Content validation failed for {content_key}: {reason}")]
    Validation {
        content_key: HistoryContentKey,
        reason: String,
    },

    /// Offered content that could not be matched to a content key.
    #[error("Invalid offered content: {0}")]
    InvalidContent(String),

    #[error(transparent)]
    Storage(#[from] ContentStoreError),
}
