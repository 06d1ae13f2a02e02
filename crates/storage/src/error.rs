use thiserror::Error;

/// An error from an operation on a `ContentStorage`.
#[derive(Debug, Error)]
pub enum ContentStoreError {
    #[error("IO error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("rusqlite error {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("r2d2 error {0}")]
    R2D2(#[from] r2d2::Error),
}
