use tether_types::RecordId;

/// Errors from live-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record does not exist in the live store.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The store could not be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Store is read-only.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
