//! Storage-specific error type wrapping sqlx errors.

use inksync_domain::error::InkSyncError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize or deserialize a stored JSON column.
    #[error("JSON column error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored snapshot position does not fit the column type.
    #[error("snapshot of {0} automations is too large")]
    TooLarge(usize),
}

impl From<StorageError> for InkSyncError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
