//! Error types for ContrastSync

use thiserror::Error;

/// Main error type for ContrastSync operations
///
/// The synchronizer itself never surfaces these to its callers; they are
/// produced by host capabilities and absorbed (and logged) at the channel
/// boundary.
#[derive(Error, Debug)]
pub enum ContrastError {
    /// Input was not accepted by the color parser
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Generic key-value storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Storage refused the write because it is full
    #[error("Storage quota exceeded for key: {0}")]
    QuotaExceeded(String),

    /// Storage is disabled or access was denied
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The host refused to rewrite the location
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// The host throttled the location rewrite (benign, expected under rapid edits)
    #[error("Navigation throttled")]
    NavigationThrottled,

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContrastError {
    /// Whether this failure is expected noise that should not be logged as a warning
    pub fn is_benign(&self) -> bool {
        matches!(self, ContrastError::NavigationThrottled)
    }
}

impl From<serde_json::Error> for ContrastError {
    fn from(err: serde_json::Error) -> Self {
        ContrastError::Serialization(err.to_string())
    }
}

/// Result type alias using ContrastError
pub type ContrastResult<T> = Result<T, ContrastError>;
