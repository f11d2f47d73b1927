use thiserror::Error;

/// Errors raised by the preference store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored value exists but cannot be decoded as the requested type.
    #[error("Corrupt value for {key}: {value:?}")]
    Corrupt { key: String, value: String },

    /// The connection mutex was poisoned by a panicking holder.
    #[error("Store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
