use thiserror::Error;

/// Why a fetch produced no joke. Every variant is recoverable: callers fall
/// back to the previous joke or the fallback message.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body-read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}")]
    Status { status: u16 },

    /// Body was not JSON, lacked the `value` field, or the joke was blank.
    #[error("Malformed payload: {0}")]
    Malformed(String),
}
