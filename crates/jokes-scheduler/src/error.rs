use thiserror::Error;

/// Errors that can occur when configuring or starting the countdown.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Tick size must be strictly positive.
    #[error("Invalid tick size: {0:?}")]
    InvalidTick(std::time::Duration),

    /// Full interval must be strictly positive.
    #[error("Invalid interval: {0:?}")]
    InvalidInterval(std::time::Duration),

    /// `start` called while the tick loop is already running.
    #[error("Scheduler already running")]
    AlreadyRunning,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
