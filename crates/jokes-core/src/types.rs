use std::fmt;

/// Ephemeral copy of the on-screen content, carried across a transient
/// interruption (controller torn down and re-created in the same process).
///
/// Never persisted. When present it wins over the preference store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceSnapshot {
    pub joke: Option<String>,
}

impl InstanceSnapshot {
    pub fn new(joke: Option<String>) -> Self {
        Self { joke }
    }

    pub fn joke(&self) -> Option<&str> {
        self.joke.as_deref()
    }
}

/// What asked for a refresh. Only used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Countdown reached zero.
    Scheduled,
    /// User pressed the "new joke" control.
    Manual,
    /// Nothing to show at startup.
    Startup,
}

impl fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshTrigger::Scheduled => write!(f, "scheduled"),
            RefreshTrigger::Manual => write!(f, "manual"),
            RefreshTrigger::Startup => write!(f, "startup"),
        }
    }
}
