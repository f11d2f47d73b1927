//! `jokes-scheduler`: persistent countdown that triggers one refresh per interval.
//!
//! # Overview
//!
//! A [`Scheduler`] ticks every `tick` (one second by default) and decrements a
//! [`Countdown`]. The tick that brings the countdown to zero fires the expiry
//! callback and resets the countdown to the full interval in the same step.
//!
//! On [`Scheduler::stop`] the remaining milliseconds are written to the
//! preference store; [`Scheduler::resume`] reads them back so a restart
//! continues where the previous run left off instead of waiting a whole
//! interval.
//!
//! | Stored value        | Restored countdown      |
//! |---------------------|-------------------------|
//! | missing             | full interval           |
//! | corrupt / negative  | full interval           |
//! | above interval      | clamped to interval     |
//! | `0..=interval`      | as stored               |

pub mod countdown;
pub mod engine;
pub mod error;

pub use countdown::{duration_ms, Countdown, TickOutcome};
pub use engine::{restore_remaining, Scheduler};
pub use error::{Result, SchedulerError};
