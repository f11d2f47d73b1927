//! `jokes-core`: configuration, shared constants and lifecycle types used by
//! every other crate in the workspace.

pub mod config;
pub mod error;
pub mod types;

pub use config::JokesConfig;
pub use error::{JokesError, Result};
pub use types::{InstanceSnapshot, RefreshTrigger};
