//! `jokes-content`: the single piece of content on screen and where it comes from.
//!
//! [`ContentCell`] owns the current joke. It restores it at startup (instance
//! snapshot, then preference store, then network) and refreshes it on demand
//! through a [`JokeSource`]. Every successful fetch is persisted immediately;
//! failed fetches change nothing.

pub mod cell;
pub mod error;
pub mod source;

pub use cell::{ContentCell, FetchCompletion};
pub use error::FetchError;
pub use source::{parse_joke, ChuckNorrisSource, JokeSource};
