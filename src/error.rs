//! Error types for fm_voice.
//!
//! Only construction can fail. Everything that runs at control or audio rate
//! is a total function over its numeric domain.

use thiserror::Error;

/// Result type alias for fm_voice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a voice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Wavetable length is not a power of two in `2..=32768`.
    #[error("Invalid wavetable length {len}: must be a power of two between 2 and 32768")]
    InvalidWavetable { len: usize },
}
