//! Error types.
//!
//! The tracking engine itself never fails: tracking and triggering are plain
//! bookkeeping, and failures raised by effects propagate to the caller as
//! panics. The only fallible surface is loading a [`TrackerConfig`].
//!
//! [`TrackerConfig`]: crate::config::TrackerConfig

use thiserror::Error;

/// Errors produced while loading or validating tracker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed into a configuration.
    #[error("invalid tracker configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// An effect scoping name other than `clear` or `restore`.
    #[error("unknown effect scoping `{0}` (expected `clear` or `restore`)")]
    UnknownScoping(String),

    /// An environment variable held a value that could not be parsed.
    #[error("invalid value `{value}` for {variable}")]
    InvalidVar {
        variable: &'static str,
        value: String,
    },

    /// Automatic reclamation needs a positive interval.
    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,
}
