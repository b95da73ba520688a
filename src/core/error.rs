//! Crate-wide error type.
//!
//! Component errors (`DecodeError`, `FeatureError`) stay in their own modules
//! so callers that only decode or only build features can match on them
//! directly. `Error` wraps them for the pipeline and I/O surfaces.

use thiserror::Error;

use crate::codec::DecodeError;
use crate::features::FeatureError;

/// Result alias used by the pipeline and I/O surfaces.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("chunk payload too large: {len} bytes does not fit a u32 length prefix")]
    ChunkTooLarge { len: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("feature vector shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("sink closed before all examples were delivered")]
    SinkClosed,
}
