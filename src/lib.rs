//! # haxball-corpus
//!
//! Binary corpus codec and feature pipeline for learning player control
//! from recorded haxball sessions.
//!
//! ## Design Principles
//!
//! 1. **One Transform**: The feature builder that shapes training data is the
//!    same one that shapes live state at inference time.
//!
//! 2. **Streaming First**: A corpus is read chunk by chunk; nothing requires
//!    the whole file in memory.
//!
//! 3. **Local Failures**: A corrupt match or a non-finite example is logged
//!    and skipped. Everything around it still loads.
//!
//! ## Data Flow
//!
//! ```text
//! session -> SessionRecorder -> Match -> codec -> ChunkWriter -> corpus
//! corpus -> ChunkStream -> codec -> Match -> FeatureBuilder -> Dataset
//! live state -> FeatureBuilder -> Model -> control_input
//! ```
//!
//! ## Modules
//!
//! - `core`: Kinematic records, configuration, errors
//! - `codec`: Match to little-endian `f32` bytes and back
//! - `chunk`: Length-prefixed framing, incremental reader, stream iterator
//! - `features`: Normalization, feature vectors, datasets
//! - `pipeline`: Session recording, corpus preparation and loading
//! - `inference`: Model trait and control-input clamp

pub mod chunk;
pub mod codec;
pub mod core;
pub mod features;
pub mod inference;
pub mod pipeline;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{
    BallTick, CorpusConfig, Error, Frame, Match, PlayerTick, Players, Position, Result, Velocity,
};

pub use crate::codec::{decode, encode, DecodeError};

pub use crate::chunk::{ChunkReader, ChunkStream, ChunkWriter, FramingWarning, ReadState};

pub use crate::features::{
    feature_len, normalize, Dataset, Example, FeatureBuilder, FeatureError, FeatureVector,
    FEATURE_LAYOUT_VERSION,
};

pub use crate::pipeline::{
    load_corpus, load_dataset, prepare_corpus, spawn_loader, Admission, CorpusLoader, CorpusSink,
    ExampleSink, JsonlSession, LoadStats, PrepareStats, Rejection, SessionRecorder, SessionSource,
    TickEvent,
};

pub use crate::inference::{control_input, ConstantModel, FnModel, Model, Pilot, MAX_CONTROL_INPUT};
