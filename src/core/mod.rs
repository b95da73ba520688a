//! Core types: kinematic records, configuration, errors.
//!
//! Every other module speaks in terms of these records. They carry no
//! encoding or feature logic of their own.

pub mod config;
pub mod error;
pub mod record;

pub use config::{CorpusConfig, DEFAULT_READ_CHUNK_SIZE, DEFAULT_TEAM_ONE};
pub use error::{Error, Result};
pub use record::{BallTick, Frame, Match, PlayerTick, Players, Position, Velocity};
