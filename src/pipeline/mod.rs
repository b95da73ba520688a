//! Pipeline driver: sessions to corpus, corpus to examples.
//!
//! ## Overview
//!
//! - **session**: `SessionSource` trait, `SessionRecorder` frame admission
//! - **prepare**: `prepare_corpus` and the single-writer `CorpusSink`
//! - **load**: `CorpusLoader`, `ExampleSink`, and the channel-backed loader
//!
//! ## Usage
//!
//! ```rust,ignore
//! use haxball_corpus::chunk::ChunkWriter;
//! use haxball_corpus::core::CorpusConfig;
//! use haxball_corpus::pipeline::{load_dataset, prepare_corpus, JsonlSession};
//!
//! let config = CorpusConfig::load("configs.json")?;
//!
//! let sources = paths.iter().map(|p| JsonlSession::new(open(p)?)).collect::<Vec<_>>();
//! let mut writer = ChunkWriter::new(File::create("corpus.bin")?);
//! let prepared = prepare_corpus(sources, &config, &mut writer)?;
//!
//! let (dataset, loaded) = load_dataset("corpus.bin", &config)?;
//! let (train, validation) = dataset.validation_split(0.2);
//! ```

pub mod load;
pub mod prepare;
pub mod session;

pub use load::{
    load_corpus, load_dataset, spawn_loader, CorpusLoader, ExampleSink, LoadStats,
    DEFAULT_LOADER_CAPACITY,
};
pub use prepare::{
    prepare_corpus, CorpusProducer, CorpusSink, PrepareStats, DEFAULT_SINK_CAPACITY,
};
pub use session::{
    record_session, Admission, DropCounts, JsonlSession, Rejection, SessionRecorder,
    SessionSource, TickEvent, SPECTATOR_TEAM,
};
