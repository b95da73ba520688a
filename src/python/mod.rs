//! Python bindings for the haxball corpus pipeline.
//!
//! This module provides PyO3 bindings for preparing corpora and feeding them
//! to a Python training loop as numpy arrays.
//!
//! # Quick Start
//!
//! ```python
//! import haxball_corpus as hc
//!
//! config = hc.CorpusConfig(player_count=2, min_ticks=600)
//!
//! # Record sessions into a corpus
//! stats = hc.prepare_corpus(["a.jsonl", "b.jsonl"], "corpus.bin", config)
//!
//! # Load it back as training arrays
//! dataset, loaded = hc.load_corpus("corpus.bin", config)
//! train, validation = dataset.validation_split(0.2)
//! xs, ys = train.to_numpy()
//!
//! # Live inference uses the same builder
//! builder = hc.FeatureBuilder.from_config(config)
//! x = builder.build(ball, me, others)
//! action = hc.control_input(model(x))
//! ```

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::core::Error;

mod py_core;
mod py_corpus;
mod py_features;

pub use py_core::*;
pub use py_corpus::*;
pub use py_features::*;

impl From<Error> for PyErr {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(e) => PyIOError::new_err(e.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// haxball_corpus: session corpora and feature vectors for bot training.
///
/// This module provides:
/// - Corpus preparation from recorded sessions
/// - Streaming corpus loading into numpy-ready datasets
/// - The feature builder shared by training and live inference
#[pymodule]
fn haxball_corpus(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Records and config
    m.add_class::<PyCorpusConfig>()?;
    m.add_class::<PyPlayerTick>()?;
    m.add_class::<PyBallTick>()?;

    // Features
    m.add_class::<PyFeatureBuilder>()?;
    m.add_class::<PyDataset>()?;
    m.add_function(wrap_pyfunction!(control_input, m)?)?;

    // Corpus
    m.add_class::<PyPrepareStats>()?;
    m.add_class::<PyLoadStats>()?;
    m.add_function(wrap_pyfunction!(prepare_corpus, m)?)?;
    m.add_function(wrap_pyfunction!(load_corpus, m)?)?;

    Ok(())
}
