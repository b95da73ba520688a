//! Corpus preparation and loading bindings for Python.

use std::fs::File;
use std::io::BufReader;

use pyo3::prelude::*;

use crate::chunk::ChunkWriter;
use crate::pipeline::{self, JsonlSession, LoadStats, PrepareStats};

use super::py_core::PyCorpusConfig;
use super::py_features::PyDataset;

/// Counts from one preparation run.
#[pyclass(name = "PrepareStats", get_all)]
#[derive(Clone, Debug)]
pub struct PyPrepareStats {
    sessions: usize,
    written: usize,
    empty: usize,
    too_short: usize,
    failed: usize,
    bytes: u64,
}

impl From<PrepareStats> for PyPrepareStats {
    fn from(s: PrepareStats) -> Self {
        Self {
            sessions: s.sessions,
            written: s.written,
            empty: s.empty,
            too_short: s.too_short,
            failed: s.failed,
            bytes: s.bytes,
        }
    }
}

#[pymethods]
impl PyPrepareStats {
    fn __repr__(&self) -> String {
        format!(
            "PrepareStats(sessions={}, written={}, empty={}, too_short={}, failed={})",
            self.sessions, self.written, self.empty, self.too_short, self.failed
        )
    }
}

/// Counts from one load.
#[pyclass(name = "LoadStats", get_all)]
#[derive(Clone, Debug)]
pub struct PyLoadStats {
    chunks: usize,
    matches: usize,
    frames: usize,
    examples: usize,
    skipped_matches: usize,
    skipped_frames: usize,
    skipped_examples: usize,
    bytes: u64,
    /// Partial-tail warning text, if the corpus ended mid-chunk.
    warning: Option<String>,
}

impl From<LoadStats> for PyLoadStats {
    fn from(s: LoadStats) -> Self {
        Self {
            chunks: s.chunks,
            matches: s.matches,
            frames: s.frames,
            examples: s.examples,
            skipped_matches: s.skipped_matches,
            skipped_frames: s.skipped_frames,
            skipped_examples: s.skipped_examples,
            bytes: s.bytes,
            warning: s.warning.map(|w| w.to_string()),
        }
    }
}

#[pymethods]
impl PyLoadStats {
    fn __repr__(&self) -> String {
        format!(
            "LoadStats(chunks={}, matches={}, examples={}, skipped_matches={})",
            self.chunks, self.matches, self.examples, self.skipped_matches
        )
    }
}

/// Record JSON-lines sessions into a corpus file.
///
/// Each path holds one session, one tick event per line.
#[pyfunction]
pub fn prepare_corpus(
    py: Python<'_>,
    sessions: Vec<String>,
    output: String,
    config: &PyCorpusConfig,
) -> PyResult<PyPrepareStats> {
    let config = config.0.clone();
    py.allow_threads(move || {
        let sources = sessions
            .iter()
            .map(|path| Ok(JsonlSession::new(BufReader::new(File::open(path)?))))
            .collect::<std::io::Result<Vec<_>>>()?;
        let mut writer = ChunkWriter::new(File::create(&output)?);
        let stats = pipeline::prepare_corpus(sources, &config, &mut writer)?;
        Ok(stats.into())
    })
}

/// Load a corpus file into a `Dataset`.
///
/// Returns `(dataset, stats)`. Use `dataset.to_numpy()` for arrays.
#[pyfunction]
pub fn load_corpus(
    py: Python<'_>,
    path: String,
    config: &PyCorpusConfig,
) -> PyResult<(PyDataset, PyLoadStats)> {
    let config = config.0.clone();
    py.allow_threads(move || {
        let (dataset, stats) = pipeline::load_dataset(&path, &config)?;
        Ok((PyDataset(dataset), stats.into()))
    })
}
