//! Feature and dataset bindings for Python.

use numpy::{PyArray1, PyArray2, PyArrayMethods};
use pyo3::prelude::*;

use crate::core::Error;
use crate::features::{Dataset, FeatureBuilder, FEATURE_LAYOUT_VERSION};
use crate::inference;

use super::py_core::{PyBallTick, PyCorpusConfig, PyPlayerTick};

/// Python wrapper for FeatureBuilder.
#[pyclass(name = "FeatureBuilder")]
#[derive(Clone, Debug)]
pub struct PyFeatureBuilder(pub FeatureBuilder);

#[pymethods]
impl PyFeatureBuilder {
    #[new]
    #[pyo3(signature = (team_one = 1))]
    fn new(team_one: i32) -> Self {
        Self(FeatureBuilder::new().with_team_one(team_one))
    }

    /// Create a builder matching a corpus config.
    #[staticmethod]
    fn from_config(config: &PyCorpusConfig) -> Self {
        Self(FeatureBuilder::from_config(&config.0))
    }

    /// Build the feature vector for `current` as a 1-D float64 array.
    ///
    /// The same transform the corpus loader applies at training time.
    fn build<'py>(
        &self,
        py: Python<'py>,
        ball: &PyBallTick,
        current: &PyPlayerTick,
        others: Vec<PyPlayerTick>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let features = self
            .0
            .build(&ball.0, &current.0, others.iter().map(|p| &p.0))
            .map_err(Error::from)?;
        Ok(PyArray1::from_vec_bound(py, features.into_vec()))
    }

    #[getter]
    fn team_one(&self) -> i32 {
        self.0.team_one()
    }

    /// Feature layout revision.
    #[staticmethod]
    fn layout_version() -> u32 {
        FEATURE_LAYOUT_VERSION
    }
}

/// Map a model prediction to a control input in `0..=31`.
#[pyfunction]
pub fn control_input(prediction: f64) -> u8 {
    inference::control_input(prediction)
}

/// Python wrapper for Dataset.
#[pyclass(name = "Dataset")]
#[derive(Clone, Debug)]
pub struct PyDataset(pub Dataset);

#[pymethods]
impl PyDataset {
    #[new]
    fn new(feature_len: usize) -> Self {
        Self(Dataset::new(feature_len))
    }

    /// Number of rows.
    fn __len__(&self) -> usize {
        self.0.len()
    }

    /// `(rows, feature_len)`.
    #[getter]
    fn shape(&self) -> (usize, usize) {
        let [rows, cols] = self.0.shape();
        (rows, cols)
    }

    /// Split off the trailing `fraction` of rows as `(train, validation)`.
    #[pyo3(signature = (fraction = 0.2))]
    fn validation_split(&self, fraction: f64) -> (PyDataset, PyDataset) {
        let (train, validation) = self.0.validation_split(fraction);
        (PyDataset(train), PyDataset(validation))
    }

    /// Sample distinct rows reproducibly.
    fn sample_batch(&self, batch_size: usize, seed: u64) -> PyDataset {
        PyDataset(self.0.sample_batch(batch_size, seed))
    }

    /// Inputs and targets as numpy arrays:
    /// - inputs: [N, feature_len] float64
    /// - targets: [N] float64
    fn to_numpy<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray1<f64>>)> {
        let [rows, cols] = self.0.shape();
        let inputs = PyArray1::from_slice_bound(py, self.0.inputs())
            .reshape([rows, cols])
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e)))?;
        let targets = PyArray1::from_slice_bound(py, self.0.targets());
        Ok((inputs, targets))
    }

    fn __repr__(&self) -> String {
        let [rows, cols] = self.0.shape();
        format!("Dataset(rows={}, feature_len={})", rows, cols)
    }
}
