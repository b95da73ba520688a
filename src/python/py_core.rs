//! Record and config bindings for Python.

use pyo3::prelude::*;

use crate::core::{BallTick, CorpusConfig, PlayerTick, Position, Velocity};

/// Python wrapper for CorpusConfig.
#[pyclass(name = "CorpusConfig")]
#[derive(Clone, Debug)]
pub struct PyCorpusConfig(pub CorpusConfig);

#[pymethods]
impl PyCorpusConfig {
    /// Create a new corpus configuration.
    ///
    /// # Arguments
    /// - player_count: Players every stored frame must have
    /// - min_ticks: Matches whose largest tick is below this are dropped (default: 0)
    /// - team_one: Team id flagged with 1 in the feature vector (default: 1)
    #[new]
    #[pyo3(signature = (player_count, min_ticks = 0, team_one = 1))]
    fn new(player_count: usize, min_ticks: u32, team_one: i32) -> PyResult<Self> {
        let config = CorpusConfig::new(player_count)
            .with_minimum_ticks(min_ticks)
            .with_team_one(team_one);
        config.validate()?;
        Ok(Self(config))
    }

    /// Load a JSON config file.
    #[staticmethod]
    fn load(path: &str) -> PyResult<Self> {
        Ok(Self(CorpusConfig::load(path)?))
    }

    #[getter]
    fn player_count(&self) -> usize {
        self.0.expected_player_count
    }

    #[getter]
    fn min_ticks(&self) -> u32 {
        self.0.minimum_ticks_to_retain
    }

    #[getter]
    fn team_one(&self) -> i32 {
        self.0.team_one
    }

    /// Length of every feature vector built under this config.
    #[getter]
    fn feature_len(&self) -> usize {
        self.0.feature_len()
    }

    fn __repr__(&self) -> String {
        format!(
            "CorpusConfig(player_count={}, min_ticks={}, team_one={})",
            self.0.expected_player_count, self.0.minimum_ticks_to_retain, self.0.team_one
        )
    }
}

/// Python wrapper for PlayerTick.
#[pyclass(name = "PlayerTick")]
#[derive(Clone, Debug)]
pub struct PyPlayerTick(pub PlayerTick);

#[pymethods]
impl PyPlayerTick {
    #[new]
    #[pyo3(signature = (id, team, position = (0.0, 0.0), velocity = (0.0, 0.0), input = 0))]
    fn new(id: i32, team: i32, position: (f64, f64), velocity: (f64, f64), input: i32) -> Self {
        Self(
            PlayerTick::new(id, team)
                .with_input(input)
                .at(position.0, position.1)
                .moving(velocity.0, velocity.1),
        )
    }

    #[getter]
    fn id(&self) -> i32 {
        self.0.id
    }

    #[getter]
    fn team(&self) -> i32 {
        self.0.team
    }

    #[getter]
    fn input(&self) -> i32 {
        self.0.input
    }

    #[getter]
    fn position(&self) -> (f64, f64) {
        (self.0.position.x, self.0.position.y)
    }

    #[getter]
    fn velocity(&self) -> (f64, f64) {
        (self.0.velocity.x, self.0.velocity.y)
    }

    fn __repr__(&self) -> String {
        format!(
            "PlayerTick(id={}, team={}, input={})",
            self.0.id, self.0.team, self.0.input
        )
    }
}

/// Python wrapper for BallTick.
#[pyclass(name = "BallTick")]
#[derive(Clone, Debug)]
pub struct PyBallTick(pub BallTick);

#[pymethods]
impl PyBallTick {
    #[new]
    #[pyo3(signature = (position = (0.0, 0.0), velocity = (0.0, 0.0)))]
    fn new(position: (f64, f64), velocity: (f64, f64)) -> Self {
        Self(BallTick::new(
            Position::new(position.0, position.1),
            Velocity::new(velocity.0, velocity.1),
        ))
    }

    #[getter]
    fn position(&self) -> (f64, f64) {
        (self.0.position.x, self.0.position.y)
    }

    #[getter]
    fn velocity(&self) -> (f64, f64) {
        (self.0.velocity.x, self.0.velocity.y)
    }

    fn __repr__(&self) -> String {
        format!(
            "BallTick(position={:?}, velocity={:?})",
            self.position(),
            self.velocity()
        )
    }
}
