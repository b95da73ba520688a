//! Live control from a trained model.
//!
//! The model itself lives outside this crate. It sees the same
//! [`FeatureVector`] the corpus loader produced at training time and returns
//! one scalar, which [`control_input`] maps back into the control domain.
//!
//! ## Overview
//!
//! - **Model**: scalar prediction from a feature vector
//! - **Baselines**: `ConstantModel`, `FnModel` for testing
//! - **Pilot**: builder + model + clamp for one bot
//!
//! ## Usage
//!
//! ```rust
//! use haxball_corpus::core::{BallTick, PlayerTick};
//! use haxball_corpus::features::FeatureBuilder;
//! use haxball_corpus::inference::{ConstantModel, Pilot};
//!
//! let pilot = Pilot::new(FeatureBuilder::new(), ConstantModel::new(40.2));
//! let me = PlayerTick::new(1, 1);
//! let input = pilot.act(&BallTick::default(), &me, []).unwrap();
//! assert_eq!(input, 31);
//! ```

use crate::core::{BallTick, Frame, PlayerTick};
use crate::features::{FeatureBuilder, FeatureError, FeatureVector};

/// Largest valid control input (five button bits).
pub const MAX_CONTROL_INPUT: u8 = 31;

/// Map a model prediction to a control input.
///
/// Rounds to the nearest integer (halves away from zero) and clamps to
/// `0..=31`. NaN maps to `0`.
#[must_use]
pub fn control_input(prediction: f64) -> u8 {
    if prediction.is_nan() {
        return 0;
    }
    prediction.round().clamp(0.0, f64::from(MAX_CONTROL_INPUT)) as u8
}

/// Scalar model over feature vectors.
pub trait Model: Send + Sync {
    /// Predict the control input for one vector, before clamping.
    fn predict(&self, features: &FeatureVector) -> f64;

    /// Batch prediction (optional optimization).
    fn predict_batch(&self, batch: &[FeatureVector]) -> Vec<f64> {
        batch.iter().map(|f| self.predict(f)).collect()
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn predict(&self, features: &FeatureVector) -> f64 {
        (**self).predict(features)
    }

    fn predict_batch(&self, batch: &[FeatureVector]) -> Vec<f64> {
        (**self).predict_batch(batch)
    }
}

/// Always predicts the same value (baseline for testing).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstantModel {
    value: f64,
}

impl ConstantModel {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Model for ConstantModel {
    fn predict(&self, _features: &FeatureVector) -> f64 {
        self.value
    }
}

/// Wraps a closure over the raw feature values.
#[derive(Clone)]
pub struct FnModel<F> {
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Model for FnModel<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> f64 {
        (self.f)(features.as_slice())
    }
}

/// Drives one bot: live state in, control input out.
pub struct Pilot<M: Model> {
    builder: FeatureBuilder,
    model: M,
}

impl<M: Model> Pilot<M> {
    pub fn new(builder: FeatureBuilder, model: M) -> Self {
        Self { builder, model }
    }

    #[must_use]
    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Raw model output for `current`, before clamping.
    pub fn predict<'a, I>(
        &self,
        ball: &BallTick,
        current: &PlayerTick,
        others: I,
    ) -> Result<f64, FeatureError>
    where
        I: IntoIterator<Item = &'a PlayerTick>,
    {
        let features = self.builder.build(ball, current, others)?;
        Ok(self.model.predict(&features))
    }

    /// Control input for `current` given the other players in order.
    pub fn act<'a, I>(
        &self,
        ball: &BallTick,
        current: &PlayerTick,
        others: I,
    ) -> Result<u8, FeatureError>
    where
        I: IntoIterator<Item = &'a PlayerTick>,
    {
        self.predict(ball, current, others).map(control_input)
    }

    /// Control input for player `id` of `frame`, others in snapshot order.
    ///
    /// `Ok(None)` when the player is not in the frame.
    pub fn act_on_frame(&self, frame: &Frame, id: i32) -> Result<Option<u8>, FeatureError> {
        let Some(current) = frame.player(id) else {
            return Ok(None);
        };
        let others = frame.players.iter().filter(|p| p.id != id);
        self.act(&frame.ball, current, others).map(Some)
    }
}
