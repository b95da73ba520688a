//! Feature vectors for training and inference.
//!
//! ## Overview
//!
//! - **normalize**: min-max scaling with a `0.5` midpoint for flat sequences
//! - **FeatureBuilder**: ball + current player + others into a [`FeatureVector`]
//! - **Dataset**: row-major input matrix and target column for the model
//!
//! ## Usage
//!
//! ```rust
//! use haxball_corpus::core::{BallTick, PlayerTick};
//! use haxball_corpus::features::{feature_len, FeatureBuilder};
//!
//! let builder = FeatureBuilder::new();
//! let ball = BallTick::default();
//! let me = PlayerTick::new(1, 1).at(10.0, 0.0);
//! let them = [PlayerTick::new(2, 2).at(-10.0, 0.0)];
//!
//! let v = builder.build(&ball, &me, &them).unwrap();
//! assert_eq!(v.len(), feature_len(2));
//! ```

pub mod builder;
pub mod dataset;
pub mod normalize;

pub use builder::{
    feature_len, FeatureBuilder, FeatureVector, FEATURE_LAYOUT_VERSION, HEAD_LEN, PLAYER_SLOTS,
};
pub use dataset::{Dataset, Example};
pub use normalize::{normalize, normalize_into, FeatureError, DEGENERATE_MIDPOINT};
