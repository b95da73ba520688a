//! Training examples and the in-memory tensor pair.
//!
//! A `Dataset` is what the external model consumes for training: a
//! row-major `rows × feature_len` input matrix and a matching target column.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::builder::FeatureVector;
use crate::core::{Error, Result};

/// One (feature vector, target) pair for one player in one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Tick of the source frame.
    pub tick: u32,

    /// Id of the player the vector was built for.
    pub player_id: i32,

    pub features: FeatureVector,

    /// The player's recorded control input.
    pub target: f64,
}

/// Row-major input matrix with a target per row.
///
/// Every row has the same length. A dataset created with `Default` adopts
/// the length of its first row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    feature_len: usize,
    inputs: Vec<f64>,
    targets: Vec<f64>,
}

/// Unchecked serialized form of [`Dataset`].
#[derive(Deserialize)]
struct RawDataset {
    feature_len: usize,
    inputs: Vec<f64>,
    targets: Vec<f64>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = Error;

    fn try_from(raw: RawDataset) -> Result<Self> {
        let expected = raw.targets.len().checked_mul(raw.feature_len);
        if expected != Some(raw.inputs.len()) {
            return Err(Error::ShapeMismatch {
                expected: expected.unwrap_or(usize::MAX),
                got: raw.inputs.len(),
            });
        }
        Ok(Self {
            feature_len: raw.feature_len,
            inputs: raw.inputs,
            targets: raw.targets,
        })
    }
}

impl Dataset {
    /// Create an empty dataset with a fixed row length.
    pub fn new(feature_len: usize) -> Self {
        Self {
            feature_len,
            inputs: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Create an empty dataset with room for `rows` rows.
    pub fn with_capacity(feature_len: usize, rows: usize) -> Self {
        Self {
            feature_len,
            inputs: Vec::with_capacity(feature_len * rows),
            targets: Vec::with_capacity(rows),
        }
    }

    /// Append an example.
    pub fn push(&mut self, example: Example) -> Result<()> {
        self.push_row(example.features.as_slice(), example.target)
    }

    /// Append a raw row.
    pub fn push_row(&mut self, features: &[f64], target: f64) -> Result<()> {
        if self.feature_len == 0 && self.targets.is_empty() {
            self.feature_len = features.len();
        }
        if features.len() != self.feature_len {
            return Err(Error::ShapeMismatch {
                expected: self.feature_len,
                got: features.len(),
            });
        }
        self.inputs.extend_from_slice(features);
        self.targets.push(target);
        Ok(())
    }

    /// Append every row of `other`.
    pub fn extend(&mut self, other: &Dataset) -> Result<()> {
        for (row, target) in other.rows() {
            self.push_row(row, target)?;
        }
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[must_use]
    pub fn feature_len(&self) -> usize {
        self.feature_len
    }

    /// `[rows, feature_len]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 2] {
        [self.len(), self.feature_len]
    }

    /// Flat row-major inputs.
    #[must_use]
    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    #[must_use]
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<(&[f64], f64)> {
        let target = *self.targets.get(index)?;
        let start = index * self.feature_len;
        Some((&self.inputs[start..start + self.feature_len], target))
    }

    pub fn rows(&self) -> impl Iterator<Item = (&[f64], f64)> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// Split off the trailing `fraction` of rows for validation.
    ///
    /// Returns `(train, validation)`. The split point is
    /// `floor(rows * (1 - fraction))`, rows keep their order.
    pub fn validation_split(&self, fraction: f64) -> (Dataset, Dataset) {
        let fraction = fraction.clamp(0.0, 1.0);
        let split = (self.len() as f64 * (1.0 - fraction)).floor() as usize;
        let at = split * self.feature_len;

        let train = Dataset {
            feature_len: self.feature_len,
            inputs: self.inputs[..at].to_vec(),
            targets: self.targets[..split].to_vec(),
        };
        let validation = Dataset {
            feature_len: self.feature_len,
            inputs: self.inputs[at..].to_vec(),
            targets: self.targets[split..].to_vec(),
        };
        (train, validation)
    }

    /// Sample up to `batch_size` distinct rows, reproducibly for a seed.
    pub fn sample_batch(&self, batch_size: usize, seed: u64) -> Dataset {
        let n = self.len();
        let limit = batch_size.min(n);
        let mut batch = Dataset::with_capacity(self.feature_len, limit);
        if limit == 0 {
            return batch;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // partial Fisher-Yates over the first `limit` positions
        let mut indices: Vec<usize> = (0..n).collect();
        for i in 0..limit {
            let j = i + rng.gen_range(0..n - i);
            indices.swap(i, j);
        }

        for &i in &indices[..limit] {
            let start = i * self.feature_len;
            batch
                .inputs
                .extend_from_slice(&self.inputs[start..start + self.feature_len]);
            batch.targets.push(self.targets[i]);
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(values: Vec<f64>, target: f64) -> Example {
        Example {
            tick: 0,
            player_id: 0,
            features: FeatureVector::from(values),
            target,
        }
    }

    fn counting(rows: usize) -> Dataset {
        let mut ds = Dataset::new(2);
        for i in 0..rows {
            ds.push_row(&[i as f64, i as f64], i as f64).unwrap();
        }
        ds
    }

    #[test]
    fn test_push_and_shape() {
        let mut ds = Dataset::new(3);
        ds.push(example(vec![0.1, 0.2, 1.0], 4.0)).unwrap();
        ds.push(example(vec![0.3, 0.4, 0.0], 8.0)).unwrap();

        assert_eq!(ds.shape(), [2, 3]);
        assert_eq!(ds.inputs(), &[0.1, 0.2, 1.0, 0.3, 0.4, 0.0]);
        assert_eq!(ds.targets(), &[4.0, 8.0]);
        assert_eq!(ds.row(1), Some((&[0.3, 0.4, 0.0][..], 8.0)));
        assert_eq!(ds.row(2), None);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut ds = Dataset::new(3);
        let err = ds.push(example(vec![0.1], 1.0)).unwrap_err();

        assert!(matches!(err, Error::ShapeMismatch { expected: 3, got: 1 }));
        assert!(ds.is_empty());
    }

    #[test]
    fn test_default_adopts_first_row() {
        let mut ds = Dataset::default();
        ds.push_row(&[1.0, 2.0], 0.0).unwrap();

        assert_eq!(ds.feature_len(), 2);
        assert!(ds.push_row(&[1.0], 0.0).is_err());
    }

    #[test]
    fn test_rows_iterate_in_order() {
        let ds = counting(3);
        let targets: Vec<f64> = ds.rows().map(|(_, t)| t).collect();
        assert_eq!(targets, vec![0.0, 1.0, 2.0]);
        assert!(ds.rows().all(|(row, t)| row == [t, t]));
    }

    #[test]
    fn test_validation_split_takes_tail() {
        let ds = counting(10);
        let (train, validation) = ds.validation_split(0.2);

        assert_eq!(train.len(), 8);
        assert_eq!(validation.len(), 2);
        assert_eq!(validation.targets(), &[8.0, 9.0]);
        assert_eq!(train.feature_len(), 2);
    }

    #[test]
    fn test_validation_split_bounds() {
        let ds = counting(5);
        assert_eq!(ds.validation_split(0.0).1.len(), 0);
        assert_eq!(ds.validation_split(1.0).0.len(), 0);
        assert_eq!(ds.validation_split(7.0).1.len(), 5);
    }

    #[test]
    fn test_sample_batch_deterministic() {
        let ds = counting(20);
        let a = ds.sample_batch(5, 12345);
        let b = ds.sample_batch(5, 12345);

        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        // rows stay intact
        assert!(a.rows().all(|(row, t)| row == [t, t]));
    }

    #[test]
    fn test_sample_batch_distinct_rows() {
        let ds = counting(8);
        let batch = ds.sample_batch(100, 1);

        assert_eq!(batch.len(), 8);
        let mut targets = batch.targets().to_vec();
        targets.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(targets, (0..8).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_batch_empty() {
        assert!(counting(4).sample_batch(0, 9).is_empty());
        assert!(Dataset::new(2).sample_batch(4, 9).is_empty());
    }

    #[test]
    fn test_extend() {
        let mut ds = counting(2);
        ds.extend(&counting(3)).unwrap();
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.targets(), &[0.0, 1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_json_round_trip() {
        let ds = counting(3);
        let json = serde_json::to_string(&ds).unwrap();
        assert_eq!(serde_json::from_str::<Dataset>(&json).unwrap(), ds);
    }

    #[test]
    fn test_inconsistent_json_rejected() {
        let json = r#"{"feature_len":3,"inputs":[0.0],"targets":[1.0,2.0]}"#;
        let err = serde_json::from_str::<Dataset>(json).unwrap_err();
        assert!(err.to_string().contains("expected 6"));

        let overflow = format!(
            r#"{{"feature_len":{},"inputs":[],"targets":[1.0,2.0]}}"#,
            usize::MAX
        );
        assert!(serde_json::from_str::<Dataset>(&overflow).is_err());
    }
}
