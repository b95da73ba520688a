//! Min-max normalization.

use thiserror::Error;

/// Value assigned to every element of a zero-range sequence.
pub const DEGENERATE_MIDPOINT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// A NaN or infinite value reached normalization.
    #[error("invalid feature input: non-finite value {value} at index {index}")]
    InvalidFeatureInput { index: usize, value: f64 },
}

/// Scale `values` into `[0, 1]` by their own min and max.
///
/// When every value is equal the result is all [`DEGENERATE_MIDPOINT`].
/// Non-finite input is rejected rather than propagated. Finite input whose
/// range overflows `f64` is still scaled into `[0, 1]`.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>, FeatureError> {
    let mut out = Vec::with_capacity(values.len());
    normalize_into(values, &mut out)?;
    Ok(out)
}

/// Like [`normalize`], appending into an existing buffer.
///
/// On error nothing is appended.
pub fn normalize_into(values: &[f64], out: &mut Vec<f64>) -> Result<(), FeatureError> {
    let (min, max) = bounds(values)?;
    let range = max - min;
    if range == 0.0 {
        out.extend(std::iter::repeat(DEGENERATE_MIDPOINT).take(values.len()));
    } else if range.is_finite() {
        out.extend(values.iter().map(|v| (v - min) / range));
    } else {
        // max - min overflowed; halving is exact and brings it back in range
        let low = min / 2.0;
        let half_range = max / 2.0 - low;
        out.extend(values.iter().map(|v| (v / 2.0 - low) / half_range));
    }
    Ok(())
}

fn bounds(values: &[f64]) -> Result<(f64, f64), FeatureError> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(FeatureError::InvalidFeatureInput { index, value });
        }
        min = min.min(value);
        max = max.max(value);
    }
    Ok((min, max))
}
