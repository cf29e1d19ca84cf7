//! Regularization paths.

use serde::{Deserialize, Serialize};

use crate::error::{GlassoError, Result};

/// A strictly increasing, non-empty sequence of positive penalty values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct RegularizationPath {
    values: Vec<f64>,
}

impl RegularizationPath {
    /// Build a path from arbitrary values. They are sorted ascending and
    /// exact duplicates removed.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the input is empty or holds a value that is not
    /// finite and positive.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self> {
        let mut values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Err(GlassoError::InvalidArgument(
                "regularization path is empty".into(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(GlassoError::InvalidArgument(format!(
                "regularization values must be finite and positive, got {bad}"
            )));
        }

        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        Ok(RegularizationPath { values })
    }

    /// `count` evenly spaced values from `start` to `stop` inclusive.
    pub fn linspace(start: f64, stop: f64, count: usize) -> Result<Self> {
        Self::new(spaced(start, stop, count)?)
    }

    /// `count` values from `start` to `stop` inclusive, evenly spaced on a
    /// log scale.
    pub fn geometric(start: f64, stop: f64, count: usize) -> Result<Self> {
        if !(start > 0.0 && stop > 0.0) {
            return Err(GlassoError::InvalidArgument(
                "geometric path bounds must be positive".into(),
            ));
        }
        Self::new(spaced(start.ln(), stop.ln(), count)?.into_iter().map(f64::exp))
    }

    /// The penalty values in increasing order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of path positions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; paths are never empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the penalty values.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

fn spaced(start: f64, stop: f64, count: usize) -> Result<Vec<f64>> {
    match count {
        0 => Err(GlassoError::InvalidArgument(
            "path needs at least one value".into(),
        )),
        1 => Ok(vec![start]),
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            Ok((0..count).map(|i| start + step * i as f64).collect())
        }
    }
}

impl TryFrom<Vec<f64>> for RegularizationPath {
    type Error = GlassoError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<RegularizationPath> for Vec<f64> {
    fn from(path: RegularizationPath) -> Self {
        path.values
    }
}
