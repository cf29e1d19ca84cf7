//! Connectivity of the graph implied by a precision matrix.

use std::collections::VecDeque;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{GlassoError, Result};

/// Whether every node is reachable from node 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Every node is reachable from node 0.
    Connected,
    /// At least one node is unreachable from node 0.
    Disconnected,
}

impl Connectivity {
    /// Numeric indicator: `1` for connected, `2` for disconnected.
    pub fn indicator(self) -> u8 {
        match self {
            Connectivity::Connected => 1,
            Connectivity::Disconnected => 2,
        }
    }

    /// Returns true for [`Connectivity::Connected`].
    pub fn is_connected(self) -> bool {
        self == Connectivity::Connected
    }
}

/// Unweighted undirected adjacency: `i ~ j` iff `i ≠ j` and either
/// `|m[i,j]|` or `|m[j,i]|` exceeds `threshold`.
///
/// The graph is symmetrized even when `m` is not, so reachability is
/// undirected. A single-sided entry of a slightly asymmetric estimate still
/// links both nodes, where a directed reading would only link one way.
pub fn adjacency(m: &DMatrix<f64>, threshold: f64) -> Result<DMatrix<u8>> {
    if !m.is_square() {
        return Err(GlassoError::shape((m.nrows(), m.nrows()), m.shape()));
    }
    let p = m.nrows();
    Ok(DMatrix::from_fn(p, p, |i, j| {
        u8::from(i != j && (m[(i, j)].abs() > threshold || m[(j, i)].abs() > threshold))
    }))
}

/// Check whether the graph of `m` thresholded at `threshold` is connected.
///
/// Breadth-first search from node 0 over [`adjacency`].
///
/// # Errors
///
/// `ShapeMismatch` for a non-square matrix, `InvalidArgument` for an empty
/// one or a NaN threshold.
pub fn connectivity(m: &DMatrix<f64>, threshold: f64) -> Result<Connectivity> {
    if threshold.is_nan() {
        return Err(GlassoError::InvalidArgument("threshold is NaN".into()));
    }
    let adj = adjacency(m, threshold)?;
    let p = adj.nrows();
    if p == 0 {
        return Err(GlassoError::InvalidArgument(
            "connectivity of an empty graph is undefined".into(),
        ));
    }

    let mut seen = vec![false; p];
    let mut queue = VecDeque::from([0]);
    seen[0] = true;
    let mut reached = 1;

    while let Some(node) = queue.pop_front() {
        for next in 0..p {
            if adj[(node, next)] == 1 && !seen[next] {
                seen[next] = true;
                reached += 1;
                queue.push_back(next);
            }
        }
    }

    Ok(if reached == p {
        Connectivity::Connected
    } else {
        Connectivity::Disconnected
    })
}
