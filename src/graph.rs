//! Channel adjacency for a conditioned trial.
//!
//! The dataset treats adjacency as a pure function `[C, T] → [C, C]` behind
//! [`AdjacencyFn`], so any connectivity measure can be plugged in.  Plain
//! functions and closures work directly:
//!
//! ```
//! use eegtrial::graph::AdjacencyFn;
//! use ndarray::{Array2, ArrayView2};
//!
//! fn identity(trial: ArrayView2<f64>) -> Array2<f64> {
//!     Array2::eye(trial.nrows())
//! }
//! let adj = identity.adjacency(Array2::zeros((3, 10)).view());
//! assert_eq!(adj.dim(), (3, 3));
//! ```
use ndarray::{Array2, ArrayView2, Axis};

/// Computes a `[C, C]` adjacency matrix from a `[C, T]` trial.
pub trait AdjacencyFn: Send + Sync {
    fn adjacency(&self, trial: ArrayView2<'_, f64>) -> Array2<f64>;
}

impl<F> AdjacencyFn for F
where
    F: Fn(ArrayView2<'_, f64>) -> Array2<f64> + Send + Sync,
{
    fn adjacency(&self, trial: ArrayView2<'_, f64>) -> Array2<f64> {
        self(trial)
    }
}

/// Absolute Pearson correlation between channels.
///
/// The diagonal is 1; pairs involving a zero-variance channel are 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonAdjacency;

impl AdjacencyFn for PearsonAdjacency {
    fn adjacency(&self, trial: ArrayView2<'_, f64>) -> Array2<f64> {
        let n_ch = trial.nrows();
        let Some(mean) = trial.mean_axis(Axis(1)) else {
            return Array2::eye(n_ch);
        };
        let xc = &trial - &mean.insert_axis(Axis(1));
        let cov = xc.dot(&xc.t());
        let std = cov.diag().mapv(f64::sqrt);

        Array2::from_shape_fn((n_ch, n_ch), |(i, j)| {
            if i == j {
                1.0
            } else if std[i] == 0.0 || std[j] == 0.0 {
                0.0
            } else {
                (cov[[i, j]] / (std[i] * std[j])).abs().min(1.0)
            }
        })
    }
}
