//! Artifact removal by independent component analysis.
//!
//! Each trial (`[C, T]`) is decomposed on its own with FastICA (symmetric
//! update, `logcosh` contrast with α = 1, one component per retained
//! whitening direction) and then rebuilt from its sources:
//!
//! ```text
//!   xc = x − mean                      per channel
//!   C  = xc xcᵀ / T  = E Λ Eᵀ           drop directions with λ ≈ 0
//!   K  = Λ^{-1/2} Eᵀ,   z = K xc        whitened, unit variance
//!   W  ← fixed point on z               orthogonal
//!   s  = W K xc                         sources
//!   x̂  = E Λ^{1/2} Wᵀ s + mean          mixing = pinv(W K)
//! ```
//!
//! With no rejection the round trip reproduces the trial up to rounding
//! (minus any zero-variance direction, e.g. the one removed by the average
//! reference).  Setting [`IcaConfig::reject_kurtosis`] zeroes sources whose
//! absolute excess kurtosis exceeds the threshold before rebuilding.
pub mod linalg;

use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::IcaConfig;
use linalg::{sym_decorrelate, symmetric_eigen};

/// Whitening directions with variance below this fraction of the trial's
/// energy are treated as degenerate.
const RANK_RTOL: f64 = 1e-10;

/// A fitted per-trial decomposition.
#[derive(Debug, Clone)]
pub struct IcaModel {
    /// Per-channel mean, `[C]`.
    pub mean: Array1<f64>,
    /// `[k, C]`, maps centred channels to sources.
    pub unmixing: Array2<f64>,
    /// `[C, k]`, maps sources back to channels.
    pub mixing: Array2<f64>,
    pub n_iter: usize,
    pub converged: bool,
}

impl IcaModel {
    pub fn n_components(&self) -> usize {
        self.unmixing.nrows()
    }

    /// Sources `[k, T]` of a `[C, T]` trial.
    pub fn sources(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        let xc = &x - &self.mean.view().insert_axis(Axis(1));
        self.unmixing.dot(&xc)
    }

    /// Channels `[C, T]` rebuilt from sources `[k, T]`.
    pub fn reconstruct(&self, sources: &Array2<f64>) -> Array2<f64> {
        self.mixing.dot(sources) + &self.mean.view().insert_axis(Axis(1))
    }
}

/// Fit FastICA to one `[C, T]` trial.
///
/// Returns `None` when the trial has no non-degenerate direction (e.g. all
/// channels constant) or fewer than two samples.
pub fn fit(x: ArrayView2<'_, f64>, cfg: &IcaConfig, seed: u64) -> Option<IcaModel> {
    let (n_ch, n_t) = x.dim();
    if n_ch == 0 || n_t < 2 {
        return None;
    }

    let mean = x.mean_axis(Axis(1))?;
    let xc = &x - &mean.view().insert_axis(Axis(1));
    let cov = xc.dot(&xc.t()) / n_t as f64;

    let energy = x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64;
    let (eigvals, eigvecs) = symmetric_eigen(&cov);
    let floor = RANK_RTOL * energy.max(eigvals[0]);
    let k = eigvals.iter().take_while(|&&l| l > floor).count();
    if k == 0 {
        return None;
    }

    let lambda = eigvals.slice(ndarray::s![..k]).to_owned();
    let basis = eigvecs.slice(ndarray::s![.., ..k]).to_owned(); // [C, k]
    let inv_sqrt = lambda.mapv(|l| 1.0 / l.sqrt());
    let sqrt = lambda.mapv(f64::sqrt);

    // K = Λ^{-1/2} Eᵀ : [k, C]
    let whitening = &basis.t() * &inv_sqrt.view().insert_axis(Axis(1));
    let z = whitening.dot(&xc);

    let mut rng = StdRng::seed_from_u64(seed);
    let w_init = Array2::from_shape_fn((k, k), |_| rng.random_range(-1.0..1.0));
    let (w, n_iter, converged) = fixed_point(&z, sym_decorrelate(&w_init), cfg);

    let unmixing = w.dot(&whitening);
    // E Λ^{1/2} Wᵀ : [C, k]
    let mixing = (&basis * &sqrt.view().insert_axis(Axis(0))).dot(&w.t());

    Some(IcaModel { mean, unmixing, mixing, n_iter, converged })
}

/// Symmetric FastICA iterations on whitened data `z` (`[k, T]`).
fn fixed_point(z: &Array2<f64>, mut w: Array2<f64>, cfg: &IcaConfig) -> (Array2<f64>, usize, bool) {
    let n_t = z.ncols() as f64;
    for iter in 1..=cfg.max_iter {
        let g = w.dot(z).mapv(f64::tanh);
        let g_prime = g.mapv(|v| 1.0 - v * v).mean_axis(Axis(1)).unwrap_or_else(|| Array1::zeros(w.nrows()));
        let w_next = g.dot(&z.t()) / n_t - &(&w * &g_prime.insert_axis(Axis(1)));
        let w_next = sym_decorrelate(&w_next);

        let lim = w_next
            .dot(&w.t())
            .diag()
            .iter()
            .map(|d| (d.abs() - 1.0).abs())
            .fold(0.0_f64, f64::max);
        w = w_next;
        if lim < cfg.tol {
            return (w, iter, true);
        }
    }
    (w, cfg.max_iter, false)
}

/// Excess kurtosis of a series (0 for a Gaussian, 0 for a constant).
pub fn excess_kurtosis(x: ArrayView1<'_, f64>) -> f64 {
    let n = x.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let m = x.sum() / n;
    let (m2, m4) = x.iter().fold((0.0, 0.0), |(a, b), &v| {
        let d2 = (v - m) * (v - m);
        (a + d2, b + d2 * d2)
    });
    let (m2, m4) = (m2 / n, m4 / n);
    if m2 == 0.0 {
        return 0.0;
    }
    m4 / (m2 * m2) - 3.0
}

/// Decompose and rebuild one trial.  Degenerate trials come back unchanged.
pub fn clean_trial(x: ArrayView2<'_, f64>, cfg: &IcaConfig, seed: u64) -> (Array2<f64>, TrialReport) {
    let Some(model) = fit(x, cfg, seed) else {
        return (x.to_owned(), TrialReport::default());
    };
    let mut sources = model.sources(x);
    let mut rejected = 0;
    if let Some(threshold) = cfg.reject_kurtosis {
        for mut row in sources.rows_mut() {
            if excess_kurtosis(row.view()).abs() > threshold {
                row.fill(0.0);
                rejected += 1;
            }
        }
    }
    let report = TrialReport {
        fitted: true,
        components: model.n_components(),
        rejected,
        n_iter: model.n_iter,
        converged: model.converged,
    };
    (model.reconstruct(&sources), report)
}

/// What happened to one trial in the ICA stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialReport {
    pub fitted: bool,
    pub components: usize,
    pub rejected: usize,
    pub n_iter: usize,
    pub converged: bool,
}

/// Stage 3 over a `[N, C, T]` batch.  Trial `i` is seeded with `cfg.seed + i`.
pub fn remove_artifacts(data: &Array3<f64>, cfg: &IcaConfig) -> Array3<f64> {
    let mut out = data.clone();
    let reports: Vec<TrialReport> = out
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .map(|(i, mut trial)| {
            let (cleaned, report) = clean_trial(trial.view(), cfg, cfg.seed.wrapping_add(i as u64));
            trial.assign(&cleaned);
            report
        })
        .collect();

    let not_converged = reports.iter().filter(|r| r.fitted && !r.converged).count();
    if not_converged > 0 {
        tracing::warn!(
            trials = not_converged,
            max_iter = cfg.max_iter,
            "FastICA did not converge; consider raising ica.max_iter or ica.tol"
        );
    }
    let degenerate = reports.iter().filter(|r| !r.fitted).count();
    let rejected: usize = reports.iter().map(|r| r.rejected).sum();
    tracing::debug!(trials = reports.len(), degenerate, rejected, "ICA stage done");
    out
}
