//! Common-average reference: subtract the mean across channels at each sample.
//!
//! `data`: [N, C, T]  →  `data[n, c, t] -= mean(data[n, :, t])`
use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayViewMut2, Axis};

pub fn common_average_reference_inplace(data: &mut Array3<f64>) {
    data.axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(|mut trial| reference_trial(&mut trial));
}

/// Reference one `[C, T]` trial.  A trial with no channels is left alone.
pub fn reference_trial(trial: &mut ArrayViewMut2<'_, f64>) {
    let Some(means) = trial.mean_axis(Axis(0)) else {
        return;
    };
    for mut row in trial.rows_mut() {
        row -= &means;
    }
}
