//! Per-trial, per-channel min-max scaling.
//!
//! For every `(trial, channel)` series:
//!   range = max − min, or 1 when the series is constant
//!   x     = (x − min) / range · (high − low) + low
//!
//! A constant series therefore maps to `low`, never NaN.  The check is exact:
//! a channel that is constant on disk but picked up rounding noise in the
//! filter or reference (range around 1e-16) is stretched to the full
//! `[low, high]` like any other series.
use ndarray::parallel::prelude::*;
use ndarray::{Array3, Axis};

pub fn min_max_inplace(data: &mut Array3<f64>, feature_range: (f64, f64)) {
    let (low, high) = feature_range;
    let span = high - low;
    data.axis_iter_mut(Axis(0)).into_par_iter().for_each(|mut trial| {
        for mut row in trial.rows_mut() {
            let (min, max) = row
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            let mut range = max - min;
            if range == 0.0 {
                range = 1.0;
            }
            row.mapv_inplace(|v| (v - min) / range * span + low);
        }
    });
}
