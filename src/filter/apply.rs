//! Zero-phase IIR filtering, matching `scipy.signal.filtfilt` defaults.
//!
//! Each series is extended at both ends by odd reflection of
//! `3 · max(len(a), len(b))` samples, filtered forward with steady-state
//! initial conditions scaled by the first sample, reversed, filtered again
//! the same way, reversed back, and the extension stripped.
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array3, Axis};

use super::design::IirCoeffs;

/// Zero-phase filter every `(trial, channel)` series of `data` ([N, C, T]) in-place.
pub fn filtfilt_inplace(data: &mut Array3<f64>, coeffs: &IirCoeffs) {
    data.axis_iter_mut(Axis(0)).into_par_iter().for_each(|mut trial| {
        for mut row in trial.rows_mut() {
            let filtered = filtfilt(coeffs, &row.to_vec());
            row.assign(&Array1::from(filtered));
        }
    });
}

/// Forward-backward filtering of a single series.  Output length equals input.
pub fn filtfilt(coeffs: &IirCoeffs, x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return vec![];
    }
    let padlen = 3 * coeffs.a.len().max(coeffs.b.len());
    let x_ext = odd_extend(x, padlen);
    let zi = lfilter_zi(coeffs);

    let scaled = |x0: f64| zi.iter().map(|&z| z * x0).collect::<Vec<_>>();

    let mut y = lfilter(coeffs, &x_ext, &scaled(x_ext[0]));
    y.reverse();
    let mut y = lfilter(coeffs, &y, &scaled(y[0]));
    y.reverse();

    let pad = (y.len() - n) / 2;
    y[pad..pad + n].to_vec()
}

/// Direct-form II transposed IIR filter with initial state `zi`.
///
/// `zi.len()` must be `max(len(a), len(b)) - 1`.
pub fn lfilter(coeffs: &IirCoeffs, x: &[f64], zi: &[f64]) -> Vec<f64> {
    let (b, a) = normalized(coeffs);
    let order = b.len() - 1;
    let mut z = zi.to_vec();
    z.resize(order, 0.0);

    let mut y = Vec::with_capacity(x.len());
    for &xn in x {
        let yn = b[0] * xn + z.first().copied().unwrap_or(0.0);
        for i in 0..order {
            let next = if i + 1 < order { z[i + 1] } else { 0.0 };
            z[i] = b[i + 1] * xn + next - a[i + 1] * yn;
        }
        y.push(yn);
    }
    y
}

/// Initial state for a step response in steady state (scipy `lfilter_zi`).
///
/// With unit input and DC gain `g`, the state is
/// `zi[i] = Σ_{j>i} (b[j] − a[j] · g)`.
pub fn lfilter_zi(coeffs: &IirCoeffs) -> Vec<f64> {
    let (b, a) = normalized(coeffs);
    let order = b.len() - 1;
    let gain = b.iter().sum::<f64>() / a.iter().sum::<f64>();

    let mut zi = vec![0.0; order];
    let mut acc = 0.0;
    for i in (0..order).rev() {
        acc += b[i + 1] - a[i + 1] * gain;
        zi[i] = acc;
    }
    zi
}

/// Equal-length `b`, `a` scaled so that `a[0] == 1`.
fn normalized(coeffs: &IirCoeffs) -> (Vec<f64>, Vec<f64>) {
    let n = coeffs.a.len().max(coeffs.b.len());
    let a0 = coeffs.a[0];
    let mut b: Vec<f64> = coeffs.b.iter().map(|v| v / a0).collect();
    let mut a: Vec<f64> = coeffs.a.iter().map(|v| v / a0).collect();
    b.resize(n, 0.0);
    a.resize(n, 0.0);
    (b, a)
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Odd extension (scipy `odd_ext`), with the pad clamped to `len - 1`.
///
/// Left:  `2*x[0]  - x[i]`      for i = pad..=1
/// Right: `2*x[-1] - x[-1-i]`   for i = 1..=pad
fn odd_extend(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let pad = pad.min(n - 1);
    let mut out = Vec::with_capacity(n + 2 * pad);

    for i in (1..=pad).rev() {
        out.push(2.0 * x[0] - x[i]);
    }
    out.extend_from_slice(x);
    let last = x[n - 1];
    for i in 1..=pad {
        out.push(2.0 * last - x[n - 1 - i]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::design::butter_lowpass;

    #[test]
    fn odd_extension_reflects_about_endpoints() {
        let x = [1.0, 2.0, 4.0, 7.0];
        let ext = odd_extend(&x, 2);
        // left: 2*1-4=-2, 2*1-2=0 ; right: 2*7-4=10, 2*7-2=12
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }

    #[test]
    fn odd_extension_clamps_to_signal() {
        let ext = odd_extend(&[3.0, 5.0], 10);
        assert_eq!(ext, vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn steady_state_keeps_constant_constant() {
        let f = butter_lowpass(7, 0.1).unwrap();
        let zi: Vec<f64> = lfilter_zi(&f).iter().map(|z| z * 2.5).collect();
        let y = lfilter(&f, &[2.5; 64], &zi);
        for v in y {
            approx::assert_abs_diff_eq!(v, 2.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn filtfilt_preserves_length_and_dc() {
        let f = butter_lowpass(7, 0.1).unwrap();
        let y = filtfilt(&f, &[-1.5; 300]);
        assert_eq!(y.len(), 300);
        for v in y {
            approx::assert_abs_diff_eq!(v, -1.5, epsilon = 1e-8);
        }
    }

    #[test]
    fn filtfilt_handles_tiny_input() {
        let f = butter_lowpass(7, 0.1).unwrap();
        assert!(filtfilt(&f, &[]).is_empty());
        let y = filtfilt(&f, &[4.0]);
        approx::assert_abs_diff_eq!(y[0], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn filtfilt_has_no_phase_lag() {
        // A slow sine well inside the passband comes back aligned.
        let f = butter_lowpass(7, 0.1).unwrap();
        let x: Vec<f64> = (0..2000)
            .map(|i| (2.0 * std::f64::consts::PI * 5.0 * i as f64 / 1000.0).sin())
            .collect();
        let y = filtfilt(&f, &x);
        for i in 200..1800 {
            approx::assert_abs_diff_eq!(y[i], x[i], epsilon = 1e-3);
        }
    }
}
