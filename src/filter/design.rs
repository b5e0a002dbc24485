//! IIR Butterworth low-pass design matching `scipy.signal.butter(..., btype='low')`.
//!
//! Steps (all in zero/pole/gain form until the end):
//!   • analog prototype: poles on the unit circle, `p_k = -exp(iπ m / 2N)`,
//!     `m = -N+1, -N+3, …, N-1`, no zeros, gain 1
//!   • pre-warp the cutoff: `ω = 4 · tan(π · Wn / 2)` (fs = 2)
//!   • low-pass → low-pass: `p ← ω p`, `k ← ω^N`
//!   • bilinear transform: `p ← (4 + p) / (4 − p)`, N zeros at −1,
//!     `k ← k · Re(1 / ∏(4 − p))`
//!   • expand to polynomials `b`, `a`
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Transfer-function coefficients, `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct IirCoeffs {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl IirCoeffs {
    pub fn order(&self) -> usize {
        self.a.len() - 1
    }

    /// Complex frequency response at `w` radians/sample.
    pub fn response(&self, w: f64) -> Complex64 {
        let z_inv = Complex64::from_polar(1.0, -w);
        let eval = |c: &[f64]| {
            c.iter()
                .rev()
                .fold(Complex64::new(0.0, 0.0), |acc, &v| acc * z_inv + v)
        };
        eval(&self.b) / eval(&self.a)
    }
}

/// Design a digital Butterworth low-pass filter.
///
/// `wn` is the cutoff as a fraction of Nyquist and must lie in `(0, 1)`.
pub fn butter_lowpass(order: usize, wn: f64) -> Result<IirCoeffs> {
    if order == 0 {
        return Err(Error::InvalidConfig("filter order must be at least 1".into()));
    }
    if !(wn > 0.0 && wn < 1.0) {
        return Err(Error::InvalidConfig(format!(
            "normalized cutoff must lie in (0, 1), got {wn}"
        )));
    }

    let n = order as f64;
    let fs2 = 4.0;
    let warped = fs2 * (PI * wn / 2.0).tan();

    let poles: Vec<Complex64> = (0..order)
        .map(|k| {
            let m = -(n - 1.0) + 2.0 * k as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n)) * warped
        })
        .collect();

    let denom: Complex64 = poles.iter().map(|&p| fs2 - p).product();
    let gain = warped.powi(order as i32) * (Complex64::new(1.0, 0.0) / denom).re;

    let z_poles: Vec<Complex64> = poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
    let zeros = vec![Complex64::new(-1.0, 0.0); order];

    let b: Vec<f64> = poly(&zeros).iter().map(|c| c.re * gain).collect();
    let a: Vec<f64> = poly(&z_poles).iter().map(|c| c.re).collect();
    Ok(IirCoeffs { b, a })
}

/// Coefficients (highest power first) of the monic polynomial with `roots`.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut c = vec![Complex64::new(1.0, 0.0)];
    for &r in roots {
        let mut next = c.clone();
        next.push(Complex64::new(0.0, 0.0));
        for i in 1..next.len() {
            next[i] -= r * c[i - 1];
        }
        c = next;
    }
    c
}
