//! IIR filter design and zero-phase application.
//!
//! - [`design`]: Butterworth low-pass design, matching
//!   `scipy.signal.butter(order, Wn, btype='low')`.
//! - [`apply`]: forward-backward filtering, matching `scipy.signal.filtfilt`
//!   with its default odd padding.

pub mod apply;
pub mod design;

pub use apply::{filtfilt, filtfilt_inplace, lfilter, lfilter_zi};
pub use design::{butter_lowpass, IirCoeffs};

use ndarray::Array3;

use crate::config::PipelineConfig;
use crate::error::Result;

/// Stage 1: zero-phase Butterworth low-pass over a `[N, C, T]` batch.
pub fn lowpass_inplace(data: &mut Array3<f64>, cfg: &PipelineConfig) -> Result<()> {
    let coeffs = butter_lowpass(cfg.filter_order, cfg.normalized_cutoff())?;
    filtfilt_inplace(data, &coeffs);
    Ok(())
}
