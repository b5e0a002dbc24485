//! Strided decimation along the time axis.
//!
//! Keeps samples `0, N, 2N, …` with no further anti-aliasing; the low-pass
//! stage has already band-limited the signal.
use ndarray::{s, Array3};

/// `[N, C, T]` → `[N, C, ceil(T / factor)]`.
///
/// # Panics
///
/// Panics if `factor == 0`; [`PipelineConfig::validate`](crate::PipelineConfig::validate)
/// rejects that before the pipeline runs.
pub fn downsample(data: &Array3<f64>, factor: usize) -> Array3<f64> {
    assert!(factor > 0, "downsample factor must be at least 1");
    let step = factor as isize;
    data.slice(s![.., .., ..;step]).to_owned()
}
