//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter for trial extraction and
//! the five-stage conditioning chain.  All fields have defaults matching the
//! recordings the pipeline was built for (1 kHz EEG, 4 s trials).
use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// Configuration for extraction and conditioning.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use eegtrial::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     target_samples: 3000,   // 3 s trials instead of 4 s
///     downsample:     4,      // keep every 4th sample
///     ..PipelineConfig::default()
/// };
/// assert_eq!(cfg.output_samples(), 750);
/// ```
///
/// It can also be read from a JSON file; missing keys fall back to the
/// defaults (see [`PipelineConfig::from_json_file`]).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sampling rate of the recordings in Hz.
    ///
    /// Only used to express the low-pass cutoff as a fraction of Nyquist.
    ///
    /// Default: `1000.0` Hz.
    pub sfreq: f64,

    /// Cutoff of the zero-phase Butterworth low-pass filter in Hz.
    ///
    /// Must lie strictly inside `(0, sfreq / 2)`.
    ///
    /// Default: `50.0` Hz.
    pub lowpass_hz: f64,

    /// Butterworth filter order.
    ///
    /// The filter runs forward and backward, so the effective magnitude
    /// response is that of a filter of twice this order.
    ///
    /// Default: `7`.
    pub filter_order: usize,

    /// Length every extracted trial is padded or truncated to, in samples.
    ///
    /// Default: `4000` (4 s at 1 kHz).
    pub target_samples: usize,

    /// Decimation factor: keep every `downsample`-th sample.
    ///
    /// Default: `2`.
    pub downsample: usize,

    /// Output range of the per-trial min-max normalisation, `(low, high)`.
    ///
    /// Default: `(0.0, 1.0)`.
    pub feature_range: (f64, f64),

    /// Extension (without the dot) of recording files inside a session
    /// directory.  Matched case-insensitively.
    ///
    /// Default: `"csv"`.
    pub file_extension: String,

    /// Independent component stage settings.
    pub ica: IcaConfig,
}

/// Settings for the per-trial FastICA round trip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IcaConfig {
    /// Maximum fixed-point iterations per trial.  Default: `200`.
    pub max_iter: usize,

    /// Convergence tolerance on the unmixing update.  Default: `1e-4`.
    pub tol: f64,

    /// Base seed for the random starting rotation.  Trial `k` uses
    /// `seed + k`, so results do not depend on thread scheduling.
    ///
    /// Default: `0`.
    pub seed: u64,

    /// Artifact rejection threshold on absolute excess kurtosis.
    ///
    /// `None` reconstructs every component (the decomposition is then a
    /// near-identity round trip).  `Some(t)` zeroes components with
    /// `|kurtosis| > t` before reconstruction.
    ///
    /// Default: `None`.
    pub reject_kurtosis: Option<f64>,
}

impl Default for IcaConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol: 1e-4,
            seed: 0,
            reject_kurtosis: None,
        }
    }
}

impl Default for PipelineConfig {
    /// 1 kHz · 50 Hz order-7 low-pass · 4000-sample trials · ÷2 · `[0, 1]`.
    fn default() -> Self {
        Self {
            sfreq: 1000.0,
            lowpass_hz: 50.0,
            filter_order: 7,
            target_samples: 4000,
            downsample: 2,
            feature_range: (0.0, 1.0),
            file_extension: "csv".to_string(),
            ica: IcaConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let cfg: PipelineConfig = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(Error::InvalidConfig(msg));
        if !(self.sfreq > 0.0) {
            return bad(format!("sfreq must be positive, got {}", self.sfreq));
        }
        let nyquist = self.sfreq / 2.0;
        if !(self.lowpass_hz > 0.0 && self.lowpass_hz < nyquist) {
            return bad(format!(
                "lowpass_hz must lie in (0, {nyquist}), got {}",
                self.lowpass_hz
            ));
        }
        if self.filter_order == 0 {
            return bad("filter_order must be at least 1".into());
        }
        if self.target_samples == 0 {
            return bad("target_samples must be at least 1".into());
        }
        if self.downsample == 0 {
            return bad("downsample must be at least 1".into());
        }
        let (lo, hi) = self.feature_range;
        if !(lo < hi) {
            return bad(format!("feature_range must satisfy low < high, got ({lo}, {hi})"));
        }
        if self.ica.max_iter == 0 {
            return bad("ica.max_iter must be at least 1".into());
        }
        if !(self.ica.tol > 0.0) {
            return bad(format!("ica.tol must be positive, got {}", self.ica.tol));
        }
        Ok(())
    }

    /// Low-pass cutoff as a fraction of the Nyquist frequency.
    pub fn normalized_cutoff(&self) -> f64 {
        self.lowpass_hz / (self.sfreq / 2.0)
    }

    /// Samples per trial after decimation: `ceil(target_samples / downsample)`.
    ///
    /// ```
    /// use eegtrial::PipelineConfig;
    /// assert_eq!(PipelineConfig::default().output_samples(), 2000);
    /// ```
    pub fn output_samples(&self) -> usize {
        self.target_samples.div_ceil(self.downsample)
    }
}
