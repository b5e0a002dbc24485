//! # eegtrial — event-locked EEG trial extraction and conditioning
//!
//! `eegtrial` turns continuous multi-channel EEG recordings with an embedded
//! marker column into fixed-length, labelled, conditioned trials ready for
//! model training.  The DSP stages follow SciPy / scikit-learn semantics
//! (`butter` + `filtfilt`, FastICA) in pure Rust on top of
//! [ndarray](https://crates.io/crates/ndarray).
//!
//! ## Pipeline overview
//!
//! ```text
//! root/<session>/<recording>.csv
//!   │
//!   ├─ table::CsvTableReader      channels + sparse marker column
//!   ├─ extract::extract_trials    start marker → next event, label k events back
//!   ├─ extract::fit_length        zero-pad / truncate → target_samples
//!   │      (all files concatenated: [N, C, target_samples])
//!   ├─ filter (Butterworth LP)    order 7, 50 Hz @ 1 kHz, forward-backward
//!   ├─ reference                  per-sample channel mean removed
//!   ├─ ica                        per-trial FastICA decompose + rebuild
//!   ├─ downsample                 keep every 2nd sample
//!   └─ normalize (min-max)        per trial, per channel → [0, 1]
//!        │
//!        └─→ TrialDataset::get(k) = ([C, T'] f32, [C, C] f32, label − 1)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use eegtrial::{ConditionProfile, PipelineConfig, TrialDataset};
//!
//! let profile = ConditionProfile::from_tags("AK-SREP", "reading").unwrap();
//! let cfg     = PipelineConfig::default();
//! let dataset = TrialDataset::build("data/processed", &profile, &cfg).unwrap();
//!
//! for k in 0..dataset.len() {
//!     let item = dataset.get(k).unwrap();
//!     println!("trial {k}: {:?} label {}", item.features.dim(), item.label);
//! }
//! ```
//!
//! ## Running individual steps
//!
//! Each conditioning stage is also exposed on its own and works on a
//! `[N, C, T]` batch:
//!
//! ```no_run
//! use eegtrial::filter::{butter_lowpass, filtfilt_inplace};
//! use eegtrial::reference::common_average_reference_inplace;
//! use eegtrial::ica::remove_artifacts;
//! use eegtrial::downsample::downsample;
//! use eegtrial::normalize::min_max_inplace;
//! use eegtrial::IcaConfig;
//! use ndarray::Array3;
//!
//! let mut data: Array3<f64> = Array3::zeros((8, 12, 4000));
//!
//! let lp = butter_lowpass(7, 50.0 / 500.0).unwrap();
//! filtfilt_inplace(&mut data, &lp);
//! common_average_reference_inplace(&mut data);
//! let data = remove_artifacts(&data, &IcaConfig::default());
//! let mut data = downsample(&data, 2);
//! min_max_inplace(&mut data, (0.0, 1.0));
//! ```

pub mod config;
pub mod dataset;
pub mod downsample;
pub mod error;
pub mod extract;
pub mod filter;
pub mod graph;
pub mod ica;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod profile;
pub mod reference;
pub mod table;

use ndarray::Array3;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use config::{IcaConfig, PipelineConfig};
pub use dataset::{collect_corpus, discover_sessions, Corpus, Session, TrialDataset, TrialItem};
pub use error::{Error, Result};
pub use extract::{event_stream, extract_trials, fit_length, Event, Extraction, SkipReason, SkippedTrial};
pub use graph::{AdjacencyFn, PearsonAdjacency};
pub use io::{write_dataset, StWriter};
pub use profile::{ClassType, ConditionProfile, TrialType};
pub use table::{CsvTableReader, RecordingTable, TableReader};

/// Run the **five conditioning stages** over a whole `[N, C, T]` corpus.
///
/// # Pipeline steps
///
/// 1. Zero-phase Butterworth low-pass ([`PipelineConfig::filter_order`],
///    [`PipelineConfig::lowpass_hz`] at [`PipelineConfig::sfreq`]).
/// 2. Common-average reference.
/// 3. Per-trial ICA decomposition and reconstruction ([`PipelineConfig::ica`]).
/// 4. Keep every [`PipelineConfig::downsample`]-th sample.
/// 5. Per-trial, per-channel min-max scaling to [`PipelineConfig::feature_range`].
///
/// Trial order and count are preserved.  The output has
/// [`PipelineConfig::output_samples`] samples per trial when the input has
/// `target_samples`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `cfg` fails validation.
///
/// # Examples
///
/// ```
/// use eegtrial::{condition, PipelineConfig};
/// use ndarray::Array3;
///
/// let data = Array3::from_shape_fn((2, 3, 400), |(n, c, t)| ((n + c * t) as f64).sin());
/// let out  = condition(data, &PipelineConfig::default()).unwrap();
/// assert_eq!(out.dim(), (2, 3, 200));
/// ```
pub fn condition(mut trials: Array3<f64>, cfg: &PipelineConfig) -> Result<Array3<f64>> {
    cfg.validate()?;
    filter::lowpass_inplace(&mut trials, cfg)?;
    reference::common_average_reference_inplace(&mut trials);
    let trials = ica::remove_artifacts(&trials, &cfg.ica);
    let mut trials = downsample::downsample(&trials, cfg.downsample);
    normalize::min_max_inplace(&mut trials, cfg.feature_range);
    Ok(trials)
}

/// Every intermediate of [`condition`], in stage order.
#[derive(Debug, Clone)]
pub struct ConditionSteps {
    pub lowpass: Array3<f64>,
    pub referenced: Array3<f64>,
    pub ica: Array3<f64>,
    pub downsampled: Array3<f64>,
    pub normalized: Array3<f64>,
}

/// Like [`condition`] but keeps the output of each stage (five copies of
/// the batch; meant for inspection, not whole corpora).
pub fn condition_steps(mut trials: Array3<f64>, cfg: &PipelineConfig) -> Result<ConditionSteps> {
    cfg.validate()?;

    // 1. Low-pass.
    filter::lowpass_inplace(&mut trials, cfg)?;
    let lowpass = trials.clone();

    // 2. Common-average reference.
    reference::common_average_reference_inplace(&mut trials);
    let referenced = trials;

    // 3. ICA round trip.
    let ica = ica::remove_artifacts(&referenced, &cfg.ica);

    // 4. Decimate.
    let downsampled = downsample::downsample(&ica, cfg.downsample);

    // 5. Min-max.
    let mut normalized = downsampled.clone();
    normalize::min_max_inplace(&mut normalized, cfg.feature_range);

    Ok(ConditionSteps { lowpass, referenced, ica, downsampled, normalized })
}
