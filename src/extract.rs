//! Event-locked trial extraction.
//!
//! The marker column is reduced to an event stream (sample index + code).
//! Every start marker opens a trial that runs, inclusive, to the sample of
//! the next event.  The label is the code `label_offset` events before the
//! start marker.  Each trial is then padded with trailing zeros or truncated
//! to `target_samples`.
use ndarray::{s, Array2};

use crate::error::Result;
use crate::profile::ConditionProfile;
use crate::table::RecordingTable;

/// One non-empty marker cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub sample: usize,
    pub code: i64,
}

/// Why a start marker did not produce a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The start marker is the first event; nothing precedes it.
    LeadingStart,
    /// No event follows the start marker, so the span never closes.
    Dangling,
    /// The label would sit `offset` events back, before the stream begins.
    LabelOutOfRange { offset: usize },
}

/// A start marker that was dropped, with its position in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedTrial {
    pub event_index: usize,
    pub sample: usize,
    pub reason: SkipReason,
}

/// Trials of one recording, `[C, target_samples]` each, with raw labels.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub trials: Vec<Array2<f64>>,
    pub labels: Vec<i64>,
    pub skipped: Vec<SkippedTrial>,
}

/// Every sample that carries a marker, in table order.
pub fn event_stream(table: &RecordingTable) -> Vec<Event> {
    table
        .markers()
        .iter()
        .enumerate()
        .filter_map(|(sample, m)| m.map(|code| Event { sample, code }))
        .collect()
}

/// Extract all trials of `table` under `profile`.
///
/// Fails only if a selected electrode is missing from the table.  Start
/// markers that cannot form a trial are listed in [`Extraction::skipped`].
pub fn extract_trials(
    table: &RecordingTable,
    profile: &ConditionProfile,
    target_samples: usize,
) -> Result<Extraction> {
    let columns = profile
        .electrodes
        .iter()
        .map(|name| table.channel(name))
        .collect::<Result<Vec<_>>>()?;

    let events = event_stream(table);
    let mut out = Extraction::default();

    for (i, ev) in events.iter().enumerate() {
        if ev.code != profile.start_marker {
            continue;
        }
        let skip = |reason| SkippedTrial { event_index: i, sample: ev.sample, reason };

        if i == 0 {
            tracing::debug!(
                path = %table.path().display(),
                sample = ev.sample,
                "start marker is the first event"
            );
            out.skipped.push(skip(SkipReason::LeadingStart));
            continue;
        }
        let Some(label_idx) = i.checked_sub(profile.label_offset) else {
            tracing::warn!(
                path = %table.path().display(),
                sample = ev.sample,
                event_index = i,
                offset = profile.label_offset,
                "label lies before the first event, trial skipped"
            );
            let offset = profile.label_offset;
            out.skipped.push(skip(SkipReason::LabelOutOfRange { offset }));
            continue;
        };
        let Some(end) = events.get(i + 1) else {
            tracing::debug!(
                path = %table.path().display(),
                sample = ev.sample,
                "start marker has no closing event"
            );
            out.skipped.push(skip(SkipReason::Dangling));
            continue;
        };

        // Closed range [start, end].
        let span = end.sample - ev.sample + 1;
        let mut trial = Array2::<f64>::zeros((columns.len(), span));
        for (mut row, col) in trial.rows_mut().into_iter().zip(&columns) {
            row.assign(&col.slice(s![ev.sample..=end.sample]));
        }

        out.trials.push(fit_length(trial, target_samples));
        out.labels.push(events[label_idx].code);
    }

    Ok(out)
}

/// Pad with trailing zeros or truncate trailing samples to `target` columns.
pub fn fit_length(trial: Array2<f64>, target: usize) -> Array2<f64> {
    let (n_ch, n_t) = trial.dim();
    if n_t == target {
        return trial;
    }
    if n_t > target {
        return trial.slice(s![.., ..target]).to_owned();
    }
    let mut out = Array2::<f64>::zeros((n_ch, target));
    out.slice_mut(s![.., ..n_t]).assign(&trial);
    out
}
