//! Corpus assembly and random access.
//!
//! ```text
//! root/
//!   session_01/  rec_a.csv  rec_b.csv
//!   session_02/  rec_a.csv
//! ```
//!
//! Sessions are visited in lexicographic order, files inside a session
//! likewise.  Every file is extracted independently (in parallel), the
//! results are concatenated in that order, and the whole corpus is then
//! conditioned once.
use ndarray::{Array2, Array3, ArrayView3, Axis};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::extract::{extract_trials, Extraction, SkippedTrial};
use crate::graph::{AdjacencyFn, PearsonAdjacency};
use crate::profile::ConditionProfile;
use crate::table::{CsvTableReader, TableReader};

/// One recording sitting: a directory and its recording files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub path: PathBuf,
    pub files: Vec<PathBuf>,
}

/// List session subdirectories of `root` and their recording files, sorted.
///
/// Files match `extension` case-insensitively.  A session without any
/// matching file is an error.
pub fn discover_sessions(root: &Path, extension: &str) -> Result<Vec<Session>> {
    let mut dirs = sorted_entries(root)?;
    dirs.retain(|p| p.is_dir());

    dirs.into_iter()
        .map(|path| {
            let mut files = sorted_entries(&path)?;
            files.retain(|f| {
                f.is_file()
                    && f.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
            });
            if files.is_empty() {
                return Err(Error::EmptySession { path });
            }
            Ok(Session { path, files })
        })
        .collect()
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = std::fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| Error::io(dir, e)))
        .collect::<Result<Vec<_>>>()?;
    out.sort();
    Ok(out)
}

/// All extracted trials before conditioning.
#[derive(Debug, Clone)]
pub struct Corpus {
    /// `[N, C, target_samples]`
    pub trials: Array3<f64>,
    /// Raw marker codes, one per trial.
    pub labels: Vec<i64>,
    /// Start markers that produced no trial, with the file they came from.
    pub skipped: Vec<(PathBuf, SkippedTrial)>,
}

impl Corpus {
    /// Concatenate per-file extractions in the given order.
    pub fn from_extractions(
        parts: Vec<(PathBuf, Extraction)>,
        n_channels: usize,
        target_samples: usize,
    ) -> Result<Self> {
        let n: usize = parts.iter().map(|(_, e)| e.trials.len()).sum();
        let mut trials = Array3::<f64>::zeros((n, n_channels, target_samples));
        let mut labels = Vec::with_capacity(n);
        let mut skipped = Vec::new();

        let mut slots = trials.axis_iter_mut(Axis(0));
        for (path, ex) in parts {
            for trial in &ex.trials {
                if trial.dim() != (n_channels, target_samples) {
                    return Err(Error::malformed(
                        &path,
                        format!(
                            "trial shape {:?}, expected ({n_channels}, {target_samples})",
                            trial.dim()
                        ),
                    ));
                }
                if let Some(mut slot) = slots.next() {
                    slot.assign(trial);
                }
            }
            labels.extend(ex.labels);
            skipped.extend(ex.skipped.into_iter().map(|s| (path.clone(), s)));
        }
        drop(slots);

        Ok(Self { trials, labels, skipped })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Load and extract every file of every session, keeping session-then-file order.
pub fn collect_corpus(
    sessions: &[Session],
    reader: &dyn TableReader,
    profile: &ConditionProfile,
    cfg: &PipelineConfig,
) -> Result<Corpus> {
    let mut parts = Vec::new();
    for session in sessions {
        let extracted = session
            .files
            .par_iter()
            .map(|path| {
                let table = reader.load(path)?;
                let ex = extract_trials(&table, profile, cfg.target_samples)?;
                Ok((path.clone(), ex))
            })
            .collect::<Result<Vec<_>>>()?;

        let n_trials: usize = extracted.iter().map(|(_, e)| e.trials.len()).sum();
        tracing::info!(
            session = %session.path.display(),
            files = session.files.len(),
            trials = n_trials,
            "session extracted"
        );
        parts.extend(extracted);
    }
    Corpus::from_extractions(parts, profile.n_channels(), cfg.target_samples)
}

/// One dataset item.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialItem {
    /// `[C, T']`
    pub features: Array2<f32>,
    /// `[C, C]`
    pub adjacency: Array2<f32>,
    /// Raw marker code minus one.  Codes start at 1, so this is the
    /// zero-based class; a raw code of 0 is passed through as −1, not
    /// skipped or clamped.
    pub label: i64,
}

/// Conditioned trials with random access.
pub struct TrialDataset<G = PearsonAdjacency> {
    features: Array3<f64>,
    labels: Vec<i64>,
    skipped: Vec<(PathBuf, SkippedTrial)>,
    graph: G,
}

impl TrialDataset<PearsonAdjacency> {
    /// Build from a directory of sessions with the CSV reader and Pearson adjacency.
    pub fn build(root: impl AsRef<Path>, profile: &ConditionProfile, cfg: &PipelineConfig) -> Result<Self> {
        Self::build_with(root, profile, cfg, &CsvTableReader, PearsonAdjacency)
    }
}

impl<G: AdjacencyFn> TrialDataset<G> {
    /// Build from a directory of sessions with an explicit reader and adjacency.
    pub fn build_with(
        root: impl AsRef<Path>,
        profile: &ConditionProfile,
        cfg: &PipelineConfig,
        reader: &dyn TableReader,
        graph: G,
    ) -> Result<Self> {
        cfg.validate()?;
        let root = root.as_ref();
        let sessions = discover_sessions(root, &cfg.file_extension)?;
        tracing::info!(root = %root.display(), sessions = sessions.len(), "discovered sessions");

        let corpus = collect_corpus(&sessions, reader, profile, cfg)?;
        Self::from_corpus(corpus, cfg, graph)
    }

    /// Condition an in-memory corpus.
    pub fn from_corpus(corpus: Corpus, cfg: &PipelineConfig, graph: G) -> Result<Self> {
        let features = crate::condition(corpus.trials, cfg)?;
        tracing::info!(
            shape = ?features.dim(),
            labels = corpus.labels.len(),
            skipped = corpus.skipped.len(),
            "dataset assembled"
        );
        Ok(Self {
            features,
            labels: corpus.labels,
            skipped: corpus.skipped,
            graph,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Item `index`: conditioned trial, its adjacency, and the zero-based label.
    pub fn get(&self, index: usize) -> Result<TrialItem> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange { index, len: self.len() });
        }
        let trial = self.features.index_axis(Axis(0), index);
        Ok(TrialItem {
            features: trial.mapv(|v| v as f32),
            adjacency: self.graph.adjacency(trial).mapv(|v| v as f32),
            label: self.labels[index] - 1,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = TrialItem> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i).ok())
    }

    /// Conditioned batch, `[N, C, T']`.
    pub fn features(&self) -> ArrayView3<'_, f64> {
        self.features.view()
    }

    /// Raw marker codes (not re-based).
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    pub fn skipped(&self) -> &[(PathBuf, SkippedTrial)] {
        &self.skipped
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }
}
