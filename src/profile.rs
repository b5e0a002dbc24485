//! Condition profiles: which electrodes to keep and how trials are marked.
//!
//! A profile is resolved once from a `(class_type, trial_type)` tag pair.
//! Unknown tags are rejected with [`Error::UnknownTag`] before any recording
//! is touched.
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Electrode montage selected for a class of recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassType {
    AkSrep,
    CtkSrep,
    AkSres,
    CtkSres,
}

impl ClassType {
    pub const ALL: [ClassType; 4] = [
        ClassType::AkSrep,
        ClassType::CtkSrep,
        ClassType::AkSres,
        ClassType::CtkSres,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ClassType::AkSrep => "AK-SREP",
            ClassType::CtkSrep => "CTK-SREP",
            ClassType::AkSres => "AK-SRES",
            ClassType::CtkSres => "CTK-SRES",
        }
    }

    /// Ordered electrode names.  Duplicates are intentional and preserved.
    pub fn electrodes(self) -> &'static [&'static str; 12] {
        match self {
            ClassType::AkSrep => &[
                "F8", "FCz", "Fp1", "AF7", "AF3", "C1", "FC4", "F1", "Pz", "F2", "P5", "P6",
            ],
            ClassType::CtkSrep => &[
                "F1", "P5", "F4", "AF7", "PO5", "FC1", "FCz", "Fp2", "Fz", "PO3", "TP8", "F4",
            ],
            ClassType::AkSres => &[
                "AF8", "FC6", "F8", "T8", "C6", "AF7", "Fp2", "CP6", "Fpz", "F4", "TP8", "P6",
            ],
            ClassType::CtkSres => &[
                "F1", "P4", "F4", "AF3", "CP6", "P5", "Fz", "FC2", "FC1", "P6", "PC6", "F2",
            ],
        }
    }
}

impl FromStr for ClassType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ClassType::ALL
            .into_iter()
            .find(|c| c.tag() == s)
            .ok_or_else(|| unknown("class_type", s, ClassType::ALL.iter().map(|c| c.tag())))
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Task family, which fixes the trial-start marker and where the label sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialType {
    Reading,
    Response,
}

impl TrialType {
    pub const ALL: [TrialType; 2] = [TrialType::Reading, TrialType::Response];

    pub fn tag(self) -> &'static str {
        match self {
            TrialType::Reading => "reading",
            TrialType::Response => "response",
        }
    }

    /// Marker code that opens a trial.
    pub fn start_marker(self) -> i64 {
        match self {
            TrialType::Reading => 21,
            TrialType::Response => 30,
        }
    }

    /// How many events before the start marker the label code sits.
    pub fn label_offset(self) -> usize {
        match self {
            TrialType::Reading => 1,
            TrialType::Response => 3,
        }
    }
}

impl FromStr for TrialType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TrialType::ALL
            .into_iter()
            .find(|t| t.tag() == s)
            .ok_or_else(|| unknown("trial_type", s, TrialType::ALL.iter().map(|t| t.tag())))
    }
}

impl fmt::Display for TrialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn unknown<'a>(kind: &'static str, tag: &str, allowed: impl Iterator<Item = &'a str>) -> Error {
    Error::UnknownTag {
        kind,
        tag: tag.to_string(),
        allowed: allowed.collect::<Vec<_>>().join(", "),
    }
}

/// Resolved electrode subset and marker semantics for one condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionProfile {
    pub class_type: ClassType,
    pub trial_type: TrialType,
    pub electrodes: Vec<String>,
    pub start_marker: i64,
    pub label_offset: usize,
}

impl ConditionProfile {
    pub fn new(class_type: ClassType, trial_type: TrialType) -> Self {
        Self {
            class_type,
            trial_type,
            electrodes: class_type.electrodes().iter().map(|s| s.to_string()).collect(),
            start_marker: trial_type.start_marker(),
            label_offset: trial_type.label_offset(),
        }
    }

    /// Resolve a profile from its string tags, e.g. `("AK-SREP", "reading")`.
    pub fn from_tags(class_type: &str, trial_type: &str) -> Result<Self> {
        Ok(Self::new(class_type.parse()?, trial_type.parse()?))
    }

    pub fn n_channels(&self) -> usize {
        self.electrodes.len()
    }
}
