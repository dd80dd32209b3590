//src/types.rs

use std::fmt;
use std::fmt::Write;
use std::path::PathBuf;

use ahash::AHashSet;

use crate::error::{Result, SangerError};

/// Gap symbol used in alignment tracks.
pub const GAP: u8 = b'-';

/// Reference id reported when no reference could be hit.
pub const NO_HIT: &str = "n/a";

/// One Sanger read: upper-cased bases plus one Phred value per base.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Read {
    pub sequence: Vec<u8>,
    pub quality: Vec<u8>,
}

impl Read {
    /// Builds a read, upper-casing the bases. Fails when the tracks differ in length.
    pub fn new(sequence: impl Into<Vec<u8>>, quality: Vec<u8>) -> Result<Self> {
        let mut sequence = sequence.into();
        if sequence.len() != quality.len() {
            return Err(SangerError::LengthMismatch {
                sequence: sequence.len(),
                quality: quality.len(),
            });
        }
        sequence.make_ascii_uppercase();
        Ok(Self { sequence, quality })
    }

    /// Read whose every base carries the same quality (plain-text inputs).
    pub fn with_uniform_quality(sequence: impl Into<Vec<u8>>, quality: u8) -> Self {
        let mut sequence = sequence.into();
        sequence.make_ascii_uppercase();
        let quality = vec![quality; sequence.len()];
        Self { sequence, quality }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Reverse complement of the bases with the quality track reversed.
    /// Anything outside `ACGT` becomes `N`.
    pub fn reverse_complement(&self) -> Self {
        let sequence = self
            .sequence
            .iter()
            .rev()
            .map(|&b| match b {
                b'A' => b'T',
                b'T' => b'A',
                b'C' => b'G',
                b'G' => b'C',
                _ => b'N',
            })
            .collect();
        let quality = self.quality.iter().rev().copied().collect();
        Self { sequence, quality }
    }
}

/// Strand role of a file inside a sample group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Reverse,
    Unknown,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
            Direction::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Files (or decoded reads) sharing one sample id.
///
/// `T` is a `PathBuf` straight out of the grouper and a `Read` once decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGroup<T> {
    pub id: String,
    pub forward: Option<T>,
    pub reverse: Option<T>,
    /// Files that took no part in the pair.
    pub unassigned: Vec<PathBuf>,
}

impl<T> SampleGroup<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            forward: None,
            reverse: None,
            unassigned: Vec::new(),
        }
    }

    /// Both strands present.
    pub fn is_pairable(&self) -> bool {
        self.forward.is_some() && self.reverse.is_some()
    }
}

/// A pairwise alignment. Both tracks have equal length and never hold a gap
/// at the same column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alignment {
    pub track_a: Vec<u8>,
    pub track_b: Vec<u8>,
    pub score: i32,
    /// Span of the first sequence covered by the alignment.
    pub a_range: std::ops::Range<usize>,
    /// Span of the second sequence covered by the alignment.
    pub b_range: std::ops::Range<usize>,
}

impl Alignment {
    pub fn len(&self) -> usize {
        self.track_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_a.is_empty()
    }
}

/// Quality bucket of a consensus, from its mean Phred value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityStatus {
    Excellent,
    Marginal,
    Unusable,
}

impl QualityStatus {
    pub fn from_mean_quality(mean_quality: f64) -> Self {
        if mean_quality >= 30.0 {
            QualityStatus::Excellent
        } else if mean_quality >= 20.0 {
            QualityStatus::Marginal
        } else {
            QualityStatus::Unusable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityStatus::Excellent => "excellent",
            QualityStatus::Marginal => "marginal",
            QualityStatus::Unusable => "unusable",
        }
    }
}

/// Merged sequence of one read pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Consensus {
    pub id: String,
    pub bases: Vec<u8>,
    pub qualities: Vec<u8>,
    pub mean_quality: f64,
}

impl Consensus {
    pub fn new(id: impl Into<String>, bases: Vec<u8>, qualities: Vec<u8>) -> Self {
        let mean_quality = if qualities.is_empty() {
            0.0
        } else {
            qualities.iter().map(|&q| q as u64).sum::<u64>() as f64 / qualities.len() as f64
        };
        Self {
            id: id.into(),
            bases,
            qualities,
            mean_quality,
        }
    }

    pub fn status(&self) -> QualityStatus {
        QualityStatus::from_mean_quality(self.mean_quality)
    }

    pub fn report(&self) -> SampleReport {
        SampleReport {
            sample_id: self.id.clone(),
            mean_quality: self.mean_quality,
            status: self.status(),
        }
    }

    /// FASTA record: `>ID_<id> Q:<mean>` then the bases on one line.
    pub fn to_fasta(&self) -> String {
        let mut out = String::with_capacity(self.bases.len() + 32);
        let _ = writeln!(out, ">ID_{} Q:{:.1}", self.id, self.mean_quality);
        out.push_str(&String::from_utf8_lossy(&self.bases));
        out.push('\n');
        out
    }
}

/// Per-sample row handed to reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleReport {
    pub sample_id: String,
    pub mean_quality: f64,
    pub status: QualityStatus,
}

/// Why a pairable sample produced no consensus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The decoder could not read the file for this strand.
    Unreadable(Direction, String),
    /// Nothing was left of this strand after trimming.
    EmptyRead(Direction),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Unreadable(dir, msg) => write!(f, "{dir} read unreadable: {msg}"),
            FailureReason::EmptyRead(dir) => write!(f, "{dir} read empty after trimming"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFailure {
    pub sample_id: String,
    pub reason: FailureReason,
}

pub type SampleOutcome = std::result::Result<Consensus, SampleFailure>;

/// Reference sequences in load order. Ids are unique.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: Vec<(String, Vec<u8>)>,
    ids: AHashSet<String>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, upper-casing the sequence. Returns `false` (and keeps
    /// the set unchanged) when the id is already present.
    pub fn insert(&mut self, id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> bool {
        let id = id.into();
        if self.ids.contains(&id) {
            return false;
        }
        let mut sequence = sequence.into();
        sequence.make_ascii_uppercase();
        self.ids.insert(id.clone());
        self.entries.push((id, sequence));
        true
    }

    pub fn entries(&self) -> &[(String, Vec<u8>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
        }
    }
}

/// Best reference hit of one consensus.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub sample_id: String,
    pub best_reference_id: String,
    pub best_score: i32,
    pub identity_percent: f64,
    pub overlap_length: usize,
    pub verdict: Verdict,
}

impl ClassificationResult {
    pub fn no_hit(sample_id: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            best_reference_id: NO_HIT.to_string(),
            best_score: 0,
            identity_percent: 0.0,
            overlap_length: 0,
            verdict: Verdict::Fail,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.best_reference_id != NO_HIT
    }
}

/// Two-database typing of one consensus.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingResult {
    /// Classification against the trimmed set; drives the verdict.
    pub classification: ClassificationResult,
    /// Best hit in the untrimmed set, when one was supplied.
    pub subtype_reference_id: Option<String>,
    pub type_name: String,
    pub subtype_name: String,
    pub designation: String,
}

impl TypingResult {
    pub fn sample_id(&self) -> &str {
        &self.classification.sample_id
    }
}
