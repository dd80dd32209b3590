// src/lib.rs
pub mod abif;
pub mod align;
pub mod classify;
pub mod config;
pub mod consensus;
pub mod decode;
pub mod error;
pub mod grouping;
pub mod refdb;
pub mod report;
pub mod seqfile;
pub mod trim;
pub mod types;

use std::path::{Path, PathBuf};

use rayon::prelude::*;

pub use crate::classify::{clean_type_name, type_consensus, type_consensuses};
pub use crate::config::PipelineConfig;
pub use crate::consensus::assemble_pair;
pub use crate::decode::{FileDecoder, ReadDecoder};
pub use crate::error::{Result, SangerError};
pub use crate::refdb::{load_consensus_dir, load_reference_set};
pub use crate::seqfile::discover_inputs;

use crate::grouping::group_files;
use crate::types::{
    Consensus, Direction, FailureReason, SampleFailure, SampleOutcome, SampleReport,
};

/// Outcome of assembling a batch of read files.
/// Only structured data is kept; report text is generated on demand.
#[derive(Debug, Clone, Default)]
pub struct AssemblyResults {
    /// One consensus per assembled pair, ordered by numeric sample id.
    pub consensuses: Vec<Consensus>,
    /// Quality rows matching `consensuses`.
    pub reports: Vec<SampleReport>,
    /// Pairable samples that produced no consensus.
    pub failures: Vec<SampleFailure>,
    /// Files that took part in no pair.
    pub unpaired_files: Vec<PathBuf>,
    /// Number of distinct sample ids seen.
    pub total_groups: usize,
}

impl AssemblyResults {
    /// Generate the quality TSV on demand
    pub fn get_quality_report(&self) -> String {
        report::quality_report(&self.reports)
    }

    pub fn get_summary(&self) -> String {
        report::assembly_summary(self)
    }

    /// `(file name, FASTA text)` for every consensus.
    pub fn get_consensus_fasta(&self) -> Vec<(String, String)> {
        self.consensuses
            .iter()
            .map(|c| (format!("Consensus_{}.fasta", c.id), c.to_fasta()))
            .collect()
    }
}

/// Decodes and assembles a single forward/reverse pair.
pub fn process_sample<D: ReadDecoder>(
    id: &str,
    forward: &Path,
    reverse: &Path,
    decoder: &D,
    config: &PipelineConfig,
) -> SampleOutcome {
    let fail = |reason: FailureReason| SampleFailure {
        sample_id: id.to_string(),
        reason,
    };
    let decode = |path: &Path, direction: Direction| {
        decoder.decode(path).map_err(|e| {
            log::debug!("Could not decode {}: {}", path.display(), e);
            fail(FailureReason::Unreadable(direction, e.to_string()))
        })
    };

    let forward_read = decode(forward, Direction::Forward)?;
    let reverse_read = decode(reverse, Direction::Reverse)?;

    assemble_pair(id, &forward_read, &reverse_read, config).map_err(fail)
}

/// Groups `files` by sample, then assembles every complete pair in parallel.
///
/// A sample that fails is recorded in `failures` and never stops the batch;
/// only an invalid `config` is an error.
pub fn assemble_consensuses<D: ReadDecoder>(
    files: &[PathBuf],
    decoder: &D,
    config: &PipelineConfig,
) -> Result<AssemblyResults> {
    config.validate()?;

    let grouped = group_files(files, &config.labels);
    let unpaired_files = grouped.unpaired_files();
    log::info!(
        "{} file(s) in {} sample group(s), {} pairable",
        files.len(),
        grouped.groups.len(),
        grouped.pairable().count()
    );

    // groups arrive in id order and collect() keeps it
    let outcomes: Vec<SampleOutcome> = grouped
        .groups
        .par_iter()
        .filter_map(|group| match (&group.forward, &group.reverse) {
            (Some(fwd), Some(rev)) => Some(process_sample(&group.id, fwd, rev, decoder, config)),
            _ => None,
        })
        .collect();

    let mut consensuses = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(cons) => {
                log::info!(
                    "Sample {}: {} bp consensus, mean quality {:.2} ({})",
                    cons.id,
                    cons.bases.len(),
                    cons.mean_quality,
                    cons.status().label()
                );
                consensuses.push(cons);
            }
            Err(failure) => {
                log::warn!("Sample {} failed: {}", failure.sample_id, failure.reason);
                failures.push(failure);
            }
        }
    }

    let reports = consensuses.iter().map(Consensus::report).collect();
    Ok(AssemblyResults {
        consensuses,
        reports,
        failures,
        unpaired_files,
        total_groups: grouped.groups.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Read;
    use ahash::AHashMap;

    struct MemoryDecoder(AHashMap<PathBuf, Read>);

    impl ReadDecoder for MemoryDecoder {
        fn decode(&self, path: &Path) -> Result<Read> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| SangerError::invalid_format(path, "no such read"))
        }
    }

    #[test]
    fn test_process_sample_reports_unreadable_strand() {
        let mut reads = AHashMap::new();
        reads.insert(PathBuf::from("1_F.seq"), Read::with_uniform_quality("ACGTACGT", 40));
        let decoder = MemoryDecoder(reads);

        let outcome = process_sample(
            "1",
            Path::new("1_F.seq"),
            Path::new("1_R.seq"),
            &decoder,
            &PipelineConfig::default(),
        );
        let failure = outcome.unwrap_err();
        assert_eq!(failure.sample_id, "1");
        assert!(matches!(
            failure.reason,
            FailureReason::Unreadable(Direction::Reverse, _)
        ));
    }

    #[test]
    fn test_assemble_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.scoring.match_score = 0;
        let decoder = MemoryDecoder(AHashMap::new());
        assert!(matches!(
            assemble_consensuses(&[], &decoder, &config),
            Err(SangerError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_consensus_fasta_names() {
        let results = AssemblyResults {
            consensuses: vec![Consensus::new("4", b"ACGT".to_vec(), vec![40; 4])],
            ..Default::default()
        };
        let files = results.get_consensus_fasta();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "Consensus_4.fasta");
        assert_eq!(files[0].1, ">ID_4 Q:40.0\nACGT\n");
    }
}
