use rayon::prelude::*;

use super::typing::type_consensus;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::grouping::compare_sample_ids;
use crate::types::{Consensus, ReferenceSet, TypingResult, Verdict};

/// Parallel typing of many consensus sequences.
///
/// Samples are independent; results come back ordered by numeric sample id
/// whatever order the input was in.
pub fn type_consensuses(
    consensuses: &[Consensus],
    trimmed: &ReferenceSet,
    untrimmed: Option<&ReferenceSet>,
    config: &PipelineConfig,
) -> Result<Vec<TypingResult>> {
    config.validate()?;
    if trimmed.is_empty() {
        log::warn!("Trimmed reference set is empty; every sample will be a no-hit");
    }

    let mut results: Vec<TypingResult> = consensuses
        .par_iter()
        .map(|cons| {
            let typed = type_consensus(cons, trimmed, untrimmed, config);
            let c = &typed.classification;
            match c.verdict {
                Verdict::Pass => log::info!(
                    "Sample {}: {} ({:.2}% over {} bp)",
                    cons.id,
                    typed.designation,
                    c.identity_percent,
                    c.overlap_length
                ),
                Verdict::Fail => log::warn!(
                    "Sample {}: {} failed QC ({:.2}% over {} bp)",
                    cons.id,
                    typed.designation,
                    c.identity_percent,
                    c.overlap_length
                ),
            }
            typed
        })
        .collect();

    results.sort_by(|a, b| compare_sample_ids(a.sample_id(), b.sample_id()));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_sorted_by_numeric_id() {
        let seq = b"ACGTTGCAAGGCTTACCGATCGATTGCA".repeat(8);
        let mut trimmed = ReferenceSet::new();
        trimmed.insert("emm2.0", seq.clone());

        let consensuses: Vec<Consensus> = ["10", "2", "33", "4"]
            .iter()
            .map(|id| Consensus::new(*id, seq.clone(), vec![40; seq.len()]))
            .collect();

        let results =
            type_consensuses(&consensuses, &trimmed, None, &PipelineConfig::default()).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.sample_id()).collect();
        assert_eq!(ids, vec!["2", "4", "10", "33"]);
        assert!(results.iter().all(|r| r.classification.verdict == Verdict::Pass));
    }

    #[test]
    fn test_invalid_config_fails_before_work() {
        let mut config = PipelineConfig::default();
        config.min_identity = 101.0;
        let result = type_consensuses(&[], &ReferenceSet::new(), None, &config);
        assert!(result.is_err());
    }
}
