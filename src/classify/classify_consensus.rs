use rayon::prelude::*;

use crate::align::{score, AlignMode, Scoring};
use crate::config::PipelineConfig;
use crate::types::{ClassificationResult, Consensus, ReferenceSet, Verdict};

/// Percent identity of a local score over `overlap` columns, relative to the
/// all-match score `match_score * overlap`. Clamped to [0, 100] and rounded
/// to two decimals; a zero overlap gives 0.
pub fn identity_percent(score: i32, overlap: usize, match_score: i32) -> f64 {
    if overlap == 0 || match_score <= 0 {
        return 0.0;
    }
    let max_score = match_score as f64 * overlap as f64;
    let raw = (score as f64 / max_score * 100.0).clamp(0.0, 100.0);
    (raw * 100.0).round() / 100.0
}

pub fn verdict(identity: f64, overlap: usize, min_identity: f64, min_overlap: usize) -> Verdict {
    if identity >= min_identity && overlap >= min_overlap {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}

/// Best local hit of `consensus` in `references`.
///
/// Every reference is scored in parallel; the scores are reduced in
/// reference-set order so the first maximum wins a tie. An empty consensus or
/// an empty set gives the no-hit result.
pub fn classify(
    consensus: &Consensus,
    references: &ReferenceSet,
    scoring: &Scoring,
    min_identity: f64,
    min_overlap: usize,
) -> ClassificationResult {
    if consensus.bases.is_empty() || references.is_empty() {
        return ClassificationResult::no_hit(consensus.id.clone());
    }

    let scores: Vec<i32> = references
        .entries()
        .par_iter()
        .map(|(_, seq)| score(&consensus.bases, seq, AlignMode::Local, scoring))
        .collect();

    let mut best: Option<(usize, i32)> = None;
    for (idx, &s) in scores.iter().enumerate() {
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((idx, s));
        }
    }
    let Some((best_idx, best_score)) = best else {
        return ClassificationResult::no_hit(consensus.id.clone());
    };

    let (best_id, best_seq) = &references.entries()[best_idx];
    let overlap_length = consensus.bases.len().min(best_seq.len());
    let identity = identity_percent(best_score, overlap_length, scoring.match_score);

    ClassificationResult {
        sample_id: consensus.id.clone(),
        best_reference_id: best_id.clone(),
        best_score,
        identity_percent: identity,
        overlap_length,
        verdict: verdict(identity, overlap_length, min_identity, min_overlap),
    }
}

/// [`classify`] with scoring and thresholds taken from `config`.
pub fn classify_consensus(
    consensus: &Consensus,
    references: &ReferenceSet,
    config: &PipelineConfig,
) -> ClassificationResult {
    classify(
        consensus,
        references,
        &config.scoring,
        config.min_identity,
        config.min_overlap,
    )
}
