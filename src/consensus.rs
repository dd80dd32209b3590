//src/consensus.rs

use crate::align::{align, AlignMode};
use crate::config::PipelineConfig;
use crate::trim::trim_read;
use crate::types::{Alignment, Consensus, Direction, FailureReason, Read, GAP};

/// Merges the two tracks of `alignment` into one sequence.
///
/// Each track keeps its own cursor into its quality array, advanced only on
/// non-gap columns; a missing quality reads as 0. Per column:
/// 1. equal bases: that base, with the higher quality;
/// 2. a gap on either side: the other side's base and quality;
/// 3. `N` against a called base: the called base;
/// 4. otherwise the higher quality wins, track A on ties.
pub fn build_consensus(
    id: &str,
    alignment: &Alignment,
    qual_a: &[u8],
    qual_b: &[u8],
) -> Consensus {
    let mut bases = Vec::with_capacity(alignment.len());
    let mut qualities = Vec::with_capacity(alignment.len());
    let mut idx_a = alignment.a_range.start;
    let mut idx_b = alignment.b_range.start;

    for (&c1, &c2) in alignment.track_a.iter().zip(&alignment.track_b) {
        let v1 = if c1 != GAP { qual_a.get(idx_a).copied().unwrap_or(0) } else { 0 };
        let v2 = if c2 != GAP { qual_b.get(idx_b).copied().unwrap_or(0) } else { 0 };

        let call = if c1 == c2 {
            (c1 != GAP).then_some((c1, v1.max(v2)))
        } else if c1 == GAP {
            Some((c2, v2))
        } else if c2 == GAP {
            Some((c1, v1))
        } else if c1 == b'N' && c2 != b'N' {
            Some((c2, v2))
        } else if c2 == b'N' && c1 != b'N' {
            Some((c1, v1))
        } else if v1 >= v2 {
            Some((c1, v1))
        } else {
            Some((c2, v2))
        };

        if let Some((base, qual)) = call {
            bases.push(base);
            qualities.push(qual);
        }
        if c1 != GAP {
            idx_a += 1;
        }
        if c2 != GAP {
            idx_b += 1;
        }
    }

    Consensus::new(id, bases, qualities)
}

/// Trims both reads, orients the reverse read onto the forward strand,
/// aligns them end to end and merges the result.
pub fn assemble_pair(
    id: &str,
    forward: &Read,
    reverse: &Read,
    config: &PipelineConfig,
) -> Result<Consensus, FailureReason> {
    let forward = trim_read(forward, config.trim_threshold);
    if forward.is_empty() {
        return Err(FailureReason::EmptyRead(Direction::Forward));
    }
    let reverse = trim_read(reverse, config.trim_threshold);
    if reverse.is_empty() {
        return Err(FailureReason::EmptyRead(Direction::Reverse));
    }
    let reverse = reverse.reverse_complement();

    let alignment = align(
        &forward.sequence,
        &reverse.sequence,
        AlignMode::Global,
        &config.scoring,
    );
    log::debug!(
        "Sample {}: {} + {} bases aligned over {} columns (score {})",
        id,
        forward.len(),
        reverse.len(),
        alignment.len(),
        alignment.score
    );
    Ok(build_consensus(id, &alignment, &forward.quality, &reverse.quality))
}
