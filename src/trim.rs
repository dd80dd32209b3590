//src/trim.rs

//! End trimming of low-confidence flanks.
//!
//! The kept window runs from the first base with quality >= threshold to the
//! last such base, inclusive. A read with no base reaching the threshold is
//! kept whole.

use crate::types::Read;

/// Half-open `[start, end)` window of a read to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimRange {
    pub start: usize,
    pub end: usize,
}

impl TrimRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Window to keep for `quality` at `threshold`.
pub fn trim_range(quality: &[u8], threshold: u8) -> TrimRange {
    let start = quality.iter().position(|&q| q >= threshold).unwrap_or(0);
    let end = quality
        .iter()
        .rposition(|&q| q >= threshold)
        .map(|i| i + 1)
        .unwrap_or(quality.len());
    TrimRange { start, end }
}

/// Slices both tracks to the trimmed window.
pub fn trim<'a>(sequence: &'a [u8], quality: &'a [u8], threshold: u8) -> (&'a [u8], &'a [u8]) {
    let range = trim_range(quality, threshold);
    if range.is_empty() {
        return (&[], &[]);
    }
    (
        &sequence[range.start..range.end],
        &quality[range.start..range.end],
    )
}

/// Trimmed copy of `read`.
pub fn trim_read(read: &Read, threshold: u8) -> Read {
    let (sequence, quality) = trim(&read.sequence, &read.quality, threshold);
    Read {
        sequence: sequence.to_vec(),
        quality: quality.to_vec(),
    }
}
