//src/align/mod.rs

//! Pairwise alignment under an affine-gap scheme.
//!
//! A gap of length `L` scores `gap_open + (L - 1) * gap_extend`, so the first
//! gapped column pays `gap_open` alone. End gaps are charged like inner gaps
//! in global mode.

pub mod affine;

use serde::Deserialize;

use crate::error::{Result, SangerError};
use crate::types::Alignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignMode {
    /// End to end over both sequences (consensus building).
    Global,
    /// Best-scoring substring pair (reference classification).
    Local,
}

/// Largest accepted magnitude of any single score. Keeps DP cells far from
/// the `i32` range for reads and references of realistic length.
pub const MAX_SCORE_MAGNITUDE: i32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -3,
            gap_open: -10,
            gap_extend: -1,
        }
    }
}

impl Scoring {
    #[inline]
    pub fn substitution(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("scoring.match_score", self.match_score),
            ("scoring.mismatch_score", self.mismatch_score),
            ("scoring.gap_open", self.gap_open),
            ("scoring.gap_extend", self.gap_extend),
        ] {
            if value.unsigned_abs() > MAX_SCORE_MAGNITUDE as u32 {
                return Err(SangerError::invalid_config(
                    name,
                    format!("{value} exceeds the allowed magnitude {MAX_SCORE_MAGNITUDE}"),
                ));
            }
        }
        if self.match_score <= 0 {
            return Err(SangerError::invalid_config("scoring.match_score", "must be positive"));
        }
        if self.mismatch_score >= 0 {
            return Err(SangerError::invalid_config(
                "scoring.mismatch_score",
                "must be negative",
            ));
        }
        if self.gap_open > 0 || self.gap_extend > 0 {
            return Err(SangerError::invalid_config(
                "scoring.gap_open/gap_extend",
                "gap scores are penalties and must not be positive",
            ));
        }
        Ok(())
    }
}

/// Optimal alignment of `a` against `b`.
pub fn align(a: &[u8], b: &[u8], mode: AlignMode, scoring: &Scoring) -> Alignment {
    affine::align(a, b, mode, scoring)
}

/// Optimal score only; always equal to `align(..).score`.
pub fn score(a: &[u8], b: &[u8], mode: AlignMode, scoring: &Scoring) -> i32 {
    affine::score(a, b, mode, scoring)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_is_valid() {
        assert!(Scoring::default().validate().is_ok());
    }

    #[test]
    fn test_positive_gap_rejected() {
        let scoring = Scoring {
            gap_extend: 1,
            ..Scoring::default()
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_zero_mismatch_rejected() {
        let scoring = Scoring {
            mismatch_score: 0,
            ..Scoring::default()
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_oversized_penalty_rejected() {
        let scoring = Scoring {
            gap_open: -2_000_000_000,
            ..Scoring::default()
        };
        let err = scoring.validate().unwrap_err();
        assert!(format!("{err}").contains("scoring.gap_open"));

        let scoring = Scoring {
            match_score: MAX_SCORE_MAGNITUDE + 1,
            ..Scoring::default()
        };
        assert!(scoring.validate().is_err());

        let scoring = Scoring {
            gap_extend: -MAX_SCORE_MAGNITUDE,
            ..Scoring::default()
        };
        assert!(scoring.validate().is_ok());
    }

    #[test]
    fn test_substitution() {
        let s = Scoring::default();
        assert_eq!(s.substitution(b'A', b'A'), 2);
        assert_eq!(s.substitution(b'A', b'N'), -3);
    }
}
