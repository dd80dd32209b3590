//src/config.rs

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::align::Scoring;
use crate::error::{Result, SangerError};
use crate::grouping::LabelSet;

/// Phred threshold used for end trimming (~99% call confidence).
pub const DEFAULT_TRIM_THRESHOLD: u8 = 20;
/// Quality given to every base of inputs without native qualities.
pub const DEFAULT_QUALITY: u8 = 40;
pub const DEFAULT_MIN_IDENTITY: f64 = 92.0;
pub const DEFAULT_MIN_OVERLAP: usize = 180;

/// Everything the pipeline needs, passed explicitly to each entry point.
///
/// Loadable from TOML; any key left out keeps its default:
/// ```text
/// trim_threshold = 20
/// min_identity = 95.0
///
/// [scoring]
/// gap_open = -12
///
/// [labels]
/// forward = ["FWD", "_F"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub trim_threshold: u8,
    pub default_quality: u8,
    pub scoring: Scoring,
    pub labels: LabelSet,
    pub min_identity: f64,
    pub min_overlap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trim_threshold: DEFAULT_TRIM_THRESHOLD,
            default_quality: DEFAULT_QUALITY,
            scoring: Scoring::default(),
            labels: LabelSet::default(),
            min_identity: DEFAULT_MIN_IDENTITY,
            min_overlap: DEFAULT_MIN_OVERLAP,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Rejects operator errors before any sample is touched.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;

        if !self.min_identity.is_finite() || !(0.0..=100.0).contains(&self.min_identity) {
            return Err(SangerError::invalid_config(
                "min_identity",
                format!("{} is not within [0, 100]", self.min_identity),
            ));
        }

        for (name, labels) in [
            ("labels.forward", &self.labels.forward),
            ("labels.reverse", &self.labels.reverse),
        ] {
            if labels.is_empty() {
                return Err(SangerError::invalid_config(name, "at least one label is required"));
            }
            if labels.iter().any(|l| l.is_empty()) {
                return Err(SangerError::invalid_config(name, "labels must not be empty strings"));
            }
        }
        Ok(())
    }
}
