//src/decode.rs

use std::path::Path;

use crate::abif::read_abif;
use crate::config::PipelineConfig;
use crate::error::{Result, SangerError};
use crate::seqfile::{input_kind, read_plain_read, InputKind};
use crate::types::Read;

/// Turns one input file into a [`Read`].
///
/// The assembly pipeline is generic over this so callers can feed reads
/// from somewhere other than the filesystem.
pub trait ReadDecoder: Sync {
    fn decode(&self, path: &Path) -> Result<Read>;
}

/// Decoder for files on disk, chosen by extension.
#[derive(Debug, Clone, Copy)]
pub struct FileDecoder {
    /// Quality given to every base of a plain sequence file.
    pub default_quality: u8,
}

impl FileDecoder {
    pub fn new(default_quality: u8) -> Self {
        Self { default_quality }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.default_quality)
    }
}

impl Default for FileDecoder {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl ReadDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<Read> {
        match input_kind(path) {
            Some(InputKind::Trace) => read_abif(path),
            Some(InputKind::Text) => read_plain_read(path, self.default_quality),
            None => Err(SangerError::invalid_format(path, "unsupported extension")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abif::tests::build_abif;
    use std::fs;

    #[test]
    fn test_decode_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let trace = dir.path().join("8_F.AB1");
        fs::write(
            &trace,
            build_abif(&[(b"PBAS", 2, b"ACGTTA".to_vec()), (b"PCON", 2, vec![12, 25, 38, 38, 25, 12])]),
        )
        .unwrap();
        let text = dir.path().join("8_R.seq");
        fs::write(&text, ">8_R\nacgtta\n").unwrap();

        let decoder = FileDecoder::new(33);
        let read = decoder.decode(&trace).unwrap();
        assert_eq!(read.quality, vec![12, 25, 38, 38, 25, 12]);
        let read = decoder.decode(&text).unwrap();
        assert_eq!(read.sequence, b"ACGTTA");
        assert_eq!(read.quality, vec![33; 6]);
    }

    #[test]
    fn test_default_quality_from_config() {
        let mut config = PipelineConfig::default();
        config.default_quality = 25;
        assert_eq!(FileDecoder::from_config(&config).default_quality, 25);
        assert_eq!(FileDecoder::default().default_quality, 40);
    }

    #[test]
    fn test_unsupported_and_broken_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("1_F.csv");
        fs::write(&csv, "ACGT").unwrap();
        let err = FileDecoder::default().decode(&csv).unwrap_err();
        assert!(format!("{err}").contains("unsupported extension"));

        let bad = dir.path().join("1_R.ab1");
        fs::write(&bad, b"not a trace").unwrap();
        assert!(FileDecoder::default().decode(&bad).is_err());

        let missing = dir.path().join("2_F.seq");
        assert!(matches!(
            FileDecoder::default().decode(&missing),
            Err(SangerError::Io(_))
        ));
    }
}
