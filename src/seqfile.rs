//src/seqfile.rs

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read as IoRead};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::{Result, SangerError};
use crate::types::Read;

/// Extensions of instrument trace files.
pub const TRACE_EXTENSIONS: &[&str] = &["ab1", "abi", "abif"];
/// Extensions of plain sequence files (optionally followed by `.gz`).
pub const TEXT_EXTENSIONS: &[&str] = &["fasta", "fa", "seq", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Trace,
    Text,
}

fn lower_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn is_gz(path: &Path) -> bool {
    lower_extension(path).map(|ext| ext == "gz").unwrap_or(false)
}

/// What kind of input `path` is, judged by extension only.
pub fn input_kind(path: &Path) -> Option<InputKind> {
    let ext = lower_extension(path)?;
    if TRACE_EXTENSIONS.contains(&ext.as_str()) {
        return Some(InputKind::Trace);
    }
    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Some(InputKind::Text);
    }
    if ext == "gz" {
        let inner = path.file_stem().map(Path::new)?;
        if let Some(inner_ext) = lower_extension(inner) {
            if TEXT_EXTENSIONS.contains(&inner_ext.as_str()) {
                return Some(InputKind::Text);
            }
        }
    }
    None
}

/// Opens `path`, transparently decompressing `.gz`.
fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let f = File::open(path)?;
    let reader: Box<dyn BufRead> = if is_gz(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Bases of a plain sequence file.
///
/// Header lines (`>...`) are dropped, every byte outside `ACGTN` (any case)
/// is discarded, and the rest is upper-cased.
pub fn parse_plain_sequence(content: &[u8]) -> Vec<u8> {
    content
        .split(|&b| b == b'\n')
        .filter(|line| !line.starts_with(b">"))
        .flat_map(|line| line.iter())
        .map(|b| b.to_ascii_uppercase())
        .filter(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'N'))
        .collect()
}

/// Reads a plain sequence file; every base gets `quality`.
pub fn read_plain_read(path: &Path, quality: u8) -> Result<Read> {
    let mut content = Vec::new();
    open_reader(path)?.read_to_end(&mut content)?;
    Ok(Read::with_uniform_quality(parse_plain_sequence(&content), quality))
}

/// Minimal multi-FASTA reader that also supports `.gz`.
///
/// Record ids are the first whitespace-separated token of the header.
pub fn read_fasta_records(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let reader = open_reader(path)?;
    let mut records: Vec<(String, Vec<u8>)> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            let id = header.split_whitespace().next().unwrap_or("");
            if id.is_empty() {
                return Err(SangerError::invalid_format(path, "FASTA header without an id"));
            }
            records.push((id.to_string(), Vec::new()));
            continue;
        }
        match records.last_mut() {
            Some((_, seq)) => seq.extend(
                line.bytes()
                    .filter(|b| !b.is_ascii_whitespace())
                    .map(|b| b.to_ascii_uppercase()),
            ),
            None => {
                return Err(SangerError::invalid_format(
                    path,
                    "sequence data before the first FASTA header",
                ))
            }
        }
    }
    Ok(records)
}

/// Recursively lists sequencing inputs under `dir`, sorted by path.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() && input_kind(&path).is_some() {
                found.push(path);
            }
        }
    }

    found.sort();
    log::info!("Found {} input file(s) under {}", found.len(), dir.display());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_input_kind() {
        assert_eq!(input_kind(Path::new("1_F.AB1")), Some(InputKind::Trace));
        assert_eq!(input_kind(Path::new("1_F.seq")), Some(InputKind::Text));
        assert_eq!(input_kind(Path::new("refs.fasta.gz")), Some(InputKind::Text));
        assert_eq!(input_kind(Path::new("notes.gz")), None);
        assert_eq!(input_kind(Path::new("report.csv")), None);
        assert_eq!(input_kind(Path::new("noext")), None);
    }

    #[test]
    fn test_parse_plain_sequence() {
        assert_eq!(parse_plain_sequence(b">7_F some header\nacgt\nNNxx-GT\n"), b"ACGTNNGT");
        assert_eq!(parse_plain_sequence(b"ac gt\r\n12tt"), b"ACGTTT");
        assert!(parse_plain_sequence(b"").is_empty());
        // later headers are dropped too, letters and all
        assert_eq!(parse_plain_sequence(b">a first\nAC\n>b GATTACA\nGT\n"), b"ACGT");
    }

    #[test]
    fn test_read_plain_read_synthesizes_quality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("3_R.seq");
        fs::write(&path, ">3_R\nACGTAC\nGT\n").unwrap();
        let read = read_plain_read(&path, 40).unwrap();
        assert_eq!(read.sequence, b"ACGTACGT");
        assert_eq!(read.quality, vec![40; 8]);
    }

    #[test]
    fn test_read_fasta_records_plain_and_gz() {
        let dir = tempfile::tempdir().unwrap();
        let text = ">emm1.0 first\nacgt\nACGT\n\n>emm2.0\nTTTT\n";

        let plain = dir.path().join("refs.fasta");
        fs::write(&plain, text).unwrap();
        let records = read_fasta_records(&plain).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ("emm1.0".to_string(), b"ACGTACGT".to_vec()));
        assert_eq!(records[1], ("emm2.0".to_string(), b"TTTT".to_vec()));

        let gz = dir.path().join("refs.fasta.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(text.as_bytes()).unwrap();
        enc.finish().unwrap();
        assert_eq!(read_fasta_records(&gz).unwrap(), records);
    }

    #[test]
    fn test_read_fasta_rejects_headless_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.fasta");
        fs::write(&path, "ACGT\n>x\nA\n").unwrap();
        assert!(matches!(
            read_fasta_records(&path),
            Err(SangerError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_discover_inputs_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("plate2");
        fs::create_dir(&nested).unwrap();
        for name in ["2_F.ab1", "1_R.seq", "notes.csv"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::write(nested.join("9_F.fasta"), b"x").unwrap();

        let found = discover_inputs(dir.path()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["1_R.seq", "2_F.ab1", "plate2/9_F.fasta"]);
    }
}
