//src/abif.rs

//! Reader for ABIF (`.ab1`) capillary trace files.
//!
//! Only the base calls and their Phred values are extracted. All integers in
//! the format are big-endian. The header holds a root directory entry at
//! byte 6 pointing at an array of 28-byte tag entries; entries whose payload
//! fits in four bytes store it inline in the offset field.

use std::fs;
use std::path::Path;

use crate::error::{Result, SangerError};
use crate::types::Read;

/// File signature of ABIF traces.
pub const ABIF_SIGNATURE: &[u8; 4] = b"ABIF";

const ROOT_ENTRY_OFFSET: usize = 6;
const DIR_ENTRY_SIZE: usize = 28;

/// Base calls, edited (2) then as-called (1).
const BASE_CALL_TAG: &[u8; 4] = b"PBAS";
/// Per-base quality values, same numbering.
const QUALITY_TAG: &[u8; 4] = b"PCON";

#[derive(Debug, Clone, Copy)]
struct DirEntry {
    name: [u8; 4],
    number: i32,
    data_size: usize,
    /// Absolute payload offset, or `None` when the payload is inline.
    data_offset: Option<usize>,
    /// Position of this entry in the file (for inline payloads).
    entry_pos: usize,
}

fn read_i32_be(bytes: &[u8]) -> i32 {
    let mut arr = [0u8; 4];
    arr.copy_from_slice(bytes);
    i32::from_be_bytes(arr)
}

fn read_entry(data: &[u8], pos: usize, path: &Path) -> Result<DirEntry> {
    let raw = data
        .get(pos..pos + DIR_ENTRY_SIZE)
        .ok_or_else(|| SangerError::invalid_format(path, "truncated ABIF directory"))?;
    let mut name = [0u8; 4];
    name.copy_from_slice(&raw[0..4]);
    let data_size = read_i32_be(&raw[16..20]);
    let offset = read_i32_be(&raw[20..24]);
    if data_size < 0 || offset < 0 {
        return Err(SangerError::invalid_format(path, "negative ABIF size or offset"));
    }
    let data_size = data_size as usize;
    Ok(DirEntry {
        name,
        number: read_i32_be(&raw[4..8]),
        data_size,
        data_offset: (data_size > 4).then_some(offset as usize),
        entry_pos: pos,
    })
}

fn payload<'a>(data: &'a [u8], entry: &DirEntry, path: &Path) -> Result<&'a [u8]> {
    let start = match entry.data_offset {
        Some(offset) => offset,
        None => entry.entry_pos + 20,
    };
    data.get(start..start + entry.data_size).ok_or_else(|| {
        SangerError::invalid_format(
            path,
            format!(
                "ABIF tag {}{} points past end of file",
                String::from_utf8_lossy(&entry.name),
                entry.number
            ),
        )
    })
}

/// Payload of `tag`, preferring number 2 over number 1.
fn find_tag<'a>(
    data: &'a [u8],
    entries: &[DirEntry],
    tag: &[u8; 4],
    path: &Path,
) -> Result<&'a [u8]> {
    for number in [2, 1] {
        if let Some(entry) = entries.iter().find(|e| &e.name == tag && e.number == number) {
            return payload(data, entry, path);
        }
    }
    Err(SangerError::invalid_format(
        path,
        format!("ABIF tag {} not found", String::from_utf8_lossy(tag)),
    ))
}

/// Decodes an in-memory ABIF trace. `path` is only used in error messages.
pub fn parse_abif(data: &[u8], path: &Path) -> Result<Read> {
    if data.len() < ROOT_ENTRY_OFFSET + DIR_ENTRY_SIZE || &data[..4] != ABIF_SIGNATURE {
        return Err(SangerError::invalid_format(path, "missing ABIF signature"));
    }

    let root_raw = &data[ROOT_ENTRY_OFFSET..ROOT_ENTRY_OFFSET + DIR_ENTRY_SIZE];
    let num_entries = read_i32_be(&root_raw[12..16]);
    let dir_offset = read_i32_be(&root_raw[20..24]);
    if num_entries < 0 || dir_offset < 0 {
        return Err(SangerError::invalid_format(path, "corrupt ABIF root directory"));
    }

    let entries = (0..num_entries as usize)
        .map(|i| read_entry(data, dir_offset as usize + i * DIR_ENTRY_SIZE, path))
        .collect::<Result<Vec<_>>>()?;

    let bases = find_tag(data, &entries, BASE_CALL_TAG, path)?;
    let quality = find_tag(data, &entries, QUALITY_TAG, path)?;
    if bases.len() != quality.len() {
        return Err(SangerError::invalid_format(
            path,
            format!(
                "{} base calls but {} quality values",
                bases.len(),
                quality.len()
            ),
        ));
    }

    let read = Read::new(bases.to_vec(), quality.to_vec())?;
    log::debug!("Decoded {} bases from {}", read.len(), path.display());
    Ok(read)
}

pub fn read_abif(path: &Path) -> Result<Read> {
    let data = fs::read(path)?;
    parse_abif(&data, path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn entry(name: &[u8; 4], number: i32, size: usize, offset_field: [u8; 4]) -> Vec<u8> {
        let mut e = Vec::with_capacity(DIR_ENTRY_SIZE);
        e.extend_from_slice(name);
        e.extend_from_slice(&number.to_be_bytes());
        e.extend_from_slice(&2i16.to_be_bytes()); // char array
        e.extend_from_slice(&1i16.to_be_bytes());
        e.extend_from_slice(&(size as i32).to_be_bytes());
        e.extend_from_slice(&(size as i32).to_be_bytes());
        e.extend_from_slice(&offset_field);
        e.extend_from_slice(&0i32.to_be_bytes());
        e
    }

    /// Minimal trace: header, payloads from byte 128, then the directory.
    /// `tags` payloads of four bytes or less are stored inline.
    pub(crate) fn build_abif(tags: &[(&[u8; 4], i32, Vec<u8>)]) -> Vec<u8> {
        let mut payloads = Vec::new();
        let mut dir = Vec::new();
        for (name, number, data) in tags {
            let offset_field = if data.len() <= 4 {
                let mut inline = [0u8; 4];
                inline[..data.len()].copy_from_slice(data);
                inline
            } else {
                let off = (128 + payloads.len()) as i32;
                payloads.extend_from_slice(data);
                off.to_be_bytes()
            };
            dir.extend(entry(name, *number, data.len(), offset_field));
        }

        let dir_offset = 128 + payloads.len();
        let mut out = Vec::new();
        out.extend_from_slice(ABIF_SIGNATURE);
        out.extend_from_slice(&101i16.to_be_bytes());
        let mut root = entry(b"tdir", 1, dir.len(), (dir_offset as i32).to_be_bytes());
        root[12..16].copy_from_slice(&(tags.len() as i32).to_be_bytes());
        out.extend(root);
        out.resize(128, 0);
        out.extend(payloads);
        out.extend(dir);
        out
    }

    #[test]
    fn test_parse_prefers_edited_calls() {
        let data = build_abif(&[
            (b"PBAS", 1, b"AAAAAAAA".to_vec()),
            (b"PBAS", 2, b"acgtacgt".to_vec()),
            (b"PCON", 2, vec![10, 20, 30, 40, 40, 30, 20, 10]),
        ]);
        let read = parse_abif(&data, Path::new("t.ab1")).unwrap();
        assert_eq!(read.sequence, b"ACGTACGT");
        assert_eq!(read.quality, vec![10, 20, 30, 40, 40, 30, 20, 10]);
    }

    #[test]
    fn test_parse_inline_payload_and_fallback_number() {
        let data = build_abif(&[(b"PBAS", 1, b"ACG".to_vec()), (b"PCON", 1, vec![31, 32, 33])]);
        let read = parse_abif(&data, Path::new("t.ab1")).unwrap();
        assert_eq!(read.sequence, b"ACG");
        assert_eq!(read.quality, vec![31, 32, 33]);
    }

    #[test]
    fn test_rejects_bad_signature() {
        let mut data = build_abif(&[(b"PBAS", 2, b"ACGTA".to_vec()), (b"PCON", 2, vec![1, 2, 3, 4, 5])]);
        data[0] = b'X';
        let err = parse_abif(&data, Path::new("t.ab1")).unwrap_err();
        assert!(format!("{err}").contains("signature"));
        assert!(parse_abif(b"AB", Path::new("t.ab1")).is_err());
    }

    #[test]
    fn test_rejects_missing_quality_and_length_mismatch() {
        let data = build_abif(&[(b"PBAS", 2, b"ACGTA".to_vec())]);
        assert!(format!("{}", parse_abif(&data, Path::new("t.ab1")).unwrap_err()).contains("PCON"));

        let data = build_abif(&[(b"PBAS", 2, b"ACGTA".to_vec()), (b"PCON", 2, vec![1, 2, 3, 4, 5, 6])]);
        assert!(parse_abif(&data, Path::new("t.ab1")).is_err());
    }

    #[test]
    fn test_rejects_truncated_payload() {
        let mut data = build_abif(&[(b"PBAS", 2, b"ACGTACGT".to_vec()), (b"PCON", 2, vec![9; 8])]);
        // drop the directory and part of the payloads
        data.truncate(130);
        assert!(parse_abif(&data, Path::new("t.ab1")).is_err());
    }

    #[test]
    fn test_read_abif_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("5_F.ab1");
        std::fs::write(
            &path,
            build_abif(&[(b"PBAS", 2, b"GATTACA".to_vec()), (b"PCON", 2, vec![40; 7])]),
        )
        .unwrap();
        let read = read_abif(&path).unwrap();
        assert_eq!(read.sequence, b"GATTACA");
    }
}
