//src/refdb.rs

use std::fs;
use std::path::Path;

use crate::error::{Result, SangerError};
use crate::grouping::{compare_sample_ids, extract_sample_id};
use crate::seqfile::{read_fasta_records, read_plain_read};
use crate::types::{Consensus, ReferenceSet};

/// Loads a reference database from a multi-FASTA file (plain or `.gz`).
///
/// Entries keep file order; ids are the first word of each header.
/// Returns `DuplicateReference` if an id appears twice.
pub fn load_reference_set<P: AsRef<Path>>(path: P) -> Result<ReferenceSet> {
    let path = path.as_ref();
    let mut refs = ReferenceSet::new();

    for (id, sequence) in read_fasta_records(path)? {
        if !refs.insert(id.clone(), sequence) {
            return Err(SangerError::DuplicateReference {
                id,
                path: path.to_path_buf(),
            });
        }
    }

    log::info!("Loaded {} reference(s) from {}", refs.len(), path.display());
    Ok(refs)
}

/// Reads previously written consensus files back from `dir`.
///
/// Only files named `consensus*` (any case) carrying a digit run are taken;
/// the first digit run is the sample id. Every base gets `default_quality`.
/// A file that cannot be read is logged and skipped.
pub fn load_consensus_dir<P: AsRef<Path>>(dir: P, default_quality: u8) -> Result<Vec<Consensus>> {
    let dir = dir.as_ref();
    let mut consensuses = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().into_owned(),
            None => continue,
        };
        if !name.to_ascii_lowercase().starts_with("consensus") {
            continue;
        }
        let Some(id) = extract_sample_id(&name) else {
            continue;
        };

        match read_plain_read(&path, default_quality) {
            Ok(read) => consensuses.push(Consensus::new(id, read.sequence, read.quality)),
            Err(e) => log::warn!("Skipping unreadable consensus {}: {}", path.display(), e),
        }
    }

    consensuses.sort_by(|a, b| compare_sample_ids(&a.id, &b.id));
    log::info!("Loaded {} consensus sequence(s) from {}", consensuses.len(), dir.display());
    Ok(consensuses)
}
