//src/grouping.rs

//! Partitions input files into per-sample groups and assigns strand roles.
//!
//! A file's sample id is the first run of digits in its file name. Within a
//! group the first forward-labelled and first reverse-labelled file form the
//! pair; a label-less group of exactly two files is paired in input order.
//! Anything else stays unpaired. Extra files are dropped into `unassigned`,
//! never paired a second time.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use serde::Deserialize;

use crate::types::{Direction, SampleGroup};

/// Case-insensitive direction labels looked for in file names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelSet {
    pub forward: Vec<String>,
    pub reverse: Vec<String>,
}

impl Default for LabelSet {
    fn default() -> Self {
        let to_vec = |labels: &[&str]| labels.iter().map(|l| l.to_string()).collect();
        Self {
            forward: to_vec(&["FOR", "FWD", "DIR", "_F", "F.", "F_"]),
            reverse: to_vec(&["REV", "RV", "SR", "_R", "R.", "R_"]),
        }
    }
}

/// Groups produced from one file listing.
#[derive(Debug, Clone, Default)]
pub struct GroupedFiles {
    /// Ordered by numeric sample id.
    pub groups: Vec<SampleGroup<PathBuf>>,
    /// Files whose name holds no digits.
    pub without_id: Vec<PathBuf>,
}

impl GroupedFiles {
    pub fn pairable(&self) -> impl Iterator<Item = &SampleGroup<PathBuf>> {
        self.groups.iter().filter(|g| g.is_pairable())
    }

    /// Every file that will not take part in a consensus, in group order.
    pub fn unpaired_files(&self) -> Vec<PathBuf> {
        let mut files = self.without_id.clone();
        for group in &self.groups {
            files.extend(group.unassigned.iter().cloned());
        }
        files
    }
}

/// First maximal run of ASCII digits in `name`.
pub fn extract_sample_id(name: &str) -> Option<&str> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let rest = &name[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

/// Orders sample ids by numeric value without parsing (ids may be long).
pub fn compare_sample_ids(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.cmp(b))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Strand role of one file name.
///
/// Each label set scores the length of its longest label found in the name,
/// so `12_FOR` is forward even though the reverse label `R.` also hits.
/// Equal scores (including no hit at all) fall back to the last letter of
/// the stem, and stay `Unknown` if that does not decide it.
pub fn classify_direction(path: &Path, labels: &LabelSet) -> Direction {
    let name = file_name(path).to_ascii_uppercase();
    let stem = file_stem(path).to_ascii_uppercase();

    let longest_hit = |set: &[String]| {
        set.iter()
            .map(|l| l.to_ascii_uppercase())
            .filter(|l| name.contains(l.as_str()))
            .map(|l| l.len())
            .max()
            .unwrap_or(0)
    };
    let forward = longest_hit(&labels.forward);
    let reverse = longest_hit(&labels.reverse);

    match forward.cmp(&reverse) {
        Ordering::Greater => Direction::Forward,
        Ordering::Less => Direction::Reverse,
        Ordering::Equal if stem.ends_with('F') => Direction::Forward,
        Ordering::Equal if stem.ends_with('R') => Direction::Reverse,
        Ordering::Equal => Direction::Unknown,
    }
}

/// Assigns roles inside one group of files sharing `id`, in input order.
pub fn pair_group(id: &str, files: Vec<PathBuf>, labels: &LabelSet) -> SampleGroup<PathBuf> {
    let mut group = SampleGroup::new(id);

    let directions: Vec<Direction> = files.iter().map(|f| classify_direction(f, labels)).collect();
    let fwd_idx = directions.iter().position(|&d| d == Direction::Forward);
    let rev_idx = directions.iter().position(|&d| d == Direction::Reverse);

    let (fwd_idx, rev_idx) = match (fwd_idx, rev_idx) {
        (Some(f), Some(r)) => (f, r),
        _ if files.len() == 2 => (0, 1),
        _ => {
            group.unassigned = files;
            return group;
        }
    };

    for (i, file) in files.into_iter().enumerate() {
        if i == fwd_idx {
            group.forward = Some(file);
        } else if i == rev_idx {
            group.reverse = Some(file);
        } else {
            group.unassigned.push(file);
        }
    }
    group
}

/// Buckets `files` by sample id and pairs each bucket.
pub fn group_files(files: &[PathBuf], labels: &LabelSet) -> GroupedFiles {
    let mut buckets: AHashMap<String, Vec<PathBuf>> = AHashMap::new();
    let mut without_id = Vec::new();

    for path in files {
        match extract_sample_id(&file_name(path)) {
            Some(id) => buckets.entry(id.to_string()).or_default().push(path.clone()),
            None => without_id.push(path.clone()),
        }
    }

    let mut ids: Vec<String> = buckets.keys().cloned().collect();
    ids.sort_by(|a, b| compare_sample_ids(a, b));

    let groups = ids
        .into_iter()
        .filter_map(|id| {
            let members = buckets.remove(&id)?;
            let group = pair_group(&id, members, labels);
            if !group.is_pairable() {
                log::debug!("Sample {} left unpaired ({} file(s))", id, group.unassigned.len());
            }
            Some(group)
        })
        .collect();

    GroupedFiles { groups, without_id }
}
