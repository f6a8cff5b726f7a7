use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::tidy::links::decode_link;
use crate::tidy::names::{has_hash_suffix, remove_brackets, strip_hash};

/// An exported image folder still carrying its hash suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFolder {
    pub path: PathBuf,
    pub raw_name: String,
    /// `raw_name` without the hash.
    pub base_name: String,
    /// `base_name` without brackets.
    pub pretty_title: String,
}

impl CandidateFolder {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let raw_name = path.file_name()?.to_str()?.to_string();
        if !has_hash_suffix(&raw_name) {
            return None;
        }
        let base_name = strip_hash(&raw_name);
        let pretty_title = remove_brackets(&base_name);
        Some(Self {
            path,
            raw_name,
            base_name,
            pretty_title,
        })
    }

    /// Every spelling a link might use for this folder, decoded forms included.
    pub fn old_variants(&self) -> Vec<String> {
        let names = [&self.raw_name, &self.base_name, &self.pretty_title];
        let mut out: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        out.extend(names.iter().map(|s| decode_link(s)));
        out.sort();
        out.dedup();
        out
    }
}

/// Immediate subdirectories of `root` that end in a 32-hex id, sorted by name.
pub fn scan_candidates(root: &Path) -> Result<Vec<CandidateFolder>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(candidate) = CandidateFolder::from_path(entry.path()) {
            out.push(candidate);
        }
    }
    out.sort_by(|a, b| a.raw_name.cmp(&b.raw_name));
    Ok(out)
}
