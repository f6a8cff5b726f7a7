use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MatchError;
use crate::tidy::names::{clean_name, has_hash_suffix};

/// Ways a folder can be paired with a document, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Hash- and bracket-stripped stem equals the folder's stripped name.
    NormalizedStem,
    /// Stem contains the raw folder name, or still carries an export hash.
    LooseStem,
    /// The directory holds exactly one document and nothing better matched.
    SoleDocument,
}

impl MatchStrategy {
    pub const ORDER: [MatchStrategy; 3] = [
        MatchStrategy::NormalizedStem,
        MatchStrategy::LooseStem,
        MatchStrategy::SoleDocument,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NormalizedStem => "normalized-stem",
            Self::LooseStem => "loose-stem",
            Self::SoleDocument => "sole-document",
        }
    }

    fn pick<'a>(self, folder_name: &str, documents: &'a [PathBuf]) -> Option<&'a PathBuf> {
        match self {
            Self::NormalizedStem => {
                let target = clean_name(folder_name);
                documents
                    .iter()
                    .find(|doc| clean_name(&file_stem(doc)) == target)
            }
            Self::LooseStem => documents.iter().find(|doc| {
                let stem = file_stem(doc);
                stem.contains(folder_name) || has_hash_suffix(&stem)
            }),
            Self::SoleDocument => match documents {
                [only] => Some(only),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMatch {
    pub path: PathBuf,
    pub strategy: MatchStrategy,
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Regular files in `dir` with extension `extension`, sorted by file name.
pub fn list_documents(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) == Some(extension) {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

pub fn match_document(folder_name: &str, documents: &[PathBuf]) -> Option<DocumentMatch> {
    MatchStrategy::ORDER.iter().find_map(|strategy| {
        strategy
            .pick(folder_name, documents)
            .map(|path| DocumentMatch {
                path: path.clone(),
                strategy: *strategy,
            })
    })
}

/// Locate the companion document for `folder_name` among the documents in `parent`.
pub fn find_document(
    parent: &Path,
    folder_name: &str,
    extension: &str,
) -> Result<DocumentMatch, MatchError> {
    let documents = list_documents(parent, extension)?;
    if documents.is_empty() {
        return Err(MatchError::NoDocuments {
            dir: parent.to_path_buf(),
            extension: extension.to_string(),
        });
    }
    match_document(folder_name, &documents).ok_or_else(|| MatchError::Ambiguous {
        folder: folder_name.to_string(),
        candidates: documents.len(),
    })
}
