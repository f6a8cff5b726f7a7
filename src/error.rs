use std::path::PathBuf;

use thiserror::Error;

/// Why no companion document could be paired with a candidate folder.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no .{extension} documents in {}", .dir.display())]
    NoDocuments { dir: PathBuf, extension: String },
    #[error("{candidates} documents present but none matches folder `{folder}`")]
    Ambiguous { folder: String, candidates: usize },
    #[error("failed to list documents: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnCode {
    W001NoDocument,
    W002AmbiguousDocument,
    W003MissingImage,
    W004MergeCollision,
    W005EmptyCleanName,
}

impl WarnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W001NoDocument => "W001_NO_DOCUMENT",
            Self::W002AmbiguousDocument => "W002_AMBIGUOUS_DOCUMENT",
            Self::W003MissingImage => "W003_MISSING_IMAGE",
            Self::W004MergeCollision => "W004_MERGE_COLLISION",
            Self::W005EmptyCleanName => "W005_EMPTY_CLEAN_NAME",
        }
    }
}

impl MatchError {
    /// Warning code for the anticipated failures; `None` means the error must abort the run.
    pub fn warn_code(&self) -> Option<WarnCode> {
        match self {
            Self::NoDocuments { .. } => Some(WarnCode::W001NoDocument),
            Self::Ambiguous { .. } => Some(WarnCode::W002AmbiguousDocument),
            Self::Io(_) => None,
        }
    }
}
