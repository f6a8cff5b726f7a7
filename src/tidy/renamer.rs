use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Source and destination are the same directory.
    Unchanged,
    /// Destination did not exist; the whole directory was moved.
    Moved,
    /// Destination existed; files were merged into it.
    Merged(MergeStats),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub moved_files: usize,
    /// Source files dropped because the destination already had that name.
    pub collisions: usize,
}

pub(crate) fn move_file(from: &Path, to: &Path) -> Result<()> {
    if from == to {
        return Ok(());
    }

    match fs::rename(from, to) {
        Ok(_) => Ok(()),
        Err(rename_err) => {
            if matches!(
                rename_err.kind(),
                ErrorKind::CrossesDevices | ErrorKind::PermissionDenied
            ) {
                fs::copy(from, to).with_context(|| {
                    format!("failed to copy {} to {}", from.display(), to.display())
                })?;
                fs::remove_file(from)
                    .with_context(|| format!("failed to remove {}", from.display()))?;
                Ok(())
            } else {
                Err(rename_err).with_context(|| {
                    format!("failed to move {} to {}", from.display(), to.display())
                })
            }
        }
    }
}

fn same_location(src: &Path, dst: &Path) -> bool {
    match (src.canonicalize(), dst.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn merge_into(src: &Path, dst: &Path, stats: &mut MergeStats) -> Result<()> {
    let mut entries = fs::read_dir(src)
        .with_context(|| format!("failed to read {}", src.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to read {}", src.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            fs::create_dir_all(&to)
                .with_context(|| format!("failed to create {}", to.display()))?;
            merge_into(&from, &to, stats)?;
        } else if to.exists() {
            stats.collisions += 1;
        } else {
            move_file(&from, &to)?;
            stats.moved_files += 1;
        }
    }
    Ok(())
}

/// Move `src` to `dst`, merging into `dst` without overwriting when it already exists.
/// After a merge `src` is removed, including any files that collided.
pub fn rename_folder(src: &Path, dst: &Path) -> Result<RenameOutcome> {
    if same_location(src, dst) {
        return Ok(RenameOutcome::Unchanged);
    }

    if !dst.exists() {
        fs::rename(src, dst).with_context(|| {
            format!("failed to move {} to {}", src.display(), dst.display())
        })?;
        return Ok(RenameOutcome::Moved);
    }

    let mut stats = MergeStats::default();
    merge_into(src, dst, &mut stats)?;
    fs::remove_dir_all(src).with_context(|| format!("failed to remove {}", src.display()))?;
    Ok(RenameOutcome::Merged(stats))
}
