use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// A `.bak` copy of a file taken from disk before it is modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub backup_path: PathBuf,
    pub bytes: usize,
}

/// `path` with `.bak` appended to the full file name (`a.md` -> `a.md.bak`).
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(OsString::from(".bak"));
    PathBuf::from(name)
}

impl Backup {
    /// Copy the current on-disk content of `path` next to it. An older backup is replaced.
    pub fn snapshot(path: &Path) -> Result<Self> {
        let raw = fs::read(path)
            .with_context(|| format!("failed to read {} for backup", path.display()))?;
        let backup_path = backup_path_for(path);
        fs::write(&backup_path, &raw)
            .with_context(|| format!("failed to write {}", backup_path.display()))?;
        Ok(Self {
            backup_path,
            bytes: raw.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn backup_name_appends_suffix() {
        assert_eq!(
            backup_path_for(Path::new("/x/Intro draft.md")),
            PathBuf::from("/x/Intro draft.md.bak")
        );
    }

    #[test]
    fn snapshot_copies_disk_content() {
        let tmp = tempdir().expect("tempdir");
        let doc = tmp.path().join("a.md");
        fs::write(&doc, "before").expect("write");

        let backup = Backup::snapshot(&doc).expect("snapshot");
        fs::write(&doc, "after").expect("rewrite");

        assert_eq!(backup.bytes, 6);
        assert_eq!(fs::read_to_string(&backup.backup_path).expect("read"), "before");
    }
}
