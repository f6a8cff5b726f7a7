use anyhow::{Context, Result};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Absolute, canonical scan root: `explicit` when given, otherwise the working directory.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let base = match explicit {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("failed to resolve working directory")?,
    };
    base.canonicalize()
        .with_context(|| format!("failed to resolve {}", base.display()))
}

/// Forward-slash relative path from directory `from` to `to`. Both must be absolute.
pub fn relative_posix(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for comp in &to[common..] {
        parts.push(comp.as_os_str().to_string_lossy().into_owned());
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_folder_is_its_own_name() {
        assert_eq!(
            relative_posix(Path::new("/notes"), Path::new("/notes/lecture 01")),
            "lecture 01"
        );
    }

    #[test]
    fn climbs_out_of_nested_directories() {
        assert_eq!(
            relative_posix(Path::new("/notes/sub/deeper"), Path::new("/notes/lecture 02")),
            "../../lecture 02"
        );
    }

    #[test]
    fn identical_paths_are_dot() {
        assert_eq!(relative_posix(Path::new("/notes"), Path::new("/notes")), ".");
    }

    #[test]
    fn explicit_root_is_canonicalized() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let got = resolve_root(Some(tmp.path().join(".").as_path())).expect("root");
        assert_eq!(got, tmp.path().canonicalize().expect("canonical"));
    }
}
