use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every file under `root` whose extension matches one of `exts`,
/// sorted so that traversal order does not depend on the filesystem.
pub fn paths_with_exts(root: &Path, exts: &[&str]) -> Vec<PathBuf> {
    let mut paths = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| exts.contains(&e))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();
    paths.sort();
    paths
}

pub fn paths_with_ext(root: &Path, ext: &str) -> Vec<PathBuf> {
    paths_with_exts(root, &[ext])
}
