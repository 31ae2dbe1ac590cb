//! Path utility functions for normalization and comparison.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // At the root (or an empty relative path) the `..` is kept
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Check if a path is under a given directory by comparing normalized path components.
/// Returns true if `path` is under `dir` (i.e., `dir` is a prefix of `path`),
/// including when both are the same directory.
///
/// `/work/project-extra` is NOT under `/work/project`, and
/// `/work/project/../other` is NOT under `/work/project`.
pub fn is_path_under(path: &Path, dir: &Path) -> bool {
    let normalized_path = normalize_path(path);
    let normalized_dir = normalize_path(dir);

    let path_components: Vec<_> = normalized_path.components().collect();
    let dir_components: Vec<_> = normalized_dir.components().collect();

    if path_components.len() < dir_components.len() {
        return false;
    }

    dir_components
        .iter()
        .zip(path_components.iter())
        .all(|(d, p)| d == p)
}

/// Calculate the relative path from a directory to a target path.
///
/// For example, if `from_dir` is `/work/node_modules/foo` and `to_path` is
/// `/work/node_modules/foo/lib/index.js`, this returns `lib/index.js`.
///
/// Returns `None` if a relative path cannot be computed (e.g., different drive letters on Windows).
pub fn relative_path_from_dir(from_dir: &Path, to_path: &Path) -> Option<PathBuf> {
    let result = pathdiff::diff_paths(to_path, from_dir)?;

    // An absolute result means there is no relative route (e.g., different drives on Windows)
    if result.is_absolute() {
        return None;
    }

    Some(result)
}

/// Make `path` absolute against `base` and normalize it.
/// Already absolute paths are only normalized.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}
