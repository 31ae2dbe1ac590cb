use log::debug;
use std::path::{Component, Path, PathBuf};

use super::descriptor::{DESCRIPTOR_FILE, PackageJson};
use crate::runtime::{Runtime, is_path_under};

/// Directory name of a dependency store
pub const DEPENDENCY_STORE: &str = "node_modules";

/// A descriptor found by [`find_descriptor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorLocation {
    /// Path of the `package.json` file
    pub descriptor: PathBuf,
    /// Directory containing it
    pub dir: PathBuf,
}

/// Name a package must declare to live at `dir`, based on the last
/// `node_modules` component of the path.
///
/// `/app/node_modules/@scope/pkg` expects `@scope/pkg`. Returns `None` when
/// `dir` is not inside a dependency store.
pub fn expected_package_name(dir: &Path) -> Option<String> {
    let components: Vec<Component> = dir.components().collect();
    let store = components
        .iter()
        .enumerate()
        .take(components.len().saturating_sub(1))
        .rev()
        .find(|(_, c)| c.as_os_str() == DEPENDENCY_STORE)
        .map(|(i, _)| i)?;

    let name = components[store + 1..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    Some(name)
}

/// Check whether `dir` holds the descriptor of the package it represents.
///
/// Outside a dependency store any `package.json` is accepted. Inside one,
/// the declared name must equal the path below the last `node_modules`;
/// unreadable or unparsable descriptors are rejected.
#[tracing::instrument(skip(runtime))]
pub fn is_valid_descriptor_dir<R: Runtime>(runtime: &R, dir: &Path) -> bool {
    let descriptor = dir.join(DESCRIPTOR_FILE);
    if !runtime.exists(&descriptor) {
        return false;
    }

    let Some(expected) = expected_package_name(dir) else {
        return true;
    };

    match PackageJson::load(runtime, &descriptor) {
        Ok(pkg) if pkg.name() == Some(expected.as_str()) => true,
        Ok(pkg) => {
            debug!(
                "Skipping {}: name {:?} does not match expected '{}'",
                descriptor.display(),
                pkg.name(),
                expected
            );
            false
        }
        Err(e) => {
            debug!("Skipping {}: {:#}", descriptor.display(), e);
            false
        }
    }
}

/// Find the enclosing package descriptor of `start`.
///
/// `start` itself is the first candidate directory, then each ancestor. The
/// walk stops at the filesystem root, or before leaving `basedir` if one is set.
#[tracing::instrument(skip(runtime))]
pub fn find_descriptor<R: Runtime>(
    runtime: &R,
    start: &Path,
    basedir: Option<&Path>,
) -> Option<DescriptorLocation> {
    let mut dir = start.to_path_buf();
    loop {
        if is_valid_descriptor_dir(runtime, &dir) {
            return Some(DescriptorLocation {
                descriptor: dir.join(DESCRIPTOR_FILE),
                dir,
            });
        }

        let parent = match dir.parent() {
            Some(parent) if parent != dir => parent.to_path_buf(),
            _ => return None,
        };
        if let Some(base) = basedir {
            if !is_path_under(&parent, base) {
                debug!(
                    "Stopping descriptor search at {}: outside {}",
                    dir.display(),
                    base.display()
                );
                return None;
            }
        }
        dir = parent;
    }
}
