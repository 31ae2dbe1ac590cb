use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::descriptor::PackageJson;
use super::discovery::{DescriptorLocation, find_descriptor};
use super::exports::{export_subpath, flatten_exports, is_in_exports};
use crate::runtime::{Runtime, absolutize, relative_path_from_dir};

/// Package key used when no descriptor is found
pub const UNKNOWN_PACKAGE_KEY: &str = "<unknown>";
/// Package name used when no descriptor is found
pub const MAIN_PACKAGE_NAME: &str = "<main>";
/// Package name used when the descriptor declares none
pub const ANONYMOUS_PACKAGE_NAME: &str = "<anonymous>";

/// Metadata of the package a file belongs to
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    /// `name@version` (`name@?` without version), or `<unknown>`
    pub package_key: String,
    /// Declared name, `<anonymous>` if missing, `<main>` if no descriptor
    pub name: String,
    pub version: Option<String>,
    /// Main file relative to `dir`, if declared and resolvable
    pub main: Option<String>,
    /// Directory of the descriptor, or the current directory if none
    pub dir: PathBuf,
    /// Flattened export patterns, `None` if absent or unsupported
    pub exports: Option<Vec<String>>,
}

impl PackageMetadata {
    /// Metadata for files that belong to no package.
    pub fn fallback(cwd: PathBuf) -> Self {
        PackageMetadata {
            package_key: UNKNOWN_PACKAGE_KEY.to_string(),
            name: MAIN_PACKAGE_NAME.to_string(),
            version: None,
            main: None,
            dir: cwd,
            exports: None,
        }
    }

    /// Check whether `file` is part of the package's public surface.
    ///
    /// Returns `None` when there is no export information. Files outside
    /// `dir` are never exported; the resolved main file always is.
    pub fn is_exported(&self, file: &Path) -> Option<bool> {
        let exports = self.exports.as_ref()?;
        let Some(rel) = export_subpath(&self.dir, file) else {
            return Some(false);
        };

        // The main entry is listed as declared, not in `./` form
        let is_main = self
            .main
            .as_ref()
            .and_then(|main| export_subpath(&self.dir, &self.dir.join(main)))
            .is_some_and(|main| main == rel);

        Some(is_main || is_in_exports(&rel, exports))
    }
}

/// Extract metadata for the package containing `file`.
///
/// Never fails: a missing or unparsable descriptor yields
/// [`PackageMetadata::fallback`], and problems with individual fields are
/// logged and leave those fields empty.
#[tracing::instrument(skip(runtime))]
pub fn extract_metadata<R: Runtime>(
    runtime: &R,
    file: &Path,
    basedir: Option<&Path>,
) -> PackageMetadata {
    let cwd = match runtime.current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            warn!("{:#}", e);
            PathBuf::from(".")
        }
    };
    let start = absolutize(&cwd, file);

    let Some(location) = find_descriptor(runtime, &start, basedir) else {
        debug!("No package.json found for {}", start.display());
        return PackageMetadata::fallback(cwd);
    };

    match PackageJson::load(runtime, &location.descriptor) {
        Ok(pkg) => build_metadata(runtime, &location, &pkg),
        Err(e) => {
            warn!("{:#}", e);
            PackageMetadata::fallback(cwd)
        }
    }
}

fn build_metadata<R: Runtime>(
    runtime: &R,
    location: &DescriptorLocation,
    pkg: &PackageJson,
) -> PackageMetadata {
    let descriptor = location.descriptor.display();

    let name = match pkg.name() {
        Some(name) => name.to_string(),
        None => {
            debug!("Package name missing in {}", descriptor);
            ANONYMOUS_PACKAGE_NAME.to_string()
        }
    };

    let version = pkg.version().map(str::to_string);
    if version.is_none() {
        debug!("Package version missing in {}", descriptor);
    }

    let package_key = format!("{}@{}", name, version.as_deref().unwrap_or("?"));

    let main = pkg
        .main()
        .and_then(|main| resolve_main(runtime, &location.dir, main));

    let exports = pkg.exports().and_then(|declaration| {
        let mut flat = flatten_exports(declaration)?;
        if main.is_some() {
            if let Some(declared) = pkg.main() {
                flat.insert(0, declared.to_string());
            }
        }
        Some(flat)
    });

    PackageMetadata {
        package_key,
        name,
        version,
        main,
        dir: location.dir.clone(),
        exports,
    }
}

/// Resolve the declared main specifier and express it relative to `dir`.
fn resolve_main<R: Runtime>(runtime: &R, dir: &Path, main: &str) -> Option<String> {
    let specifier = if main.starts_with('.') || main.starts_with('/') {
        main.to_string()
    } else {
        format!("./{main}")
    };

    let resolved = match runtime.resolve_module_main(&specifier, dir) {
        Ok(resolved) => resolved,
        Err(e) => {
            debug!(
                "Unable to locate package main file '{}' at {}: {:#}",
                main,
                dir.display(),
                e
            );
            return None;
        }
    };

    let rel = relative_path_from_dir(dir, &resolved)?;
    Some(rel.to_string_lossy().into_owned())
}
