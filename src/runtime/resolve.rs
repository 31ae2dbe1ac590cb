//! Module main file resolution.
//!
//! Follows the CommonJS lookup order: the exact file, the file with each
//! known extension appended, then the directory entry (`package.json` main,
//! then `index.*`).

use anyhow::{Result, bail};
use log::debug;
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::RealRuntime;
use super::path::absolutize;

/// Extensions tried when a specifier does not name an existing file.
const RESOLVE_EXTENSIONS: &[&str] = &[".js", ".json", ".node"];

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn resolve_module_main_impl(&self, specifier: &str, dir: &Path) -> Result<PathBuf> {
        let base = absolutize(dir, Path::new(specifier));
        let mut tried = Vec::new();

        if let Some(found) = self.load_as_file(&base, &mut tried) {
            return Ok(found);
        }
        if let Some(found) = self.load_as_directory(&base, &mut tried) {
            return Ok(found);
        }

        debug!("Tried {:?}", tried);
        bail!(
            "Cannot find module '{}' from {}",
            specifier,
            dir.display()
        )
    }

    fn load_as_file(&self, base: &Path, tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
        tried.push(base.to_path_buf());
        if self.is_file_impl(base) {
            return Some(base.to_path_buf());
        }

        for ext in RESOLVE_EXTENSIONS {
            let candidate = with_appended_extension(base, ext);
            tried.push(candidate.clone());
            if self.is_file_impl(&candidate) {
                return Some(candidate);
            }
        }

        None
    }

    fn load_index(&self, dir: &Path, tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
        for ext in RESOLVE_EXTENSIONS {
            let index = dir.join(format!("index{ext}"));
            tried.push(index.clone());
            if self.is_file_impl(&index) {
                return Some(index);
            }
        }
        None
    }

    fn load_as_directory(&self, dir: &Path, tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
        let pkg_json = dir.join("package.json");
        if self.is_file_impl(&pkg_json) {
            if let Some(main) = self.read_directory_main(&pkg_json) {
                let main_path = absolutize(dir, Path::new(&main));
                if let Some(found) = self.load_as_file(&main_path, tried) {
                    return Some(found);
                }
                if let Some(found) = self.load_index(&main_path, tried) {
                    return Some(found);
                }
            }
        }

        self.load_index(dir, tried)
    }

    fn read_directory_main(&self, pkg_json: &Path) -> Option<String> {
        let content = self.read_to_string_impl(pkg_json).ok()?;
        let value: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                debug!("Ignoring unparsable {}: {}", pkg_json.display(), e);
                return None;
            }
        };
        value
            .get("main")
            .and_then(Value::as_str)
            .filter(|main| !main.is_empty())
            .map(str::to_string)
    }
}

/// Append `ext` to the file name, keeping any existing extension
/// (`lib/foo.min` becomes `lib/foo.min.js`).
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(ext);
    PathBuf::from(name)
}
