//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over the filesystem and
//! module resolution, so package discovery can be tested against an
//! in-memory filesystem.
//!
//! # Structure
//!
//! - `path` - Path utility functions (normalize, is_path_under, relative_path_from_dir)
//! - `fs` - File system queries (exists, read, current directory)
//! - `resolve` - Module main file resolution (extension and index probing)

mod fs;
mod path;
mod resolve;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use path::{absolutize, is_path_under, relative_path_from_dir};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;

    // Directories
    fn current_dir(&self) -> Result<PathBuf>;

    /// Resolve a module specifier to the file it loads, searching from `dir`.
    ///
    /// Tries the file itself, then the known extensions, then the directory
    /// entry (`package.json` main or `index.*`). Fails if nothing matches.
    fn resolve_module_main(&self, specifier: &str, dir: &Path) -> Result<PathBuf>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn resolve_module_main(&self, specifier: &str, dir: &Path) -> Result<PathBuf> {
        self.resolve_module_main_impl(specifier, dir)
    }
}
