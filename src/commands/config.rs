use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::{Runtime, absolutize};

pub struct Config<R: Runtime> {
    pub runtime: R,
    /// Upper bound of the descriptor search, absolute
    pub basedir: Option<PathBuf>,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, basedir: Option<PathBuf>) -> Result<Self> {
        let basedir = match basedir {
            Some(dir) => {
                let cwd = runtime.current_dir()?;
                let dir = absolutize(&cwd, &dir);
                debug!("Limiting package.json search to {}", dir.display());
                Some(dir)
            }
            None => None,
        };

        Ok(Self { runtime, basedir })
    }

    pub fn basedir(&self) -> Option<&Path> {
        self.basedir.as_deref()
    }

    /// Absolute form of a path given on the command line.
    pub fn resolve_input(&self, path: &Path) -> Result<PathBuf> {
        Ok(absolutize(&self.runtime.current_dir()?, path))
    }
}
