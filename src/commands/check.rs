use anyhow::{Result, bail};
use log::debug;
use std::path::Path;

use crate::{
    package::{PackageMetadata, extract_metadata},
    runtime::Runtime,
};

use super::config::Config;

/// Whether a file is part of its package's public surface
#[derive(Debug, PartialEq)]
pub enum ExportStatus {
    Exported,
    NotExported,
    /// No usable `exports` field (absent or unsupported)
    Unknown,
}

impl ExportStatus {
    pub fn of(meta: &PackageMetadata, file: &Path) -> Self {
        match meta.is_exported(file) {
            Some(true) => ExportStatus::Exported,
            Some(false) => ExportStatus::NotExported,
            None => ExportStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportStatus::Exported => write!(f, "exported"),
            ExportStatus::NotExported => write!(f, "not exported"),
            ExportStatus::Unknown => write!(f, "no exports field"),
        }
    }
}

/// Check whether `file` is exported by the package containing it
#[tracing::instrument(skip(config))]
pub fn check<R: Runtime>(config: &Config<R>, file: &Path) -> Result<ExportStatus> {
    let file = config.resolve_input(file)?;
    if config.runtime.is_dir(&file) {
        bail!("Not a file: {} is a directory", file.display());
    }
    if !config.runtime.is_file(&file) {
        bail!("File not found: {}", file.display());
    }

    let meta = extract_metadata(&config.runtime, &file, config.basedir());
    debug!("Checking {} against {}", file.display(), meta.package_key);

    let status = ExportStatus::of(&meta, &file);
    println!("{}", status);
    Ok(status)
}
