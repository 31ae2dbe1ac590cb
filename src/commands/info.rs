use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::{
    package::{PackageMetadata, extract_metadata},
    runtime::Runtime,
};

use super::config::Config;

/// Show the metadata of the package containing `path` as JSON
#[tracing::instrument(skip(config))]
pub fn info<R: Runtime>(config: &Config<R>, path: &Path) -> Result<()> {
    let meta = extract_metadata(&config.runtime, path, config.basedir());
    debug!("Package of {}: {}", path.display(), meta.package_key);
    println!("{}", render_info(&meta)?);
    Ok(())
}

/// List the export patterns of the package containing `path`
#[tracing::instrument(skip(config))]
pub fn exports<R: Runtime>(config: &Config<R>, path: &Path) -> Result<()> {
    let meta = extract_metadata(&config.runtime, path, config.basedir());
    print!("{}", render_exports(&meta));
    Ok(())
}

fn render_info(meta: &PackageMetadata) -> Result<String> {
    Ok(serde_json::to_string_pretty(meta)?)
}

fn render_exports(meta: &PackageMetadata) -> String {
    match &meta.exports {
        Some(patterns) => patterns.iter().map(|p| format!("{p}\n")).collect(),
        None => "(no exports)\n".to_string(),
    }
}
