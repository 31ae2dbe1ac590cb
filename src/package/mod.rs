//! Package metadata module
//!
//! This module locates the `package.json` a file belongs to and extracts a
//! normalized view of the package: identity, main entry and export patterns.

mod descriptor;
mod discovery;
mod exports;
mod meta;

pub use descriptor::{DESCRIPTOR_FILE, PackageJson};
pub use discovery::{
    DEPENDENCY_STORE, DescriptorLocation, expected_package_name, find_descriptor,
    is_valid_descriptor_dir,
};
pub use exports::{export_subpath, flatten_exports, is_in_exports};
pub use meta::{
    ANONYMOUS_PACKAGE_NAME, MAIN_PACKAGE_NAME, PackageMetadata, UNKNOWN_PACKAGE_KEY,
    extract_metadata,
};
