pub mod config;
mod check;
mod info;

pub use check::{ExportStatus, check};
pub use info::{exports, info};
