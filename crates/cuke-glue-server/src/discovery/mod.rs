//! Project discovery and file scanning.
//!
//! A project is the directory tree one build covers. Its root is found by
//! walking up to the nearest build or version-control marker.

mod project;

pub use project::{find_project_root, scan_project};
