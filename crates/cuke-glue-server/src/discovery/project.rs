//! Project-root discovery and source scanning.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::ServerError;

/// Files or directories whose presence marks a project root.
const PROJECT_MARKERS: &[&str] = &[
    "Cargo.toml",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    ".git",
];

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// Find the nearest enclosing project root of `path`.
///
/// Walks up from `path` (or its parent, for files) until a directory holding
/// one of the project markers (`Cargo.toml`, `pom.xml`, `build.gradle`,
/// `build.gradle.kts` or `.git`) is found.
///
/// # Errors
///
/// Returns `ServerError::ProjectDiscovery` when no ancestor carries a marker.
pub fn find_project_root(path: &Path) -> Result<PathBuf, ServerError> {
    let start = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };

    start
        .ancestors()
        .find(|dir| PROJECT_MARKERS.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            ServerError::ProjectDiscovery(format!(
                "no project marker found in {} or any parent directory",
                start.display()
            ))
        })
}

/// List every regular file under `root` worth indexing.
///
/// Hidden directories, `target/` and `node_modules/` are skipped, as are
/// files larger than `max_file_bytes`. The result is sorted.
#[must_use]
pub fn scan_project(root: &Path, max_file_bytes: u64) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(should_descend)
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| within_size_limit(entry, max_file_bytes))
        .map(DirEntry::into_path)
        .collect();
    files.sort();
    files
}

fn should_descend(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
}

fn within_size_limit(entry: &DirEntry, max_file_bytes: u64) -> bool {
    let Ok(metadata) = entry.metadata() else {
        return false;
    };
    if metadata.len() > max_file_bytes {
        debug!(
            path = %entry.path().display(),
            size = metadata.len(),
            "skipping oversized file"
        );
        return false;
    }
    true
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directories");
        }
        std::fs::write(path, content).expect("write file");
    }

    #[test]
    fn finds_nearest_marker() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "Cargo.toml", "[package]\n");
        write(dir.path(), "tests/features/a.feature", "Feature: a\n");

        let root = find_project_root(&dir.path().join("tests/features/a.feature"))
            .expect("project root");
        assert_eq!(root, dir.path());
    }

    #[test]
    fn scan_skips_hidden_build_and_oversized_entries() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "features/a.feature", "Feature: a\n");
        write(dir.path(), "src/steps.rs", "fn main() {}\n");
        write(dir.path(), "target/debug/junk.rs", "");
        write(dir.path(), "node_modules/pkg/x.java", "");
        write(dir.path(), ".git/HEAD", "ref");
        write(dir.path(), "big.feature", &"x".repeat(64));

        let files = scan_project(dir.path(), 32);
        let relative: Vec<_> = files
            .iter()
            .map(|path| path.strip_prefix(dir.path()).expect("under root").to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("features/a.feature"),
                PathBuf::from("src/steps.rs")
            ]
        );
    }
}
