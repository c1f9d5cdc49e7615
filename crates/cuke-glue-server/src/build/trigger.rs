//! The recalculate trigger.
//!
//! Recalculating a feature bumps its modification time so the incremental
//! build sees it as changed, then runs that build. When the file cannot be
//! touched, or the clock did not move past the recorded stamp, the file is
//! forced dirty instead.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, warn};

use super::{BuildKind, BuildReport, Workspace};
use crate::identity::FileId;

/// Recalculate the markers of `file` and of anything the rebuild touches.
///
/// Returns `None` without doing anything when `file` is not a `.feature`
/// file.
pub fn recalculate(workspace: &mut Workspace, file: &FileId) -> Option<BuildReport> {
    if !file.is_feature() {
        debug!(%file, "ignoring recalculate for non-feature file");
        return None;
    }

    let previous = workspace.recorded_stamp(file);
    match touch(file.path()) {
        Ok(stamp) if stamp.is_some() && stamp != previous => {}
        Ok(_) => workspace.mark_dirty(file.clone()),
        Err(err) => {
            warn!(%file, error = %err, "failed to touch feature file; forcing rebuild");
            workspace.mark_dirty(file.clone());
        }
    }
    Some(workspace.build(BuildKind::Incremental))
}

fn touch(path: &Path) -> io::Result<Option<SystemTime>> {
    let handle = File::options().write(true).open(path)?;
    handle.set_modified(SystemTime::now())?;
    Ok(handle.metadata()?.modified().ok())
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::markers::{InMemoryMarkerStore, MarkerKind};
    use tempfile::TempDir;

    fn workspace_with(files: &[(&str, &str)]) -> (TempDir, Workspace) {
        let dir = TempDir::new().expect("temp dir");
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).expect("write file");
        }
        let workspace = Workspace::new(dir.path(), Box::new(InMemoryMarkerStore::new()));
        (dir, workspace)
    }

    #[test]
    fn ignores_non_feature_files() {
        let (dir, mut workspace) = workspace_with(&[("steps.rs", "")]);
        let file = FileId::new(dir.path().join("steps.rs"));
        assert!(recalculate(&mut workspace, &file).is_none());
    }

    #[test]
    fn recomputes_an_unchanged_feature() {
        let (dir, mut workspace) = workspace_with(&[(
            "a.feature",
            "Feature: a\n  Scenario: s\n    Given nothing glues this\n",
        )]);
        workspace.build(BuildKind::Full);
        let file = FileId::new(dir.path().join("a.feature"));

        let report = recalculate(&mut workspace, &file).expect("feature file");

        assert_eq!(report.feature_files, 1);
        let kinds: Vec<_> = workspace.markers(&file).iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::UnmatchedStep]);
    }
}
