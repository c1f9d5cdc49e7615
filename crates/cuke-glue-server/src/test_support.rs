//! Shared test support utilities for cuke-glue-server tests.
//!
//! Provides a builder that lays out a project in a temporary directory, runs
//! a full build over it, and records every change notification the marker
//! store emits.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use crate::build::{BuildKind, BuildReport, BuildSettings, Workspace};
use crate::identity::FileId;
use crate::markers::{InMemoryMarkerStore, Marker, MarkerKind};

/// Newtype wrapper for test file names.
#[derive(Debug, Clone)]
pub struct Filename(pub(crate) String);

impl From<&str> for Filename {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for Filename {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Newtype wrapper for file contents.
#[derive(Debug, Clone)]
pub struct FileContent(pub(crate) String);

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        Self(s)
    }
}

type NotificationLog = Arc<Mutex<Vec<Vec<FileId>>>>;

/// A built project in a temporary directory.
pub struct TestWorkspace {
    /// Temporary directory holding the project.
    pub dir: TempDir,
    /// The workspace under test.
    pub workspace: Workspace,
    /// Report of the initial full build.
    pub initial_report: BuildReport,
    notifications: NotificationLog,
    tick: u64,
}

impl TestWorkspace {
    /// Absolute path of a project file.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Identity of a project file.
    #[must_use]
    pub fn file(&self, name: &str) -> FileId {
        FileId::new(self.path(name))
    }

    /// Markers currently on a project file.
    #[must_use]
    pub fn markers(&self, name: &str) -> Vec<Marker> {
        self.workspace.markers(&self.file(name))
    }

    /// Kinds of the markers currently on a project file, in placement order.
    #[must_use]
    pub fn kinds(&self, name: &str) -> Vec<MarkerKind> {
        self.markers(name).iter().map(|marker| marker.kind).collect()
    }

    /// Overwrite a project file and move its modification time forward.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[expect(clippy::expect_used, reason = "test helper panics on I/O failure")]
    pub fn write(&mut self, name: impl Into<Filename>, content: impl Into<FileContent>) {
        let path = self.dir.path().join(name.into().0);
        write_file(&path, &content.into().0);
        self.tick += 1;
        std::fs::File::options()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(SystemTime::now() + Duration::from_secs(self.tick)))
            .expect("bump modification time");
    }

    /// Delete a project file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be removed.
    #[expect(clippy::expect_used, reason = "test helper panics on I/O failure")]
    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.path(name)).expect("remove file");
    }

    /// Run a build.
    pub fn build(&mut self, kind: BuildKind) -> BuildReport {
        self.workspace.build(kind)
    }

    /// Change notifications received so far, one entry per notification.
    #[must_use]
    pub fn notifications(&self) -> Vec<Vec<FileId>> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the notifications received so far.
    pub fn clear_notifications(&self) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Builder laying out a project and running its first full build.
pub struct WorkspaceBuilder {
    dir: TempDir,
    files: Vec<(String, String)>,
    settings: BuildSettings,
}

impl WorkspaceBuilder {
    /// Create a builder over a fresh temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[expect(clippy::expect_used, reason = "builder panics on temp dir failure")]
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
            files: Vec::new(),
            settings: BuildSettings::default(),
        }
    }

    /// Add a file at a path relative to the project root.
    #[must_use]
    pub fn with_file(mut self, filename: impl Into<Filename>, content: impl Into<FileContent>) -> Self {
        self.files.push((filename.into().0, content.into().0));
        self
    }

    /// Add a feature file.
    #[must_use]
    pub fn with_feature(self, filename: impl Into<Filename>, content: impl Into<FileContent>) -> Self {
        self.with_file(filename, content)
    }

    /// Add a Rust glue file.
    #[must_use]
    pub fn with_rust_steps(
        self,
        filename: impl Into<Filename>,
        content: impl Into<FileContent>,
    ) -> Self {
        self.with_file(filename, content)
    }

    /// Add a Java glue file.
    #[must_use]
    pub fn with_java_steps(
        self,
        filename: impl Into<Filename>,
        content: impl Into<FileContent>,
    ) -> Self {
        self.with_file(filename, content)
    }

    /// Choose whether glued steps get an informational marker.
    #[must_use]
    pub fn with_report_matches(mut self, report_matches: bool) -> Self {
        self.settings.report_matches = report_matches;
        self
    }

    /// Write every file and run a full build.
    #[must_use]
    pub fn build(self) -> TestWorkspace {
        for (filename, content) in &self.files {
            write_file(&self.dir.path().join(filename), content);
        }

        let notifications = NotificationLog::default();
        let sink = Arc::clone(&notifications);
        let store = InMemoryMarkerStore::with_listener(Box::new(move |files| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(files.to_vec());
        }));
        let mut workspace =
            Workspace::new(self.dir.path(), Box::new(store)).with_settings(self.settings);
        let initial_report = workspace.build(BuildKind::Full);

        TestWorkspace {
            dir: self.dir,
            workspace,
            initial_report,
            notifications,
            tick: 0,
        }
    }
}

impl Default for WorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[expect(clippy::expect_used, reason = "test helper panics on I/O failure")]
fn write_file(path: &std::path::Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directories");
    }
    std::fs::write(path, content).expect("write file");
}
