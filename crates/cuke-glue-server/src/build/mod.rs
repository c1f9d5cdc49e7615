//! Full and incremental builds of a project.
//!
//! A [`Workspace`] owns everything one project's build needs: the
//! step-definition repository, the marker store, the glue extractors and the
//! modification stamps recorded by the previous build. There is no global
//! state; the language server keeps one workspace per project root.
//!
//! A build walks the project tree and decides what to redo:
//!
//! - A full build resets the repository and treats every file as changed.
//! - An incremental build compares each file's modification stamp with the
//!   one recorded last time. Changed glue files are re-extracted. If any glue
//!   changed, every feature is recomputed, since any step may now bind
//!   differently; otherwise only the changed features are.
//!
//! Recomputing a feature cleans its markers and places fresh ones inside a
//! single batch, so each feature produces one change notification.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::discovery::scan_project;
use crate::identity::FileId;
use crate::indexing::{StepDefinitionExtractor, default_extractors};
use crate::markers::{Marker, MarkerFactory, MarkerStore};
use crate::repository::StepDefinitionsRepository;

mod recompute;
mod trigger;

pub use trigger::recalculate;

/// Which kind of build to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// Forget everything and rebuild every file.
    Full,
    /// Rebuild only what changed since the previous build.
    Incremental,
}

/// Settings the builder takes from the server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSettings {
    /// Place informational markers on glued steps.
    pub report_matches: bool,
    /// Skip files larger than this many bytes.
    pub max_file_bytes: u64,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for BuildSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            report_matches: config.report_matches,
            max_file_bytes: config.max_file_bytes,
        }
    }
}

/// Counts describing what a build did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// Glue files whose definitions were re-extracted.
    pub glue_files: usize,
    /// Feature files whose markers were recomputed.
    pub feature_files: usize,
    /// Previously built files that no longer exist.
    pub removed_files: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Feature,
    Glue(usize),
}

/// Build context for one project.
pub struct Workspace {
    root: PathBuf,
    repository: StepDefinitionsRepository,
    markers: Box<dyn MarkerStore>,
    extractors: Vec<Box<dyn StepDefinitionExtractor>>,
    settings: BuildSettings,
    stamps: HashMap<FileId, Option<SystemTime>>,
    forced: HashSet<FileId>,
    overlays: HashMap<FileId, String>,
}

impl Workspace {
    /// Create a workspace rooted at `root`, writing markers to `markers`.
    ///
    /// The default extractors (Rust and Java) are registered.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, markers: Box<dyn MarkerStore>) -> Self {
        Self {
            root: FileId::new(root.into()).path().to_path_buf(),
            repository: StepDefinitionsRepository::new(),
            markers,
            extractors: default_extractors(),
            settings: BuildSettings::default(),
            stamps: HashMap::new(),
            forced: HashSet::new(),
            overlays: HashMap::new(),
        }
    }

    /// Replace the build settings.
    #[must_use]
    pub fn with_settings(mut self, settings: BuildSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the registered extractors.
    #[must_use]
    pub fn with_extractors(mut self, extractors: Vec<Box<dyn StepDefinitionExtractor>>) -> Self {
        self.extractors = extractors;
        self
    }

    /// The project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` lies inside this project.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        FileId::new(path).path().starts_with(&self.root)
    }

    /// The step-definition repository.
    #[must_use]
    pub fn repository(&self) -> &StepDefinitionsRepository {
        &self.repository
    }

    /// Markers currently attached to `file`.
    #[must_use]
    pub fn markers(&self, file: &FileId) -> Vec<Marker> {
        self.markers.markers(file)
    }

    /// Use `text` instead of the file's disk content in the next build.
    pub fn set_overlay(&mut self, file: FileId, text: String) {
        self.overlays.insert(file, text);
    }

    /// Force `file` to be rebuilt by the next incremental build.
    pub fn mark_dirty(&mut self, file: FileId) {
        self.forced.insert(file);
    }

    /// Whether `path` is a glue file some extractor handles.
    #[must_use]
    pub fn is_glue_file(&self, path: &Path) -> bool {
        self.extractors.iter().any(|extractor| extractor.handles(path))
    }

    /// Text of `file`: the overlay when one is set, otherwise the disk
    /// content.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while reading the file.
    pub fn source_text(&self, file: &FileId) -> std::io::Result<String> {
        match self.overlays.get(file) {
            Some(text) => Ok(text.clone()),
            None => std::fs::read_to_string(file.path()),
        }
    }

    /// Run a build over the whole project.
    ///
    /// Files seen by the previous build but gone now lose their markers and
    /// definitions for either kind of build. A full build then forgets every
    /// recorded stamp and the repository, so every remaining file is rebuilt.
    pub fn build(&mut self, kind: BuildKind) -> BuildReport {
        let current: BTreeMap<FileId, SourceKind> =
            scan_project(&self.root, self.settings.max_file_bytes)
                .into_iter()
                .filter_map(|path| {
                    let kind = self.classify(&path)?;
                    Some((FileId::new(path), kind))
                })
                .collect();

        let mut report = BuildReport::default();
        let mut glue_changed = self.forget_removed_files(&current, &mut report);
        if kind == BuildKind::Full {
            self.repository.reset();
            self.stamps.clear();
        }

        let mut changed_features = Vec::new();
        for (file, source_kind) in &current {
            if !self.refresh_stamp(file) {
                continue;
            }
            match source_kind {
                SourceKind::Feature => changed_features.push(file.clone()),
                SourceKind::Glue(extractor) => {
                    self.index_glue_file(file, *extractor);
                    report.glue_files += 1;
                    glue_changed = true;
                }
            }
        }

        let features: Vec<FileId> = if glue_changed {
            current
                .iter()
                .filter(|(_, kind)| **kind == SourceKind::Feature)
                .map(|(file, _)| file.clone())
                .collect()
        } else {
            changed_features
        };
        for file in &features {
            self.recompute_feature(file);
        }
        report.feature_files = features.len();

        self.overlays.clear();
        self.forced.clear();
        info!(
            root = %self.root.display(),
            ?kind,
            glue_files = report.glue_files,
            feature_files = report.feature_files,
            removed_files = report.removed_files,
            "build finished"
        );
        report
    }

    fn classify(&self, path: &Path) -> Option<SourceKind> {
        if FileId::new(path).is_feature() {
            return Some(SourceKind::Feature);
        }
        self.extractors
            .iter()
            .position(|extractor| extractor.handles(path))
            .map(SourceKind::Glue)
    }

    /// Record the file's current stamp, returning whether it needs a rebuild.
    fn refresh_stamp(&mut self, file: &FileId) -> bool {
        let stamp = modified(file.path());
        let forced = self.forced.remove(file) || self.overlays.contains_key(file);
        let previous = self.stamps.insert(file.clone(), stamp);
        forced || previous != Some(stamp)
    }

    fn recorded_stamp(&self, file: &FileId) -> Option<SystemTime> {
        self.stamps.get(file).copied().flatten()
    }

    /// Drop state for files built previously but gone now. Returns whether
    /// any of them contributed definitions.
    fn forget_removed_files(
        &mut self,
        current: &BTreeMap<FileId, SourceKind>,
        report: &mut BuildReport,
    ) -> bool {
        let removed: Vec<FileId> = self
            .stamps
            .keys()
            .filter(|file| !current.contains_key(*file))
            .cloned()
            .collect();

        let mut glue_changed = false;
        for file in removed {
            debug!(%file, "file removed since last build");
            self.stamps.remove(&file);
            if self.repository.contributes_definitions(&file) {
                self.repository.put(file.clone(), Vec::new());
                glue_changed = true;
            }
            self.factory().clean_markers(&file);
            report.removed_files += 1;
        }
        glue_changed
    }

    fn factory(&self) -> MarkerFactory<'_> {
        MarkerFactory::new(self.markers.as_ref()).with_report_matches(self.settings.report_matches)
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("settings", &self.settings)
            .field("glue_files", &self.repository.all_files().len())
            .finish_non_exhaustive()
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
