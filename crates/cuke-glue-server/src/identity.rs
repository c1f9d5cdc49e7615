//! Stable file identity used as the key for every per-file index.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Identity of a source file: its absolute, lexically normalised path.
///
/// Two ids compare equal when they name the same path after `.` and `..`
/// components are resolved. Symlinks are not followed, so an id can be built
/// for a file that does not exist yet (or no longer exists).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(PathBuf);

impl FileId {
    /// Build an id for `path`, resolving relative paths against the current
    /// directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cuke_glue_server::identity::FileId;
    ///
    /// let a = FileId::new("/work/features/../features/login.feature");
    /// let b = FileId::new("/work/features/login.feature");
    /// assert_eq!(a, b);
    /// assert_eq!(a.name(), "login.feature");
    /// ```
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        };
        Self(normalise(&absolute))
    }

    /// The normalised path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The final path component, as shown in marker messages.
    #[must_use]
    pub fn name(&self) -> String {
        self.0.file_name().map_or_else(
            || self.full_path(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// The full path rendered as text.
    #[must_use]
    pub fn full_path(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }

    /// Whether the file carries the given extension (ASCII case-insensitive).
    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.0
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Whether the file is a Gherkin feature file.
    #[must_use]
    pub fn is_feature(&self) -> bool {
        self.has_extension("feature")
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&Path> for FileId {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for FileId {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

fn normalise(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
