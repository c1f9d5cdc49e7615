//! Per-file repository of step definitions.
//!
//! Glue files are re-extracted one at a time as they change, so the
//! repository is keyed by [`FileId`] and each update replaces one file's
//! entry wholesale. The aggregate definition set used for matching is
//! recomputed from the per-file entries on every query rather than cached,
//! which keeps it consistent with the latest `put` without bookkeeping.
//!
//! The map sits behind a reader/writer lock. A `put` holds the write lock for
//! the whole replacement, so readers see either the old entry or the new one.

use std::collections::{BTreeMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::definition::StepDefinition;
use crate::identity::FileId;

type Entries = BTreeMap<FileId, Vec<StepDefinition>>;

/// In-memory index of step definitions keyed by declaring file.
///
/// A file that contributes no definitions has no entry at all.
#[derive(Debug, Default)]
pub struct StepDefinitionsRepository {
    entries: RwLock<Entries>,
}

impl StepDefinitionsRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the definitions contributed by `file`.
    ///
    /// An empty set removes the entry. Definitions that compare equal are
    /// kept once, at their first position.
    ///
    /// # Examples
    ///
    /// ```
    /// use cuke_glue_patterns::StepPattern;
    /// use cuke_glue_server::definition::StepDefinition;
    /// use cuke_glue_server::identity::FileId;
    /// use cuke_glue_server::repository::StepDefinitionsRepository;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let repo = StepDefinitionsRepository::new();
    /// let file = FileId::new("/p/steps.rs");
    /// let def = StepDefinition::new(&StepPattern::infer("a step"), file.clone(), 3, None)?;
    ///
    /// repo.put(file.clone(), vec![def]);
    /// assert!(repo.contributes_definitions(&file));
    ///
    /// repo.put(file.clone(), Vec::new());
    /// assert!(!repo.contributes_definitions(&file));
    /// # Ok(())
    /// # }
    /// ```
    pub fn put(&self, file: FileId, definitions: impl IntoIterator<Item = StepDefinition>) {
        let definitions: Vec<StepDefinition> = definitions.into_iter().collect();
        let unique = first_occurrences(&definitions);

        let mut entries = self.write();
        if unique.is_empty() {
            entries.remove(&file);
        } else {
            entries.insert(file, unique);
        }
    }

    /// Files currently contributing at least one definition, in identity
    /// order.
    #[must_use]
    pub fn all_files(&self) -> Vec<FileId> {
        self.read().keys().cloned().collect()
    }

    /// Union of every file's definitions.
    ///
    /// Files are visited in identity order and each file's definitions in
    /// declaration order, so repeated calls over the same content agree.
    #[must_use]
    pub fn all_definitions(&self) -> Vec<StepDefinition> {
        first_occurrences(self.read().values().flatten())
    }

    /// Definitions contributed by a single file.
    #[must_use]
    pub fn definitions_for(&self, file: &FileId) -> Vec<StepDefinition> {
        self.read().get(file).cloned().unwrap_or_default()
    }

    /// Whether `file` currently contributes any definitions.
    #[must_use]
    pub fn contributes_definitions(&self, file: &FileId) -> bool {
        self.read().contains_key(file)
    }

    /// Drop every entry.
    pub fn reset(&self) {
        self.write().clear();
    }

    // A panic while holding the lock cannot leave a half-written entry
    // because every mutation is a single map operation.
    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clones of `definitions` with later duplicates dropped, order kept.
fn first_occurrences<'a>(
    definitions: impl IntoIterator<Item = &'a StepDefinition>,
) -> Vec<StepDefinition> {
    let mut seen = HashSet::new();
    definitions
        .into_iter()
        .filter(|definition| seen.insert(*definition))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuke_glue_patterns::StepPattern;
    use rstest::{fixture, rstest};

    fn def(file: &FileId, source: &str, line: usize) -> StepDefinition {
        StepDefinition::new(&StepPattern::infer(source), file.clone(), line, None)
            .unwrap_or_else(|err| panic!("definition should compile: {err}"))
    }

    #[fixture]
    fn repo() -> StepDefinitionsRepository {
        StepDefinitionsRepository::new()
    }

    #[rstest]
    fn put_records_contribution(repo: StepDefinitionsRepository) {
        let file = FileId::new("/p/a.rs");
        repo.put(file.clone(), vec![def(&file, "one", 1)]);
        assert!(repo.contributes_definitions(&file));
        assert_eq!(repo.all_files(), vec![file]);
    }

    #[rstest]
    fn put_empty_removes_entry(repo: StepDefinitionsRepository) {
        let file = FileId::new("/p/a.rs");
        repo.put(file.clone(), vec![def(&file, "one", 1)]);
        repo.put(file.clone(), Vec::new());
        assert!(!repo.contributes_definitions(&file));
        assert!(repo.all_files().is_empty());
    }

    #[rstest]
    fn put_replaces_wholesale(repo: StepDefinitionsRepository) {
        let file = FileId::new("/p/a.rs");
        repo.put(file.clone(), vec![def(&file, "one", 1), def(&file, "two", 2)]);
        repo.put(file.clone(), vec![def(&file, "three", 5)]);
        assert_eq!(repo.definitions_for(&file), vec![def(&file, "three", 5)]);
    }

    #[rstest]
    fn put_is_idempotent_and_dedupes(repo: StepDefinitionsRepository) {
        let file = FileId::new("/p/a.rs");
        let defs = vec![def(&file, "one", 1), def(&file, "two", 2), def(&file, "one", 1)];
        repo.put(file.clone(), defs.clone());
        repo.put(file.clone(), defs);
        assert_eq!(
            repo.definitions_for(&file),
            vec![def(&file, "one", 1), def(&file, "two", 2)]
        );
    }

    #[rstest]
    fn union_spans_files_in_stable_order(repo: StepDefinitionsRepository) {
        let b = FileId::new("/p/b.rs");
        let a = FileId::new("/p/a.rs");
        repo.put(b.clone(), vec![def(&b, "from b", 1)]);
        repo.put(a.clone(), vec![def(&a, "from a", 4), def(&a, "also a", 9)]);

        let all = repo.all_definitions();
        assert_eq!(
            all,
            vec![def(&a, "from a", 4), def(&a, "also a", 9), def(&b, "from b", 1)]
        );
        assert_eq!(all, repo.all_definitions());
    }

    #[rstest]
    fn reset_clears_everything(repo: StepDefinitionsRepository) {
        let file = FileId::new("/p/a.rs");
        repo.put(file.clone(), vec![def(&file, "one", 1)]);
        repo.reset();
        assert!(repo.all_definitions().is_empty());
        assert!(!repo.contributes_definitions(&file));
    }

    #[rstest]
    fn unknown_file_has_no_definitions(repo: StepDefinitionsRepository) {
        assert!(repo.definitions_for(&FileId::new("/p/none.rs")).is_empty());
    }
}
