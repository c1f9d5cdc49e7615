//! Step definitions as held by the repository.

use std::hash::{Hash, Hasher};

use cuke_glue_patterns::{CompiledPattern, PatternError, StepKeyword, StepPattern};

use crate::identity::FileId;

/// A glue-code step definition: a pattern declared at a line of a file.
///
/// Immutable once built. Equality and hashing cover the pattern, the
/// declaring file and the line; the keyword is informational because
/// matching ignores it.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    compiled: CompiledPattern,
    file: FileId,
    line: usize,
    keyword: Option<StepKeyword>,
}

impl StepDefinition {
    /// Compile `pattern` and bind it to its declaration site.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the pattern cannot be compiled.
    pub fn new(
        pattern: &StepPattern,
        file: FileId,
        line: usize,
        keyword: Option<StepKeyword>,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            compiled: pattern.compile()?,
            file,
            line,
            keyword,
        })
    }

    /// The pattern as declared.
    #[must_use]
    pub fn pattern(&self) -> &StepPattern {
        self.compiled.pattern()
    }

    /// The file declaring this definition.
    #[must_use]
    pub fn file(&self) -> &FileId {
        &self.file
    }

    /// The 1-based declaring line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// The keyword the glue registered the step under, if any.
    #[must_use]
    pub fn keyword(&self) -> Option<StepKeyword> {
        self.keyword
    }

    /// Whether `text` (a step without its keyword) satisfies this definition.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }

    /// `name:line`, the short location used in marker messages.
    #[must_use]
    pub fn short_location(&self) -> String {
        format!("{}:{}", self.file.name(), self.line)
    }

    /// `full/path:line`, the location carried in marker attributes.
    #[must_use]
    pub fn full_location(&self) -> String {
        format!("{}:{}", self.file.full_path(), self.line)
    }
}

impl PartialEq for StepDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line
            && self.file == other.file
            && self.compiled.pattern() == other.compiled.pattern()
    }
}

impl Eq for StepDefinition {}

impl Hash for StepDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.compiled.pattern().hash(state);
        self.file.hash(state);
        self.line.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(source: &str, line: usize, keyword: Option<StepKeyword>) -> StepDefinition {
        StepDefinition::new(
            &StepPattern::infer(source),
            FileId::new("/p/steps.rs"),
            line,
            keyword,
        )
        .unwrap_or_else(|err| panic!("definition should compile: {err}"))
    }

    #[test]
    fn equality_ignores_keyword() {
        assert_eq!(
            definition("a step", 3, Some(StepKeyword::Given)),
            definition("a step", 3, Some(StepKeyword::Then))
        );
    }

    #[test]
    fn equality_includes_line() {
        assert_ne!(definition("a step", 3, None), definition("a step", 4, None));
    }

    #[test]
    fn renders_locations() {
        let def = definition("a step", 7, None);
        assert_eq!(def.short_location(), "steps.rs:7");
        assert_eq!(def.full_location(), "/p/steps.rs:7");
    }

    #[test]
    fn rejects_malformed_patterns() {
        let result = StepDefinition::new(
            &StepPattern::Regex("(".into()),
            FileId::new("/p/steps.rs"),
            1,
            None,
        );
        assert!(result.is_err());
    }
}
