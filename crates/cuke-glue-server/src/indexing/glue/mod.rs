//! Step-definition extraction from glue code.
//!
//! Extraction is pluggable: each [`StepDefinitionExtractor`] recognises one
//! family of glue files and returns the step patterns declared in them. The
//! builder asks every registered extractor whether it handles a file and uses
//! the first that does.

use std::path::Path;

use cuke_glue_patterns::{StepKeyword, StepPattern};

mod java;
mod rust;

pub use java::JavaStepExtractor;
pub use rust::RustStepExtractor;

/// A step declaration found in glue code, before pattern compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedStep {
    /// The declared pattern.
    pub pattern: StepPattern,
    /// 1-based line of the declaration.
    pub line: usize,
    /// The keyword the step is registered under, when the glue states one.
    pub keyword: Option<StepKeyword>,
}

/// Everything an extractor found in one glue file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlueExtraction {
    /// Well-formed step declarations, in source order.
    pub steps: Vec<ExtractedStep>,
    /// Step declarations whose shape was not understood. The rest of the
    /// file is still usable.
    pub rejected: Vec<GlueIndexError>,
}

/// Errors raised while extracting step definitions from a glue file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlueIndexError {
    /// The glue source is not syntactically valid.
    #[error("{message}")]
    Syntax {
        /// Parser message.
        message: String,
        /// 1-based line of the problem, `0` when unknown.
        line: usize,
    },
}

impl GlueIndexError {
    /// Line the error refers to, `0` when unknown.
    #[must_use]
    pub fn line(&self) -> usize {
        let Self::Syntax { line, .. } = self;
        *line
    }
}

/// Produces step declarations from one family of glue files.
pub trait StepDefinitionExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this extractor handles `path`.
    fn handles(&self, path: &Path) -> bool;

    /// Extract the step declarations from `source`.
    ///
    /// A malformed declaration is reported in
    /// [`GlueExtraction::rejected`] without losing the others.
    ///
    /// # Errors
    ///
    /// Returns [`GlueIndexError::Syntax`] when `source` as a whole cannot be
    /// parsed.
    fn extract(&self, source: &str) -> Result<GlueExtraction, GlueIndexError>;
}

/// The extractors shipped with the server: Rust `cucumber` attributes and
/// Cucumber-JVM annotations.
#[must_use]
pub fn default_extractors() -> Vec<Box<dyn StepDefinitionExtractor>> {
    vec![Box::new(RustStepExtractor), Box::new(JavaStepExtractor)]
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/p/steps.rs", Some("rust"))]
    #[case("/p/Steps.java", Some("java"))]
    #[case("/p/a.feature", None)]
    #[case("/p/readme.md", None)]
    fn default_extractors_split_by_extension(#[case] path: &str, #[case] expected: Option<&str>) {
        let extractors = default_extractors();
        let found = extractors
            .iter()
            .find(|extractor| extractor.handles(Path::new(path)))
            .map(|extractor| extractor.name());
        assert_eq!(found, expected);
    }
}
