//! Step patterns as registered by glue code, and their compiled matchers.

use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::PatternError;
use crate::expression::compile_expression;

/// A step pattern in the dialect chosen by the glue author.
///
/// The serialised form (`{"kind": "regex", "source": "^a$"}`) is stable and is
/// what hosts persist alongside diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum StepPattern {
    /// A Cucumber expression such as `I have {int} cucumber(s)`.
    Expression(String),
    /// A raw regular expression such as `^I have (\d+) cucumbers?$`.
    Regex(String),
}

impl StepPattern {
    /// Classify pattern text the way Cucumber does when no explicit dialect is
    /// given: text anchored with `^` or `$` is a regular expression, anything
    /// else is a Cucumber expression.
    ///
    /// # Examples
    /// ```
    /// use cuke_glue_patterns::StepPattern;
    /// assert!(matches!(StepPattern::infer("^a (\\d+)$"), StepPattern::Regex(_)));
    /// assert!(matches!(StepPattern::infer("a {int}"), StepPattern::Expression(_)));
    /// ```
    #[must_use]
    pub fn infer(source: impl Into<String>) -> Self {
        let source = source.into();
        if source.starts_with('^') || source.ends_with('$') {
            Self::Regex(source)
        } else {
            Self::Expression(source)
        }
    }

    /// The pattern text exactly as written in the glue code.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Expression(source) | Self::Regex(source) => source,
        }
    }

    /// Compile the pattern into an anchored matcher.
    ///
    /// Regular expressions must match the whole step text; they are wrapped
    /// in `^(?:…)$` so unanchored glue patterns behave like anchored ones.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the pattern is malformed.
    pub fn compile(&self) -> Result<CompiledPattern, PatternError> {
        let regex = match self {
            Self::Expression(source) => compile_expression(source)?,
            Self::Regex(source) => Regex::new(&format!("^(?:{source})$"))?,
        };
        Ok(CompiledPattern {
            pattern: self.clone(),
            regex,
        })
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// A [`StepPattern`] together with its compiled regular expression.
///
/// Equality and hashing use the pattern only, so compiled patterns can live
/// in hashed collections.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: StepPattern,
    regex: Regex,
}

impl CompiledPattern {
    /// Test whether the step text satisfies this pattern.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// The compiled regular expression.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for CompiledPattern {}

impl Hash for CompiledPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn compiled(pattern: &StepPattern) -> CompiledPattern {
        match pattern.compile() {
            Ok(compiled) => compiled,
            Err(err) => panic!("pattern {pattern} should compile: {err}"),
        }
    }

    #[rstest]
    #[case("^I have (\\d+) cukes$", true)]
    #[case("I have (\\d+) cukes$", true)]
    #[case("^I have", true)]
    #[case("I have {int} cukes", false)]
    #[case("plain text", false)]
    fn infers_dialect_from_anchors(#[case] source: &str, #[case] is_regex: bool) {
        assert_eq!(
            matches!(StepPattern::infer(source), StepPattern::Regex(_)),
            is_regex
        );
    }

    #[test]
    fn unanchored_regex_matches_whole_text() {
        let pattern = compiled(&StepPattern::Regex("a (\\d+) b".into()));
        assert!(pattern.is_match("a 1 b"));
        assert!(!pattern.is_match("xa 1 b"));
    }

    #[test]
    fn alternation_in_regex_stays_inside_anchors() {
        let pattern = compiled(&StepPattern::Regex("^a|b$".into()));
        assert!(pattern.is_match("a"));
        assert!(pattern.is_match("b"));
        assert!(!pattern.is_match("ab"));
    }

    #[test]
    fn compiled_patterns_compare_by_source() {
        let a = compiled(&StepPattern::Expression("x".into()));
        let b = compiled(&StepPattern::Expression("x".into()));
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_regex_is_reported() {
        assert!(StepPattern::Regex("(unclosed".into()).compile().is_err());
    }

    #[test]
    fn serialises_with_kind_tag() {
        let pattern = StepPattern::Regex("^a$".into());
        let json = serde_json::to_string(&pattern)
            .unwrap_or_else(|err| panic!("pattern should serialise: {err}"));
        assert_eq!(json, r#"{"kind":"regex","source":"^a$"}"#);
    }
}
