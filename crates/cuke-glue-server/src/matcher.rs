//! Classifies a step's text against the known step definitions.
//!
//! Matching is keyword-agnostic: Cucumber treats `Given`, `When`, `Then`,
//! `And` and `But` as interchangeable when resolving glue. No precedence is
//! applied between competing definitions; every definition that matches is
//! reported.

use crate::definition::StepDefinition;

/// Result of matching one step against the definition set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No definition matches the step.
    NoMatch,
    /// Exactly one definition matches.
    SingleMatch(StepDefinition),
    /// Several definitions match, in the order they were encountered.
    MultipleMatch(Vec<StepDefinition>),
}

impl MatchOutcome {
    /// Whether at least one definition matched.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }

    /// All matching definitions.
    #[must_use]
    pub fn definitions(&self) -> &[StepDefinition] {
        match self {
            Self::NoMatch => &[],
            Self::SingleMatch(definition) => std::slice::from_ref(definition),
            Self::MultipleMatch(definitions) => definitions,
        }
    }
}

/// Match `text` (the step without its keyword) against `definitions`.
///
/// # Examples
///
/// ```
/// use cuke_glue_patterns::StepPattern;
/// use cuke_glue_server::definition::StepDefinition;
/// use cuke_glue_server::identity::FileId;
/// use cuke_glue_server::matcher::{MatchOutcome, match_step};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = FileId::new("/p/steps.rs");
/// let defs = vec![
///     StepDefinition::new(&StepPattern::infer("I have {int} cukes"), file.clone(), 3, None)?,
/// ];
/// assert!(matches!(match_step("I have 5 cukes", &defs), MatchOutcome::SingleMatch(_)));
/// assert_eq!(match_step("I have no cukes", &defs), MatchOutcome::NoMatch);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn match_step(text: &str, definitions: &[StepDefinition]) -> MatchOutcome {
    let mut matched: Vec<StepDefinition> = definitions
        .iter()
        .filter(|definition| definition.matches(text))
        .cloned()
        .collect();

    match matched.len() {
        0 => MatchOutcome::NoMatch,
        1 => matched
            .pop()
            .map_or(MatchOutcome::NoMatch, MatchOutcome::SingleMatch),
        _ => MatchOutcome::MultipleMatch(matched),
    }
}
