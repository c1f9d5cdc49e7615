//! The marker kinds and their severities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How prominently a marker is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational annotation.
    Info,
    /// Something is probably wrong.
    Warning,
    /// Something is definitely wrong.
    Error,
}

/// Every kind of marker the builder places.
///
/// The identifiers returned by [`MarkerKind::id`] are stable; clients use
/// them to filter diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    /// A glue file or step pattern failed to parse.
    StepdefSyntaxError,
    /// A feature file failed to parse.
    GherkinSyntaxError,
    /// A step is bound to exactly one definition.
    StepMatched,
    /// A step has no definition.
    UnmatchedStep,
    /// A step matches several definitions.
    MultipleStepDefinitions,
    /// A scenario outline example row expands to an unmatched step.
    ScenarioOutlineExampleUnmatch,
}

impl MarkerKind {
    /// All kinds, in a fixed order.
    pub const ALL: [Self; 6] = [
        Self::StepdefSyntaxError,
        Self::GherkinSyntaxError,
        Self::StepMatched,
        Self::UnmatchedStep,
        Self::MultipleStepDefinitions,
        Self::ScenarioOutlineExampleUnmatch,
    ];

    /// Stable identifier of the kind.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::StepdefSyntaxError => "stepdef-syntax-error",
            Self::GherkinSyntaxError => "gherkin-syntax-error",
            Self::StepMatched => "step-matched",
            Self::UnmatchedStep => "unmatched-step",
            Self::MultipleStepDefinitions => "multiple-step-definitions",
            Self::ScenarioOutlineExampleUnmatch => "scenario-outline-example-unmatch",
        }
    }

    /// Severity markers of this kind are created with.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::StepMatched => Severity::Info,
            Self::UnmatchedStep | Self::ScenarioOutlineExampleUnmatch => Severity::Warning,
            Self::StepdefSyntaxError
            | Self::GherkinSyntaxError
            | Self::MultipleStepDefinitions => Severity::Error,
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
