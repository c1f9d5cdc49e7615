//! Indexing pipelines used by the builder.
//!
//! Two kinds of source are indexed:
//!
//! - Gherkin `.feature` files, parsed with the `gherkin` crate into the steps
//!   to match and the scenario outline example rows to expand.
//! - Glue files, handed to a [`StepDefinitionExtractor`] that returns the
//!   step patterns declared in them and the line of each declaration.
//!
//! Lines are 1-based throughout. `gherkin` reports byte spans, so lines are
//! derived by counting newlines before the span start.

use std::collections::BTreeMap;

use cuke_glue_patterns::StepKeyword;
use serde::{Deserialize, Serialize};

use crate::identity::FileId;

mod feature;
pub mod glue;

pub use feature::index_feature_source;
pub use glue::{
    ExtractedStep, GlueExtraction, GlueIndexError, JavaStepExtractor, RustStepExtractor, StepDefinitionExtractor,
    default_extractors,
};

/// A step occurrence in a feature file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GherkinStep {
    /// The keyword as written (`And`/`But` are kept).
    pub keyword: StepKeyword,
    /// The step text following the keyword.
    pub text: String,
    /// 1-based line of the step.
    pub line: usize,
}

/// Parsed index for a single `.feature` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFileIndex {
    /// The indexed file.
    pub file: FileId,
    /// Steps matched as written: backgrounds, scenarios, and outlines without
    /// example rows.
    pub steps: Vec<GherkinStep>,
    /// Scenario outlines with at least one example row.
    pub outlines: Vec<ScenarioOutline>,
}

/// A scenario outline together with the rows it is expanded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutline {
    /// Template steps, possibly containing `<column>` placeholders.
    pub steps: Vec<GherkinStep>,
    /// Data rows of every Examples table (header rows excluded).
    pub rows: Vec<ExampleRow>,
}

/// One data row of an Examples table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRow {
    /// 1-based line of the row.
    pub line: usize,
    /// Cell values keyed by header name.
    pub values: BTreeMap<String, String>,
}

impl ScenarioOutline {
    /// The outline's steps with `row` substituted into their placeholders.
    ///
    /// Placeholders naming a column the row lacks are left untouched.
    #[must_use]
    pub fn expand(&self, row: &ExampleRow) -> Vec<GherkinStep> {
        self.steps
            .iter()
            .map(|step| GherkinStep {
                text: feature::substitute_placeholders(&step.text, &row.values),
                ..step.clone()
            })
            .collect()
    }
}

/// Errors that can occur during `.feature` indexing.
#[derive(Debug, thiserror::Error)]
pub enum FeatureIndexError {
    /// The Gherkin parser rejected the file.
    #[error("{message}")]
    Parse {
        /// Parser message.
        message: String,
        /// 1-based line reported by the parser, or `0` when unknown.
        line: usize,
    },
}

impl FeatureIndexError {
    /// Line the error refers to, `0` when unknown.
    #[must_use]
    pub fn line(&self) -> usize {
        let Self::Parse { line, .. } = self;
        *line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_placeholders_from_row() {
        let outline = ScenarioOutline {
            steps: vec![GherkinStep {
                keyword: StepKeyword::Given,
                text: "I have <count> <fruit>".to_string(),
                line: 3,
            }],
            rows: Vec::new(),
        };
        let row = ExampleRow {
            line: 7,
            values: BTreeMap::from([
                ("count".to_string(), "5".to_string()),
                ("fruit".to_string(), "cukes".to_string()),
            ]),
        };
        let expanded = outline.expand(&row);
        assert_eq!(
            expanded.first().map(|s| s.text.as_str()),
            Some("I have 5 cukes")
        );
        assert_eq!(expanded.first().map(|s| s.line), Some(3));
    }

    #[test]
    fn gherkin_step_serialises_keyword_text_and_line() {
        let step = GherkinStep {
            keyword: StepKeyword::And,
            text: "more".to_string(),
            line: 4,
        };
        let json = serde_json::to_string(&step)
            .unwrap_or_else(|err| panic!("step should serialise: {err}"));
        assert_eq!(json, r#"{"keyword":"And","text":"more","line":4}"#);
    }
}
