//! Gherkin `.feature` file indexing support.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use cuke_glue_patterns::StepKeyword;
use gherkin::{GherkinEnv, Span};
use regex::Regex;

use super::{ExampleRow, FeatureFileIndex, FeatureIndexError, GherkinStep, ScenarioOutline};
use crate::identity::FileId;

/// `<column>` placeholders in outline steps.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>\s]+)>").unwrap_or_else(|_| unreachable!()));

/// `line:column` positions embedded in parser messages.
static POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+):(\d+)\b").unwrap_or_else(|_| unreachable!()));

/// Parse and index feature text, typically the text a client just saved.
///
/// # Errors
///
/// Returns [`FeatureIndexError::Parse`] when the text is not valid Gherkin.
///
/// # Examples
///
/// ```
/// use cuke_glue_server::identity::FileId;
/// use cuke_glue_server::indexing::index_feature_source;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = "Feature: f\n  Scenario: s\n    Given a step\n    And another";
/// let index = index_feature_source(FileId::new("/p/f.feature"), source)?;
/// let lines: Vec<_> = index.steps.iter().map(|s| s.line).collect();
/// assert_eq!(lines, vec![3, 4]);
/// # Ok(())
/// # }
/// ```
pub fn index_feature_source(
    file: FileId,
    source: &str,
) -> Result<FeatureFileIndex, FeatureIndexError> {
    // The parser requires a terminating newline.
    let mut text = source.to_owned();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    let feature =
        gherkin::Feature::parse(text.as_str(), GherkinEnv::default()).map_err(|err| {
            let message = err.to_string();
            FeatureIndexError::Parse {
                line: line_from_message(&message),
                message,
            }
        })?;

    let lines = LineMap::new(&text);
    let mut index = FeatureFileIndex {
        file,
        steps: Vec::new(),
        outlines: Vec::new(),
    };

    if let Some(background) = feature.background.as_ref() {
        index.steps.extend(index_steps(&lines, &background.steps));
    }
    for scenario in &feature.scenarios {
        index_scenario(&lines, &text, scenario, &mut index);
    }
    for rule in &feature.rules {
        if let Some(background) = rule.background.as_ref() {
            index.steps.extend(index_steps(&lines, &background.steps));
        }
        for scenario in &rule.scenarios {
            index_scenario(&lines, &text, scenario, &mut index);
        }
    }

    Ok(index)
}

fn index_scenario(
    lines: &LineMap,
    text: &str,
    scenario: &gherkin::Scenario,
    index: &mut FeatureFileIndex,
) {
    let steps = index_steps(lines, &scenario.steps);
    let rows: Vec<ExampleRow> = scenario
        .examples
        .iter()
        .filter_map(|examples| examples.table.as_ref())
        .flat_map(|table| example_rows(lines, text, table))
        .collect();

    if rows.is_empty() {
        index.steps.extend(steps);
    } else {
        index.outlines.push(ScenarioOutline { steps, rows });
    }
}

fn index_steps(lines: &LineMap, steps: &[gherkin::Step]) -> Vec<GherkinStep> {
    steps
        .iter()
        .map(|step| GherkinStep {
            keyword: step
                .keyword
                .trim()
                .parse()
                .unwrap_or_else(|_| StepKeyword::from(step.ty)),
            text: step.value.clone(),
            line: lines.line_of(step.span.start),
        })
        .collect()
}

fn example_rows(lines: &LineMap, text: &str, table: &gherkin::Table) -> Vec<ExampleRow> {
    let Some((header, data)) = table.rows.split_first() else {
        return Vec::new();
    };
    let mut row_lines = table_row_lines(lines, text, table.span).into_iter().skip(1);
    let mut last_line = lines.line_of(table.span.start);

    data.iter()
        .map(|cells| {
            let line = row_lines.next().unwrap_or(last_line + 1);
            last_line = line;
            ExampleRow {
                line,
                values: header.iter().cloned().zip(cells.iter().cloned()).collect(),
            }
        })
        .collect()
}

/// Lines within `span` that hold table rows, in order.
fn table_row_lines(lines: &LineMap, text: &str, span: Span) -> Vec<usize> {
    let Some(table_text) = text.get(span.start..span.end) else {
        return Vec::new();
    };
    let mut offset = span.start;
    let mut found = Vec::new();
    for line in table_text.split_inclusive('\n') {
        if line.trim_start().starts_with('|') {
            found.push(lines.line_of(offset));
        }
        offset += line.len();
    }
    found
}

pub(super) fn substitute_placeholders(text: &str, values: &BTreeMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|name| values.get(name.as_str()))
                .map_or_else(|| whole.to_owned(), Clone::clone)
        })
        .into_owned()
}

fn line_from_message(message: &str) -> usize {
    POSITION_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|line| line.as_str().parse().ok())
        .unwrap_or(0)
}

/// Maps byte offsets to 1-based line numbers.
struct LineMap {
    newlines: Vec<usize>,
}

impl LineMap {
    fn new(text: &str) -> Self {
        Self {
            newlines: text.match_indices('\n').map(|(idx, _)| idx).collect(),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}
