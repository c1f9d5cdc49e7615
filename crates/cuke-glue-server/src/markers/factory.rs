//! Builds markers for build results and writes them to a store.

use tracing::{debug, warn};

use super::{
    Batch, DUPLICATES_ATTRIBUTE, Document, Marker, MarkerError, MarkerKind, MarkerStore,
    Placement, TextLocation, UNMATCHED_PATH_ATTRIBUTE, UNMATCHED_STEP_ATTRIBUTE,
};
use crate::definition::StepDefinition;
use crate::identity::FileId;
use crate::indexing::GherkinStep;
use crate::matcher::MatchOutcome;

/// Places markers on resources through a [`MarkerStore`].
///
/// Every placement runs inside its own batch, so a caller that opens an
/// outer batch around a whole file gets a single change notification.
#[derive(Clone, Copy)]
pub struct MarkerFactory<'a> {
    store: &'a dyn MarkerStore,
    report_matches: bool,
}

impl<'a> MarkerFactory<'a> {
    /// Create a factory writing to `store`.
    #[must_use]
    pub fn new(store: &'a dyn MarkerStore) -> Self {
        Self {
            store,
            report_matches: true,
        }
    }

    /// Choose whether glued steps get an informational marker.
    #[must_use]
    pub fn with_report_matches(mut self, report_matches: bool) -> Self {
        self.report_matches = report_matches;
        self
    }

    /// Remove every marker kind the builder owns from `resource`.
    pub fn clean_markers(&self, resource: &FileId) {
        match self.store.delete(resource, &MarkerKind::ALL) {
            Ok(removed) => debug!(%resource, removed, "cleaned markers"),
            Err(err) => warn!(%resource, error = %err, "failed to clean markers"),
        }
    }

    /// Report a feature file that failed to parse.
    pub fn gherkin_syntax_error(&self, resource: &FileId, message: &str, line: usize) {
        self.mark(resource, || {
            Ok(Placement::Place(Marker::new(
                MarkerKind::GherkinSyntaxError,
                message,
                line,
            )))
        });
    }

    /// Report a glue file or step pattern that failed to parse.
    pub fn stepdef_syntax_error(&self, resource: &FileId, message: &str, line: usize) {
        self.mark(resource, || {
            Ok(Placement::Place(Marker::new(
                MarkerKind::StepdefSyntaxError,
                message,
                line,
            )))
        });
    }

    /// Place the marker matching `outcome` for `step`.
    pub fn step_outcome(
        &self,
        resource: &FileId,
        document: &Document<'_>,
        step: &GherkinStep,
        outcome: &MatchOutcome,
    ) {
        match outcome {
            MatchOutcome::NoMatch => self.unmatched_step(resource, document, step),
            MatchOutcome::SingleMatch(definition) => {
                if self.report_matches {
                    self.step_matched(resource, document, step, definition);
                }
            }
            MatchOutcome::MultipleMatch(definitions) => {
                self.multiple_step_definitions(resource, document, step, definitions);
            }
        }
    }

    /// Report a step with no glue.
    pub fn unmatched_step(&self, resource: &FileId, document: &Document<'_>, step: &GherkinStep) {
        self.mark(resource, || {
            let Some(span) = step_span(document, step) else {
                return Ok(Placement::Skip);
            };
            let payload =
                serde_json::to_string(step).map_err(|source| MarkerError::Attribute {
                    attribute: UNMATCHED_STEP_ATTRIBUTE,
                    source,
                })?;
            Ok(Placement::Place(
                Marker::new(
                    MarkerKind::UnmatchedStep,
                    format!("Step '{}' does not have a matching glue code", step.text),
                    step.line,
                )
                .with_span(span)
                .with_attribute(UNMATCHED_STEP_ATTRIBUTE, payload)
                .with_attribute(UNMATCHED_PATH_ATTRIBUTE, resource.full_path()),
            ))
        });
    }

    /// Report a step matched by several definitions.
    ///
    /// The message lists `name:line` for each definition; the
    /// [`DUPLICATES_ATTRIBUTE`] lists `full/path:line`. Both are joined
    /// with `,`.
    pub fn multiple_step_definitions(
        &self,
        resource: &FileId,
        document: &Document<'_>,
        step: &GherkinStep,
        definitions: &[StepDefinition],
    ) {
        self.mark(resource, || {
            let Some(span) = step_span(document, step) else {
                return Ok(Placement::Skip);
            };
            let names = join(definitions.iter().map(StepDefinition::short_location));
            let paths = join(definitions.iter().map(StepDefinition::full_location));
            Ok(Placement::Place(
                Marker::new(
                    MarkerKind::MultipleStepDefinitions,
                    format!("Step '{}' have more than one glue code: {names}", step.text),
                    step.line,
                )
                .with_span(span)
                .with_attribute(DUPLICATES_ATTRIBUTE, paths),
            ))
        });
    }

    /// Record which definition a step is glued to.
    pub fn step_matched(
        &self,
        resource: &FileId,
        document: &Document<'_>,
        step: &GherkinStep,
        definition: &StepDefinition,
    ) {
        self.mark(resource, || {
            let Some(span) = step_span(document, step) else {
                return Ok(Placement::Skip);
            };
            Ok(Placement::Place(
                Marker::new(
                    MarkerKind::StepMatched,
                    format!("Glued with {}", definition.short_location()),
                    step.line,
                )
                .with_span(span),
            ))
        });
    }

    /// Report an example row whose expansion leaves a step unmatched.
    pub fn example_unmatch(&self, resource: &FileId, document: &Document<'_>, line: usize) {
        self.mark(resource, || {
            let Some(raw) = document.line_text(line) else {
                return Ok(Placement::Skip);
            };
            let row = raw.trim();
            let span = match document.locate(line, row) {
                TextLocation::Span(span) => Some(span),
                TextLocation::LineOnly => None,
                TextLocation::OutOfRange => return Ok(Placement::Skip),
            };
            Ok(Placement::Place(
                Marker::new(
                    MarkerKind::ScenarioOutlineExampleUnmatch,
                    format!("No compatible step definition with {row}"),
                    line,
                )
                .with_span(span),
            ))
        });
    }

    fn mark(&self, resource: &FileId, build: impl FnOnce() -> Result<Placement, MarkerError>) {
        let _batch = Batch::open(self.store);
        match build() {
            Ok(Placement::Place(marker)) => {
                let kind = marker.kind;
                if let Err(err) = self.store.add(resource, marker) {
                    warn!(%resource, %kind, error = %err, "failed to place marker");
                }
            }
            Ok(Placement::Skip) => debug!(%resource, "marker skipped"),
            Err(err) => warn!(%resource, error = %err, "failed to place marker"),
        }
    }
}

/// `None` when the step's line is gone; `Some(None)` for a line-only marker.
fn step_span(
    document: &Document<'_>,
    step: &GherkinStep,
) -> Option<Option<std::ops::Range<usize>>> {
    match document.locate(step.line, &step.text) {
        TextLocation::Span(span) => Some(Some(span)),
        TextLocation::LineOnly => Some(None),
        TextLocation::OutOfRange => None,
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(",")
}
