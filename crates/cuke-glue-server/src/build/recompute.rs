//! Per-file work done by a build: glue extraction and feature marking.

use tracing::{debug, warn};

use super::Workspace;
use crate::definition::StepDefinition;
use crate::identity::FileId;
use crate::indexing::index_feature_source;
use crate::markers::{Batch, Document};
use crate::matcher::{MatchOutcome, match_step};

impl Workspace {
    /// Re-extract the definitions of one glue file into the repository.
    ///
    /// A glue file that fails to parse keeps its previous definitions and is
    /// marked with a step-definition syntax error. A single declaration that
    /// is malformed, or whose pattern fails to compile, is marked on its
    /// declaring line and left out.
    pub(super) fn index_glue_file(&self, file: &FileId, extractor: usize) {
        let Some(extractor) = self.extractors.get(extractor) else {
            return;
        };
        let source = match self.source_text(file) {
            Ok(source) => source,
            Err(err) => {
                warn!(%file, error = %err, "failed to read glue file");
                return;
            }
        };

        let factory = self.factory();
        let _batch = Batch::open(self.markers.as_ref());
        factory.clean_markers(file);

        let found = match extractor.extract(&source) {
            Ok(found) => found,
            Err(err) => {
                warn!(%file, extractor = extractor.name(), error = %err, "failed to extract step definitions");
                factory.stepdef_syntax_error(file, &err.to_string(), err.line());
                return;
            }
        };

        for err in &found.rejected {
            warn!(%file, line = err.line(), error = %err, "malformed step declaration");
            factory.stepdef_syntax_error(file, &err.to_string(), err.line());
        }
        let mut definitions = Vec::with_capacity(found.steps.len());
        for step in found.steps {
            match StepDefinition::new(&step.pattern, file.clone(), step.line, step.keyword) {
                Ok(definition) => definitions.push(definition),
                Err(err) => {
                    warn!(%file, line = step.line, pattern = %step.pattern, error = %err, "invalid step pattern");
                    factory.stepdef_syntax_error(
                        file,
                        &format!("Invalid step pattern '{}': {err}", step.pattern),
                        step.line,
                    );
                }
            }
        }
        debug!(%file, extractor = extractor.name(), definitions = definitions.len(), "indexed glue file");
        self.repository.put(file.clone(), definitions);
    }

    /// Clean and recompute every marker of one feature file.
    ///
    /// All markers are placed inside one batch so the file changes once.
    /// Outline steps are checked through their example rows: a row that
    /// leaves a step unmatched is marked on the row, and a template step
    /// that some row expands into an ambiguous step is marked on the
    /// template line.
    pub fn recompute_feature(&self, file: &FileId) {
        let factory = self.factory();
        let _batch = Batch::open(self.markers.as_ref());
        factory.clean_markers(file);

        let source = match self.source_text(file) {
            Ok(source) => source,
            Err(err) => {
                warn!(%file, error = %err, "failed to read feature file");
                return;
            }
        };
        let index = match index_feature_source(file.clone(), &source) {
            Ok(index) => index,
            Err(err) => {
                debug!(%file, error = %err, "feature file does not parse");
                factory.gherkin_syntax_error(file, &err.to_string(), err.line());
                return;
            }
        };

        let definitions = self.repository.all_definitions();
        let document = Document::new(&source);
        for step in &index.steps {
            let outcome = match_step(&step.text, &definitions);
            factory.step_outcome(file, &document, step, &outcome);
        }
        for outline in &index.outlines {
            // Per template step, the definitions of the first ambiguous row.
            let mut ambiguous: Vec<Option<Vec<StepDefinition>>> =
                vec![None; outline.steps.len()];
            for row in &outline.rows {
                let mut unmatched = false;
                for (slot, step) in ambiguous.iter_mut().zip(outline.expand(row)) {
                    match match_step(&step.text, &definitions) {
                        MatchOutcome::NoMatch => unmatched = true,
                        MatchOutcome::MultipleMatch(found) if slot.is_none() => {
                            *slot = Some(found);
                        }
                        MatchOutcome::SingleMatch(_) | MatchOutcome::MultipleMatch(_) => {}
                    }
                }
                if unmatched {
                    factory.example_unmatch(file, &document, row.line);
                }
            }
            for (step, found) in outline.steps.iter().zip(&ambiguous) {
                if let Some(found) = found {
                    factory.multiple_step_definitions(file, &document, step, found);
                }
            }
        }
        debug!(
            %file,
            steps = index.steps.len(),
            outlines = index.outlines.len(),
            "recomputed feature markers"
        );
    }
}
