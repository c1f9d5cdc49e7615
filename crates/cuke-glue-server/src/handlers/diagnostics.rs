//! Marker publishing via `textDocument/publishDiagnostics`.
//!
//! Markers are converted to LSP diagnostics on the way out: the marker kind
//! becomes the diagnostic code, its attributes travel in `data`, and byte
//! spans are converted to UTF-16 positions against the file text. A marker
//! without a span covers its whole line.

use async_lsp::lsp_types::notification;
use lsp_types::{
    Diagnostic, DiagnosticSeverity, NumberOrString, Position, PublishDiagnosticsParams, Range, Url,
};
use tracing::{debug, warn};

use crate::identity::FileId;
use crate::markers::{Marker, Severity};
use crate::server::ServerState;
use crate::util::{byte_range_to_lsp_range, line_length_utf16};

/// Diagnostic source identifier.
pub const DIAGNOSTIC_SOURCE: &str = "cuke-glue";

/// Convert a marker into an LSP diagnostic.
///
/// `source` is the text of the marked file, used to convert byte spans and
/// to size whole-line ranges. Without it, spans collapse to the line start.
#[must_use]
pub fn marker_to_diagnostic(source: Option<&str>, marker: &Marker) -> Diagnostic {
    let range = marker_range(source, marker);
    let data = if marker.attributes.is_empty() {
        None
    } else {
        serde_json::to_value(&marker.attributes).ok()
    };
    Diagnostic {
        range,
        severity: Some(severity(marker.severity)),
        code: Some(NumberOrString::String(marker.kind.id().to_string())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: marker.message.clone(),
        data,
        ..Diagnostic::default()
    }
}

fn marker_range(source: Option<&str>, marker: &Marker) -> Range {
    let line = u32::try_from(marker.line.saturating_sub(1)).unwrap_or(u32::MAX);
    match (source, marker.span.as_ref()) {
        (Some(text), Some(span)) => byte_range_to_lsp_range(text, span),
        (Some(text), None) if marker.line > 0 => Range::new(
            Position::new(line, 0),
            Position::new(line, line_length_utf16(text, marker.line - 1)),
        ),
        _ => Range::new(Position::new(line, 0), Position::new(line, 0)),
    }
}

fn severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Error => DiagnosticSeverity::ERROR,
    }
}

/// Diagnostics for every marker currently on `file`.
#[must_use]
pub fn diagnostics_for(state: &ServerState, file: &FileId) -> Vec<Diagnostic> {
    let Some(workspace) = state.workspace_containing(file) else {
        return Vec::new();
    };
    let source = workspace.source_text(file).ok();
    workspace
        .markers(file)
        .iter()
        .map(|marker| marker_to_diagnostic(source.as_deref(), marker))
        .collect()
}

/// Publish the current markers of `file`.
///
/// An empty array is published when the file has no markers, clearing
/// anything the client showed before.
pub fn publish_markers(state: &ServerState, file: &FileId) {
    let Some(client) = state.client() else {
        debug!("no client socket available for publishing diagnostics");
        return;
    };
    let Ok(uri) = Url::from_file_path(file.path()) else {
        warn!(%file, "cannot convert path to URI");
        return;
    };

    let params = PublishDiagnosticsParams::new(uri, diagnostics_for(state, file), None);
    if let Err(err) = client.notify::<notification::PublishDiagnostics>(params) {
        warn!(%file, error = %err, "failed to publish diagnostics");
    }
}

/// Publish every resource whose markers changed since the last publish.
pub fn publish_changed_markers(state: &ServerState) {
    let changed = state.take_changed_resources();
    debug!(resources = changed.len(), "publishing changed markers");
    for file in &changed {
        publish_markers(state, file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MarkerKind;

    const SOURCE: &str = "Feature: f\n  Scenario: s\n  Given foo bar\n";

    #[test]
    fn spans_convert_to_utf16_positions() {
        let marker = Marker::new(MarkerKind::UnmatchedStep, "unmatched", 3).with_span(Some(33..40));

        let diagnostic = marker_to_diagnostic(Some(SOURCE), &marker);

        assert_eq!(
            diagnostic.range,
            Range::new(Position::new(2, 8), Position::new(2, 15))
        );
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(
            diagnostic.code,
            Some(NumberOrString::String("unmatched-step".to_string()))
        );
        assert_eq!(diagnostic.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
    }

    #[test]
    fn markers_without_span_cover_their_line() {
        let marker = Marker::new(MarkerKind::GherkinSyntaxError, "bad", 2);

        let diagnostic = marker_to_diagnostic(Some(SOURCE), &marker);

        assert_eq!(
            diagnostic.range,
            Range::new(Position::new(1, 0), Position::new(1, 13))
        );
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
        assert!(diagnostic.data.is_none());
    }

    #[test]
    fn unknown_lines_point_at_file_start() {
        let marker = Marker::new(MarkerKind::StepdefSyntaxError, "bad", 0);

        let diagnostic = marker_to_diagnostic(None, &marker);

        assert_eq!(diagnostic.range, Range::default());
    }

    #[test]
    fn attributes_travel_as_data() {
        let marker = Marker::new(MarkerKind::MultipleStepDefinitions, "dup", 3)
            .with_attribute("duplicates", "/a.rs:1,/b.rs:2");

        let diagnostic = marker_to_diagnostic(Some(SOURCE), &marker);

        assert_eq!(
            diagnostic.data,
            Some(serde_json::json!({ "duplicates": "/a.rs:1,/b.rs:2" }))
        );
    }
}
