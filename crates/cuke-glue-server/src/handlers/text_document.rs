//! Text document notification handlers.
//!
//! Saving a feature or glue file runs an incremental build of the owning
//! workspace, using the saved text when the client sends it, and publishes
//! the markers that changed.

use lsp_types::DidSaveTextDocumentParams;
use tracing::debug;

use crate::build::BuildKind;
use crate::identity::FileId;
use crate::server::ServerState;

use super::diagnostics::publish_changed_markers;

/// Handle `textDocument/didSave` notifications.
pub fn handle_did_save_text_document(state: &mut ServerState, params: DidSaveTextDocumentParams) {
    let uri = params.text_document.uri;
    let Ok(path) = uri.to_file_path() else {
        debug!(%uri, "ignoring didSave for non-file URI");
        return;
    };

    let file = FileId::new(&path);
    let workspace = state.workspace_for(&path);
    if !file.is_feature() && !workspace.is_glue_file(&path) {
        debug!(%file, "ignoring didSave for unrelated file");
        return;
    }
    if let Some(text) = params.text {
        workspace.set_overlay(file, text);
    }
    workspace.build(BuildKind::Incremental);
    publish_changed_markers(state);
}
