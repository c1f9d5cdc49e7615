//! `workspace/executeCommand` handling.
//!
//! One command is provided: recalculate the markers of a feature file. Its
//! single argument is the file URI. The response carries the build report,
//! or `null` when the file is not a feature file.

use std::path::PathBuf;

use async_lsp::ResponseError;
use lsp_types::{ExecuteCommandParams, Url};
use serde_json::Value;
use tracing::info;

use crate::build::recalculate;
use crate::error::ServerError;
use crate::identity::FileId;
use crate::server::ServerState;

use super::diagnostics::publish_changed_markers;
use super::lifecycle::url_to_path;
use super::response_error;

/// Identifier of the recalculate command.
pub const RECALCULATE_COMMAND: &str = "cuke-glue.recalculateSteps";

/// Handle the `workspace/executeCommand` request.
///
/// # Errors
///
/// Returns a `ResponseError` for unknown commands and for arguments that do
/// not name a local file.
pub fn handle_execute_command(
    state: &mut ServerState,
    params: ExecuteCommandParams,
) -> Result<Option<Value>, ResponseError> {
    if params.command != RECALCULATE_COMMAND {
        return Err(response_error(
            &ServerError::UnknownCommand(params.command),
            async_lsp::ErrorCode::INVALID_PARAMS,
        ));
    }
    let path = recalculate_target(&params.arguments)
        .map_err(|err| response_error(&err, async_lsp::ErrorCode::INVALID_PARAMS))?;

    let file = FileId::new(&path);
    info!(%file, "recalculate requested");
    let report = recalculate(state.workspace_for(&path), &file);
    publish_changed_markers(state);
    Ok(report.and_then(|report| serde_json::to_value(report).ok()))
}

fn recalculate_target(arguments: &[Value]) -> Result<PathBuf, ServerError> {
    let invalid = |message: &str| ServerError::InvalidCommandArguments {
        command: RECALCULATE_COMMAND.to_string(),
        message: message.to_string(),
    };
    let uri = arguments
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("expected a file URI string"))?;
    let url = Url::parse(uri).map_err(|err| invalid(&format!("invalid URI '{uri}': {err}")))?;
    url_to_path(&url).ok_or_else(|| invalid(&format!("'{uri}' is not a file URI")))
}
