//! LSP request and notification handlers.
//!
//! Lifecycle handlers open workspaces and run the initial full build, the
//! save handler runs incremental builds, and the recalculate command forces
//! one feature to be rebuilt. Every path ends by publishing the markers that
//! changed.

use async_lsp::ResponseError;

use crate::error::ServerError;

mod commands;
pub mod diagnostics;
mod lifecycle;
mod text_document;

pub use commands::{RECALCULATE_COMMAND, handle_execute_command};
pub use lifecycle::{SERVER_NAME, handle_initialise, handle_initialised, handle_shutdown};
pub use text_document::handle_did_save_text_document;

/// Convert a server error to an LSP response error.
fn response_error(err: &ServerError, code: async_lsp::ErrorCode) -> ResponseError {
    ResponseError::new(code, err.to_string())
}
