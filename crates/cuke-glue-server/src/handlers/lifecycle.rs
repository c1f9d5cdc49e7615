//! LSP lifecycle handlers for initialisation and shutdown.
//!
//! `initialize` opens one workspace per client folder. The full build runs
//! on `initialized`, once the client is ready to receive diagnostics.

use std::path::PathBuf;

use async_lsp::ResponseError;
use lsp_types::{InitializeParams, InitializeResult, InitializedParams, ServerInfo, Url};
use tracing::info;

use crate::build::BuildKind;
use crate::error::ServerError;
use crate::server::{ServerState, build_server_capabilities};

use super::diagnostics::publish_changed_markers;
use super::response_error;

/// Name reported to the client in `serverInfo`.
pub const SERVER_NAME: &str = "cuke-glue-lsp";

/// Handle the `initialize` request from the client.
///
/// Stores the client capabilities and opens a workspace for every folder
/// the client announces, falling back to the root URI for single-root
/// clients.
///
/// # Errors
///
/// Returns a `ResponseError` when the server is already initialised.
pub fn handle_initialise(
    state: &mut ServerState,
    params: InitializeParams,
) -> Result<InitializeResult, ResponseError> {
    if state.is_initialised() {
        return Err(response_error(
            &ServerError::AlreadyInitialised,
            async_lsp::ErrorCode::INVALID_REQUEST,
        ));
    }

    #[expect(
        deprecated,
        reason = "Some clients still populate root_uri instead of workspace_folders."
    )]
    let InitializeParams {
        capabilities,
        workspace_folders,
        root_uri,
        ..
    } = params;
    state.client_capabilities = Some(capabilities);
    if let Some(folders) = workspace_folders {
        state.workspace_folders = folders;
    }

    for path in extract_workspace_paths(&state.workspace_folders, root_uri.as_ref()) {
        state.open_workspace(&path);
    }
    info!(workspaces = state.workspaces().count(), "initialise request handled");

    Ok(InitializeResult {
        capabilities: build_server_capabilities(),
        server_info: Some(ServerInfo {
            name: SERVER_NAME.to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    })
}

/// Handle the `initialized` notification from the client.
///
/// Marks the server initialised, runs a full build of every workspace and
/// publishes the resulting diagnostics.
pub fn handle_initialised(state: &mut ServerState, _params: InitializedParams) {
    state.mark_initialised();
    for workspace in state.workspaces_mut() {
        workspace.build(BuildKind::Full);
    }
    publish_changed_markers(state);
    info!("server initialised");
}

/// Handle the `shutdown` request from the client.
///
/// # Errors
///
/// Currently always returns `Ok(())`.
pub fn handle_shutdown(_state: &mut ServerState) -> Result<(), ResponseError> {
    info!("shutdown request received");
    Ok(())
}

/// Paths of every `file://` workspace folder, or of the root URI when no
/// folders are given.
fn extract_workspace_paths(
    workspace_folders: &[lsp_types::WorkspaceFolder],
    root_uri: Option<&Url>,
) -> Vec<PathBuf> {
    let folders: Vec<PathBuf> = workspace_folders
        .iter()
        .filter_map(|folder| url_to_path(&folder.uri))
        .collect();
    if folders.is_empty() {
        root_uri.and_then(url_to_path).into_iter().collect()
    } else {
        folders
    }
}

/// Convert a URL to a file system path.
///
/// Only handles `file://` URLs; returns `None` for other schemes.
pub(crate) fn url_to_path(url: &Url) -> Option<PathBuf> {
    url.to_file_path().ok()
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use lsp_types::{ClientCapabilities, WorkspaceFolder};
    use rstest::{fixture, rstest};
    use std::str::FromStr;

    #[fixture]
    fn state() -> ServerState {
        ServerState::new(ServerConfig::default())
    }

    #[fixture]
    fn init_params() -> InitializeParams {
        InitializeParams {
            capabilities: ClientCapabilities::default(),
            workspace_folders: None,
            ..Default::default()
        }
    }

    fn folder(path: &str) -> WorkspaceFolder {
        WorkspaceFolder {
            uri: Url::from_file_path(PathBuf::from(path)).expect("valid path"),
            name: "folder".to_string(),
        }
    }

    #[rstest]
    fn stores_client_capabilities(mut state: ServerState, init_params: InitializeParams) {
        let result = handle_initialise(&mut state, init_params);

        assert!(result.is_ok());
        assert!(state.client_capabilities().is_some());
    }

    #[rstest]
    fn returns_server_info(mut state: ServerState, init_params: InitializeParams) {
        let init_result =
            handle_initialise(&mut state, init_params).expect("initialisation should succeed");

        let info = init_result.server_info.expect("should have server info");
        assert_eq!(info.name, SERVER_NAME);
        assert!(info.version.is_some());
    }

    #[rstest]
    fn fails_when_already_initialised(mut state: ServerState, init_params: InitializeParams) {
        state.mark_initialised();

        assert!(handle_initialise(&mut state, init_params).is_err());
    }

    #[cfg(not(windows))]
    #[rstest]
    fn opens_a_workspace_per_folder(mut state: ServerState) {
        let params = InitializeParams {
            workspace_folders: Some(vec![folder("/folder/one"), folder("/folder/two")]),
            ..Default::default()
        };

        handle_initialise(&mut state, params).expect("initialisation should succeed");

        let roots: Vec<_> = state.workspaces().map(|w| w.root().to_path_buf()).collect();
        assert_eq!(
            roots,
            vec![PathBuf::from("/folder/one"), PathBuf::from("/folder/two")]
        );
    }

    #[rstest]
    fn shutdown_returns_ok(mut state: ServerState) {
        assert!(handle_shutdown(&mut state).is_ok());
    }

    #[test]
    fn url_to_path_returns_none_for_non_file_url() {
        let url = Url::from_str("https://example.com/path").expect("valid URL");
        assert!(url_to_path(&url).is_none());
    }

    #[cfg(not(windows))]
    #[test]
    fn root_uri_is_used_when_no_folders() {
        let root_uri = Url::from_file_path("/folder/path").expect("valid path");
        let paths = extract_workspace_paths(&[], Some(&root_uri));
        assert_eq!(paths, vec![PathBuf::from("/folder/path")]);
    }

    #[test]
    fn no_folders_and_no_root_yield_nothing() {
        assert!(extract_workspace_paths(&[], None).is_empty());
    }
}
