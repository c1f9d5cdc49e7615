//! Core language server state and service construction.
//!
//! The state owns one [`Workspace`] per project root. Every workspace's
//! marker store reports changed resources into a shared set, which the
//! handlers drain after a build to publish diagnostics for exactly the files
//! whose markers moved.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_lsp::ClientSocket;
use lsp_types::{
    ClientCapabilities, ExecuteCommandOptions, SaveOptions, ServerCapabilities,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions, WorkspaceFolder,
};
use tracing::{debug, info};

use crate::build::{BuildSettings, Workspace};
use crate::config::ServerConfig;
use crate::discovery::find_project_root;
use crate::handlers::RECALCULATE_COMMAND;
use crate::identity::FileId;
use crate::markers::InMemoryMarkerStore;

type ChangedResources = Arc<Mutex<BTreeSet<FileId>>>;

/// Central state shared across all LSP handlers.
pub struct ServerState {
    /// Client capabilities received during initialisation.
    pub(crate) client_capabilities: Option<ClientCapabilities>,
    /// Workspace folders from the client.
    pub(crate) workspace_folders: Vec<WorkspaceFolder>,
    initialised: bool,
    config: ServerConfig,
    client: Option<ClientSocket>,
    workspaces: BTreeMap<PathBuf, Workspace>,
    changed: ChangedResources,
}

impl ServerState {
    /// Create a new server state with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use cuke_glue_server::config::ServerConfig;
    /// use cuke_glue_server::server::ServerState;
    ///
    /// let state = ServerState::new(ServerConfig::default());
    /// assert!(!state.is_initialised());
    /// ```
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            client_capabilities: None,
            workspace_folders: Vec::new(),
            initialised: false,
            config,
            client: None,
            workspaces: BTreeMap::new(),
            changed: Arc::default(),
        }
    }

    /// Attach the socket used to send notifications to the client.
    #[must_use]
    pub fn with_client(mut self, client: ClientSocket) -> Self {
        self.client = Some(client);
        self
    }

    /// The client socket, when attached.
    #[must_use]
    pub fn client(&self) -> Option<&ClientSocket> {
        self.client.as_ref()
    }

    /// Access the stored client capabilities, if any.
    #[must_use]
    pub fn client_capabilities(&self) -> Option<&ClientCapabilities> {
        self.client_capabilities.as_ref()
    }

    /// Access the workspace folders provided by the client.
    #[must_use]
    pub fn workspace_folders(&self) -> &[WorkspaceFolder] {
        &self.workspace_folders
    }

    /// Access the current server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Mark the server as initialised.
    pub fn mark_initialised(&mut self) {
        self.initialised = true;
    }

    /// Check if the server is initialised.
    #[must_use]
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Every open workspace, ordered by root.
    pub fn workspaces(&self) -> impl Iterator<Item = &Workspace> {
        self.workspaces.values()
    }

    /// Mutable access to every open workspace.
    pub fn workspaces_mut(&mut self) -> impl Iterator<Item = &mut Workspace> {
        self.workspaces.values_mut()
    }

    /// Open a workspace rooted at `root`, reusing an existing one.
    pub fn open_workspace(&mut self, root: &Path) -> &mut Workspace {
        let root = FileId::new(root).path().to_path_buf();
        let changed = &self.changed;
        let settings = BuildSettings::from(&self.config);
        self.workspaces
            .entry(root)
            .or_insert_with_key(|root| {
                info!(root = %root.display(), "opening workspace");
                create_workspace(root, changed, settings)
            })
    }

    /// The workspace owning `path`, opening one at its project root when no
    /// open workspace contains it.
    pub fn workspace_for(&mut self, path: &Path) -> &mut Workspace {
        let root = self.owning_root(path).unwrap_or_else(|| {
            find_project_root(path).unwrap_or_else(|err| {
                debug!(path = %path.display(), error = %err, "falling back to parent directory");
                path.parent().unwrap_or(path).to_path_buf()
            })
        });
        self.open_workspace(&root)
    }

    /// The open workspace owning `file`, if any.
    #[must_use]
    pub fn workspace_containing(&self, file: &FileId) -> Option<&Workspace> {
        self.owning_root(file.path())
            .and_then(|root| self.workspaces.get(&root))
    }

    /// Take the resources whose markers changed since the last call.
    pub fn take_changed_resources(&self) -> Vec<FileId> {
        let mut changed = self.changed.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *changed).into_iter().collect()
    }

    /// Root of the open workspace with the deepest root containing `path`.
    fn owning_root(&self, path: &Path) -> Option<PathBuf> {
        self.workspaces
            .values()
            .filter(|workspace| workspace.contains(path))
            .max_by_key(|workspace| workspace.root().components().count())
            .map(|workspace| workspace.root().to_path_buf())
    }
}

fn create_workspace(root: &Path, changed: &ChangedResources, settings: BuildSettings) -> Workspace {
    let sink = Arc::clone(changed);
    let store = InMemoryMarkerStore::with_listener(Box::new(move |files| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(files.iter().cloned());
    }));
    Workspace::new(root, Box::new(store)).with_settings(settings)
}

impl fmt::Debug for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerState")
            .field("initialised", &self.initialised)
            .field("config", &self.config)
            .field("workspace_folders", &self.workspace_folders)
            .field("workspaces", &self.workspaces.values().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Build the server capabilities to advertise to the client.
///
/// Builds run on save, so the server asks for the saved text and otherwise
/// ignores edits. The recalculate command is exposed for explicit rebuilds.
#[must_use]
pub fn build_server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::NONE),
                save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                    include_text: Some(true),
                })),
                ..TextDocumentSyncOptions::default()
            },
        )),
        execute_command_provider: Some(ExecuteCommandOptions {
            commands: vec![RECALCULATE_COMMAND.to_string()],
            ..ExecuteCommandOptions::default()
        }),
        ..ServerCapabilities::default()
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn new_state_is_not_initialised() {
        let state = ServerState::new(ServerConfig::default());
        assert!(!state.is_initialised());
        assert!(state.client_capabilities().is_none());
        assert!(state.workspace_folders().is_empty());
        assert_eq!(state.workspaces().count(), 0);
    }

    #[test]
    fn mark_initialised_sets_flag() {
        let mut state = ServerState::new(ServerConfig::default());
        state.mark_initialised();
        assert!(state.is_initialised());
    }

    #[test]
    fn capabilities_request_saved_text_and_expose_recalculate() {
        let capabilities = build_server_capabilities();
        let Some(TextDocumentSyncCapability::Options(sync)) = capabilities.text_document_sync
        else {
            panic!("expected text document sync options");
        };
        assert_eq!(
            sync.save,
            Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                include_text: Some(true)
            }))
        );
        let commands = capabilities
            .execute_command_provider
            .expect("execute command provider")
            .commands;
        assert_eq!(commands, vec![RECALCULATE_COMMAND.to_string()]);
    }

    #[test]
    fn workspace_for_prefers_the_deepest_root() {
        let dir = TempDir::new().expect("temp dir");
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).expect("create nested");
        let mut state = ServerState::new(ServerConfig::default());
        state.open_workspace(dir.path());
        state.open_workspace(&nested);
        state.open_workspace(dir.path());
        assert_eq!(state.workspaces().count(), 2);

        let root = state.workspace_for(&nested.join("a.feature")).root().to_path_buf();
        assert_eq!(root, FileId::new(&nested).path());
    }

    #[test]
    fn workspace_for_opens_at_project_root() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("pom.xml"), "<project/>").expect("write pom");
        let features = dir.path().join("src/test/resources");
        std::fs::create_dir_all(&features).expect("create features dir");

        let mut state = ServerState::new(ServerConfig::default());
        let root = state
            .workspace_for(&features.join("a.feature"))
            .root()
            .to_path_buf();
        assert_eq!(root, FileId::new(dir.path()).path());
    }
}
