//! Semantic error types for the language server.
//!
//! Errors raised while configuring the server or discovering projects are
//! collected here. Indexing and marker errors live beside the code that
//! raises them.

use thiserror::Error;

/// Errors that can occur during language server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to discover a project root from the given path.
    #[error("project discovery failed: {0}")]
    ProjectDiscovery(String),

    /// Server received a duplicate initialisation request.
    #[error("server already initialised")]
    AlreadyInitialised,

    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A command was invoked with arguments it cannot interpret.
    #[error("invalid arguments for command '{command}': {message}")]
    InvalidCommandArguments {
        /// The command identifier.
        command: String,
        /// Human-readable description of the problem.
        message: String,
    },

    /// The client asked for a command the server does not provide.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_discovery_error_displays_message() {
        let error = ServerError::ProjectDiscovery("no project marker found".to_string());
        assert_eq!(
            error.to_string(),
            "project discovery failed: no project marker found"
        );
    }

    #[test]
    fn already_initialised_error_displays_message() {
        assert_eq!(
            ServerError::AlreadyInitialised.to_string(),
            "server already initialised"
        );
    }

    #[test]
    fn invalid_config_error_displays_message() {
        let error = ServerError::InvalidConfig("unknown log level".to_string());
        assert_eq!(
            error.to_string(),
            "invalid configuration: unknown log level"
        );
    }

    #[test]
    fn command_errors_name_the_command() {
        let error = ServerError::InvalidCommandArguments {
            command: "cuke-glue.recalculateSteps".to_string(),
            message: "expected a document URI".to_string(),
        };
        assert!(error.to_string().contains("cuke-glue.recalculateSteps"));
        assert_eq!(
            ServerError::UnknownCommand("x".to_string()).to_string(),
            "unknown command 'x'"
        );
    }

    #[test]
    fn io_error_converts_from_std_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ServerError = io_err.into();
        assert!(error.to_string().contains("file not found"));
    }
}
