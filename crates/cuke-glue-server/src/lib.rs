//! Static glue between Gherkin feature files and Cucumber step definitions.
//!
//! The crate indexes the step definitions declared in a project's glue code
//! (Rust `cucumber` attributes and Cucumber-JVM annotations), matches every
//! step of every `.feature` file against them, and records the outcome as
//! markers: unmatched steps, ambiguous steps, glued steps, scenario outline
//! rows with no compatible definition, and syntax errors on either side.
//! A language server binary, `cuke-glue-lsp`, publishes the markers as
//! diagnostics.
//!
//! # Overview
//!
//! - [`repository`] holds the definitions each glue file contributes.
//! - [`matcher`] classifies a step as unmatched, uniquely matched or
//!   ambiguous.
//! - [`markers`] places and clears markers through a batching store.
//! - [`build`] runs full and incremental builds and the recalculate
//!   trigger.
//! - [`server`] and [`handlers`] expose all of this over the LSP.
//!
//! # Configuration
//!
//! - `CUKE_GLUE_LSP_LOG_LEVEL`: log verbosity (trace, debug, info, warn,
//!   error)
//! - `CUKE_GLUE_LSP_REPORT_MATCHES`: mark glued steps with an informational
//!   marker
//! - `CUKE_GLUE_LSP_MAX_FILE_BYTES`: skip larger files during builds
//!
//! # Example
//!
//! ```no_run
//! use cuke_glue_server::build::{BuildKind, Workspace};
//! use cuke_glue_server::identity::FileId;
//! use cuke_glue_server::markers::InMemoryMarkerStore;
//!
//! let mut workspace = Workspace::new("/work/project", Box::new(InMemoryMarkerStore::new()));
//! workspace.build(BuildKind::Full);
//! let markers = workspace.markers(&FileId::new("/work/project/features/a.feature"));
//! ```

pub mod build;
pub mod config;
pub mod definition;
pub mod discovery;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod indexing;
pub mod logging;
pub mod markers;
pub mod matcher;
pub mod repository;
pub mod server;
pub mod util;

/// Test support utilities for unit and integration tests.
///
/// This module is hidden from documentation as it's intended for internal
/// test use only.
#[cfg(feature = "test-support")]
#[doc(hidden)]
pub mod test_support;
