//! Positioned diagnostic records attached to feature and glue files.
//!
//! Markers are what the build produces: one per matched, unmatched or
//! ambiguous step, per failing example row, and per syntax error. They are
//! kept in a [`MarkerStore`] and later rendered as LSP diagnostics.
//!
//! Placing a marker goes through [`MarkerFactory`], which first computes the
//! marker (possibly deciding to skip it) and then writes it inside a store
//! batch. Failures are logged and never abort the surrounding build.

use std::collections::BTreeMap;
use std::ops::Range;

mod document;
mod factory;
mod kind;
mod store;

pub use document::{Document, TextLocation};
pub use factory::MarkerFactory;
pub use kind::{MarkerKind, Severity};
pub use store::{Batch, ChangeListener, InMemoryMarkerStore, MarkerStore};

/// Attribute holding the JSON form of an unmatched step.
pub const UNMATCHED_STEP_ATTRIBUTE: &str = "unmatched_step.step";
/// Attribute holding the full path of the file with the unmatched step.
pub const UNMATCHED_PATH_ATTRIBUTE: &str = "unmatched_step.path";
/// Attribute listing the `full/path:line` of every competing definition.
pub const DUPLICATES_ATTRIBUTE: &str = "duplicates";

/// A diagnostic attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// What the marker reports.
    pub kind: MarkerKind,
    /// How prominently it is shown.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// 1-based line; `0` when the location is unknown.
    pub line: usize,
    /// Byte range within the resource text, when known.
    pub span: Option<Range<usize>>,
    /// Free-form string attributes for tools acting on the marker.
    pub attributes: BTreeMap<String, String>,
}

impl Marker {
    /// Create a marker with the kind's default severity.
    #[must_use]
    pub fn new(kind: MarkerKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            line,
            span: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a byte range.
    #[must_use]
    pub fn with_span(mut self, span: Option<Range<usize>>) -> Self {
        self.span = span;
        self
    }

    /// Attach a string attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Outcome of computing a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Write this marker.
    Place(Marker),
    /// Nothing to place, for example because the line no longer exists.
    Skip,
}

/// Errors raised while computing or storing a marker.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    /// An attribute value could not be serialised.
    #[error("failed to serialise marker attribute '{attribute}': {source}")]
    Attribute {
        /// Attribute key.
        attribute: &'static str,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The store refused the operation.
    #[error("marker store failed to {operation} on {resource}: {message}")]
    Store {
        /// Resource the operation targeted.
        resource: String,
        /// Operation name.
        operation: &'static str,
        /// Description of the failure.
        message: String,
    },
}
