//! Error types shared by the pattern compilation modules.

use std::fmt;
use thiserror::Error;

/// Additional context for Cucumber expression syntax errors.
///
/// # Examples
/// ```
/// use cuke_glue_patterns::ExpressionErrorInfo;
/// let info = ExpressionErrorInfo::new("unknown parameter type", 3, Some("colour".into()));
/// assert_eq!(info.parameter.as_deref(), Some("colour"));
/// assert_eq!(info.position, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionErrorInfo {
    /// Static description of the failure.
    pub message: &'static str,
    /// Zero-based byte offset into the expression where the failure starts.
    pub position: usize,
    /// Parameter type name involved in the failure, if any.
    pub parameter: Option<String>,
}

impl ExpressionErrorInfo {
    /// Create a new error description for an expression failure.
    #[must_use]
    pub fn new(message: &'static str, position: usize, parameter: Option<String>) -> Self {
        Self {
            message,
            position,
            parameter,
        }
    }
}

impl fmt::Display for ExpressionErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameter {
            Some(name) => write!(
                f,
                "{} for parameter type `{{{}}}` at byte {} (zero-based)",
                self.message, name, self.position
            ),
            None => write!(f, "{} at byte {} (zero-based)", self.message, self.position),
        }
    }
}

/// Errors surfaced while converting step patterns into regular expressions.
///
/// # Examples
/// ```
/// use cuke_glue_patterns::{ExpressionErrorInfo, PatternError};
/// let info = ExpressionErrorInfo::new("empty optional", 2, None);
/// let err = PatternError::Expression(info.clone());
/// assert_eq!(err.to_string(), info.to_string());
/// ```
#[derive(Debug, Error)]
pub enum PatternError {
    /// The Cucumber expression is syntactically invalid.
    #[error("{0}")]
    Expression(ExpressionErrorInfo),
    /// The generated or user-supplied regular expression failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub(crate) fn expression_error(
    message: &'static str,
    position: usize,
    parameter: Option<String>,
) -> PatternError {
    PatternError::Expression(ExpressionErrorInfo::new(message, position, parameter))
}
