//! Cucumber expression lexing and compilation helpers.

mod compiler;
mod lexer;

use crate::errors::PatternError;
use regex::Regex;

pub use compiler::build_regex_from_expression;

/// Build and compile a regular expression from a Cucumber expression.
///
/// # Errors
/// Returns [`PatternError`] when the expression is malformed or the generated
/// regex source cannot be compiled.
pub fn compile_expression(expression: &str) -> Result<Regex, PatternError> {
    let source = build_regex_from_expression(expression)?;
    Regex::new(&source).map_err(PatternError::from)
}
