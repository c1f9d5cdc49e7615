//! Step-pattern compilation shared by the cuke-glue language server.
//!
//! Cucumber glue code registers each step either as a Cucumber expression
//! (`I have {int} cucumber(s)`) or as a raw regular expression
//! (`^I have (\d+) cucumbers?$`). This crate turns both forms into anchored
//! [`regex::Regex`] matchers so callers can test Gherkin step text without
//! caring which dialect the glue author used.

mod errors;
mod expression;
mod keyword;
mod parameter;
mod step_pattern;

pub use errors::{ExpressionErrorInfo, PatternError};
pub use expression::{build_regex_from_expression, compile_expression};
pub use keyword::{StepKeyword, StepKeywordParseError};
pub use parameter::parameter_type_regex;
pub use step_pattern::{CompiledPattern, StepPattern};
