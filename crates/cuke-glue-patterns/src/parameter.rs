//! Built-in Cucumber parameter types and their regular-expression fragments.

/// Translate a Cucumber parameter type name into a regular-expression fragment.
///
/// Returns `None` for names that are not built-in parameter types. The
/// anonymous parameter `{}` is spelled as the empty string.
///
/// # Examples
/// ```
/// use cuke_glue_patterns::parameter_type_regex;
/// assert_eq!(parameter_type_regex("int"), Some(r"-?\d+"));
/// assert_eq!(parameter_type_regex(""), Some(".*"));
/// assert_eq!(parameter_type_regex("colour"), None);
/// ```
#[must_use]
pub fn parameter_type_regex(name: &str) -> Option<&'static str> {
    match name {
        "int" | "byte" | "short" | "long" | "biginteger" => Some(r"-?\d+"),
        "float" | "double" | "bigdecimal" => Some(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?"),
        "word" => Some(r"[^\s]+"),
        "string" => Some(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#),
        "" => Some(".*"),
        _ => None,
    }
}
