//! Convert lexed expression tokens into anchored regular-expression sources.

use crate::errors::{PatternError, expression_error};
use crate::parameter::parameter_type_regex;

use super::lexer::{Token, lex_expression};

/// Build an anchored regular expression from a Cucumber expression.
///
/// # Errors
/// Returns [`PatternError`] when the expression is malformed or references an
/// undefined parameter type.
///
/// # Examples
/// ```
/// # use cuke_glue_patterns::build_regex_from_expression;
/// let regex = build_regex_from_expression("I have {int} cucumber(s)")
///     .unwrap_or_default();
/// assert_eq!(regex, r"^I have (-?\d+) cucumber(?:s)?$");
/// ```
pub fn build_regex_from_expression(expression: &str) -> Result<String, PatternError> {
    let tokens = lex_expression(expression)?;
    let mut regex = String::with_capacity(expression.len().saturating_mul(2) + 2);
    regex.push('^');

    let mut word: Vec<Token> = Vec::new();
    for token in tokens {
        if let Token::Whitespace(space) = token {
            render_word(std::mem::take(&mut word), &mut regex)?;
            regex.push_str(&regex::escape(&space));
        } else {
            word.push(token);
        }
    }
    render_word(word, &mut regex)?;

    regex.push('$');
    Ok(regex)
}

/// Render a whitespace-delimited run of tokens.
///
/// A run containing `/` is an alternation: each alternative is rendered
/// separately and joined into a non-capturing group.
fn render_word(word: Vec<Token>, out: &mut String) -> Result<(), PatternError> {
    let Some(first_split) = word.iter().find_map(|token| match token {
        Token::Alternation { index } => Some(*index),
        _ => None,
    }) else {
        for token in word {
            render_token(token, out)?;
        }
        return Ok(());
    };

    let mut alternatives: Vec<Vec<Token>> = vec![Vec::new()];
    for token in word {
        match token {
            Token::Alternation { .. } => alternatives.push(Vec::new()),
            Token::Parameter { start, name } => {
                return Err(expression_error(
                    "parameter types are not allowed in an alternation",
                    start,
                    Some(name),
                ));
            }
            other => {
                if let Some(current) = alternatives.last_mut() {
                    current.push(other);
                }
            }
        }
    }

    if alternatives.iter().any(Vec::is_empty) {
        return Err(expression_error(
            "alternative text must not be empty",
            first_split,
            None,
        ));
    }

    out.push_str("(?:");
    for (position, alternative) in alternatives.into_iter().enumerate() {
        if position > 0 {
            out.push('|');
        }
        for token in alternative {
            render_token(token, out)?;
        }
    }
    out.push(')');
    Ok(())
}

fn render_token(token: Token, out: &mut String) -> Result<(), PatternError> {
    match token {
        Token::Text(text) | Token::Whitespace(text) => out.push_str(&regex::escape(&text)),
        Token::Optional { text, .. } => {
            out.push_str("(?:");
            out.push_str(&regex::escape(&text));
            out.push_str(")?");
        }
        Token::Parameter { start, name } => {
            let Some(fragment) = parameter_type_regex(&name) else {
                return Err(expression_error("undefined parameter type", start, Some(name)));
            };
            out.push('(');
            out.push_str(fragment);
            out.push(')');
        }
        Token::Alternation { index } => {
            return Err(expression_error("unexpected alternation", index, None));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_regex_for_parameter_expressions() {
        let regex = build_regex_from_expression("I have {int} cukes")
            .unwrap_or_else(|err| panic!("expression should compile: {err}"));
        assert_eq!(regex, r"^I have (-?\d+) cukes$");
    }

    #[test]
    fn builds_alternation_groups() {
        let regex = build_regex_from_expression("I eat a cucumber/gherkin(s)")
            .unwrap_or_else(|err| panic!("expression should compile: {err}"));
        assert_eq!(regex, r"^I eat a (?:cucumber|gherkin(?:s)?)$");
    }

    #[test]
    fn escapes_regex_metacharacters_in_text() {
        let regex = build_regex_from_expression("price is $5.00?")
            .unwrap_or_else(|err| panic!("expression should compile: {err}"));
        assert_eq!(regex, r"^price is \$5\.00\?$");
    }

    #[test]
    fn errors_on_undefined_parameter_type() {
        let Err(err) = build_regex_from_expression("a {colour} ball") else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("undefined parameter type"));
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn errors_on_empty_alternative() {
        let Err(err) = build_regex_from_expression("a /b") else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("alternative text must not be empty"));
    }

    #[test]
    fn errors_on_parameter_inside_alternation() {
        let Err(err) = build_regex_from_expression("a/{int}") else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("not allowed in an alternation"));
    }
}
