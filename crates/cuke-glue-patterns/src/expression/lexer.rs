//! Lexer converting Cucumber expressions into semantic tokens.

use crate::errors::{PatternError, expression_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Text(String),
    Whitespace(String),
    Optional { start: usize, text: String },
    Parameter { start: usize, name: String },
    Alternation { index: usize },
}

fn flush(buffer: &mut String, tokens: &mut Vec<Token>, whitespace: bool) {
    if buffer.is_empty() {
        return;
    }
    let text = std::mem::take(buffer);
    tokens.push(if whitespace {
        Token::Whitespace(text)
    } else {
        Token::Text(text)
    });
}

pub(crate) fn lex_expression(expression: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut space = String::new();
    let mut chars = expression.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch.is_whitespace() {
            flush(&mut text, &mut tokens, false);
            space.push(ch);
            continue;
        }
        flush(&mut space, &mut tokens, true);

        match ch {
            '\\' => match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => text.push('\\'),
            },
            '{' => {
                flush(&mut text, &mut tokens, false);
                let name = read_parameter(&mut chars, pos)?;
                tokens.push(Token::Parameter { start: pos, name });
            }
            '(' => {
                flush(&mut text, &mut tokens, false);
                let optional = read_optional(&mut chars, pos)?;
                tokens.push(Token::Optional {
                    start: pos,
                    text: optional,
                });
            }
            '/' => {
                flush(&mut text, &mut tokens, false);
                tokens.push(Token::Alternation { index: pos });
            }
            '}' => {
                return Err(expression_error(
                    "unmatched closing brace '}' in expression",
                    pos,
                    None,
                ));
            }
            ')' => {
                return Err(expression_error(
                    "unmatched closing parenthesis ')' in expression",
                    pos,
                    None,
                ));
            }
            other => text.push(other),
        }
    }

    flush(&mut text, &mut tokens, false);
    flush(&mut space, &mut tokens, true);
    Ok(tokens)
}

fn read_parameter(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
) -> Result<String, PatternError> {
    let mut name = String::new();
    for (_, ch) in chars.by_ref() {
        match ch {
            '}' => return Ok(name),
            '{' | '(' | ')' | '\\' | '/' => {
                return Err(expression_error(
                    "invalid character in parameter type name",
                    start,
                    Some(name),
                ));
            }
            c if c.is_whitespace() => {
                return Err(expression_error(
                    "parameter type names must not contain whitespace",
                    start,
                    Some(name),
                ));
            }
            c => name.push(c),
        }
    }
    Err(expression_error(
        "missing closing '}' for parameter type",
        start,
        Some(name),
    ))
}

fn read_optional(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
) -> Result<String, PatternError> {
    let mut text = String::new();
    while let Some((_, ch)) = chars.next() {
        match ch {
            ')' => {
                if text.is_empty() {
                    return Err(expression_error("optional text must not be empty", start, None));
                }
                return Ok(text);
            }
            '\\' => match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => text.push('\\'),
            },
            '(' | '{' => {
                return Err(expression_error(
                    "parameters and nested optionals are not allowed inside an optional",
                    start,
                    None,
                ));
            }
            c => text.push(c),
        }
    }
    Err(expression_error(
        "missing closing ')' for optional text",
        start,
        None,
    ))
}
