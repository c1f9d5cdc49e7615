//! Cucumber-JVM glue extraction.
//!
//! Java sources are scanned rather than parsed: annotations such as
//! `@Given("^I have (\\d+) cukes$")` or `@When(value = "I eat {int} cukes")`
//! are found with a regular expression and their string literal is
//! unescaped. Patterns anchored with `^` or `$` are regular expressions,
//! anything else a Cucumber expression, as Cucumber-JVM decides.

use std::path::Path;
use std::sync::LazyLock;

use cuke_glue_patterns::StepPattern;
use regex::Regex;

use super::{ExtractedStep, GlueExtraction, GlueIndexError, StepDefinitionExtractor, has_extension};

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"@(?:[\w.]+\.)?(Given|When|Then|And|But)\s*\(\s*(?:value\s*=\s*)?"((?:[^"\\\n]|\\.)*)""#,
    )
    .unwrap_or_else(|_| unreachable!())
});

/// Extracts step definitions from `.java` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaStepExtractor;

impl StepDefinitionExtractor for JavaStepExtractor {
    fn name(&self) -> &'static str {
        "java"
    }

    fn handles(&self, path: &Path) -> bool {
        has_extension(path, "java")
    }

    fn extract(&self, source: &str) -> Result<GlueExtraction, GlueIndexError> {
        let mut steps = Vec::new();
        for caps in ANNOTATION_RE.captures_iter(source) {
            let (Some(whole), Some(keyword), Some(literal)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if is_commented_out(source, whole.start()) {
                continue;
            }
            let line = source
                .get(..whole.start())
                .map_or(1, |before| before.matches('\n').count() + 1);
            steps.push(ExtractedStep {
                pattern: StepPattern::infer(unescape_java(literal.as_str())),
                line,
                keyword: keyword.as_str().parse().ok(),
            });
        }
        Ok(GlueExtraction {
            steps,
            rejected: Vec::new(),
        })
    }
}

fn is_commented_out(source: &str, offset: usize) -> bool {
    let Some(before) = source.get(..offset) else {
        return false;
    };
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let prefix = before.get(line_start..).unwrap_or_default().trim_start();
    prefix.starts_with("//") || prefix.starts_with('*') || prefix.starts_with("/*")
}

fn unescape_java(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(escaped @ ('\\' | '"' | '\'')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
