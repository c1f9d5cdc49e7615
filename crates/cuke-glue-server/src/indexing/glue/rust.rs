//! Rust glue extraction.
//!
//! Parses Rust source with `syn` and collects functions annotated with the
//! `cucumber` step attributes:
//!
//! - `#[given("literal text")]` matches the text exactly.
//! - `#[when(expr = "I eat {int} cukes")]` registers a Cucumber expression.
//! - `#[then(regex = r"^I have (\d+) cukes$")]` registers a regular
//!   expression.
//! - A bare `#[given]` infers an expression from the function name by
//!   replacing underscores with spaces.
//!
//! Functions are found at any module depth, including inline `mod` blocks and
//! `impl` blocks.

use std::path::Path;

use cuke_glue_patterns::{StepKeyword, StepPattern};
use syn::parse::ParseStream;
use syn::spanned::Spanned;

use super::{ExtractedStep, GlueExtraction, GlueIndexError, StepDefinitionExtractor, has_extension};

/// Extracts step definitions from `.rs` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustStepExtractor;

impl StepDefinitionExtractor for RustStepExtractor {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn handles(&self, path: &Path) -> bool {
        has_extension(path, "rs")
    }

    fn extract(&self, source: &str) -> Result<GlueExtraction, GlueIndexError> {
        let file = syn::parse_file(source).map_err(|err| syntax_error(&err))?;
        let mut found = GlueExtraction::default();
        collect_items(&file.items, &mut found);
        Ok(found)
    }
}

fn collect_items(items: &[syn::Item], found: &mut GlueExtraction) {
    for item in items {
        match item {
            syn::Item::Fn(item_fn) => {
                collect_function(&item_fn.attrs, &item_fn.sig.ident, found);
            }
            syn::Item::Impl(item_impl) => {
                for impl_item in &item_impl.items {
                    if let syn::ImplItem::Fn(method) = impl_item {
                        collect_function(&method.attrs, &method.sig.ident, found);
                    }
                }
            }
            syn::Item::Mod(item_mod) => {
                if let Some((_, items)) = item_mod.content.as_ref() {
                    collect_items(items, found);
                }
            }
            _ => {}
        }
    }
}

fn collect_function(attrs: &[syn::Attribute], ident: &syn::Ident, found: &mut GlueExtraction) {
    for attr in attrs {
        let Some(keyword) = step_attribute_keyword(attr) else {
            continue;
        };
        match parse_step_pattern(attr, ident) {
            Ok(pattern) => found.steps.push(ExtractedStep {
                pattern,
                line: attr.span().start().line,
                keyword: Some(keyword),
            }),
            Err(err) => found.rejected.push(err),
        }
    }
}

fn step_attribute_keyword(attr: &syn::Attribute) -> Option<StepKeyword> {
    let ident = attr.path().segments.last()?.ident.to_string();
    match ident.as_str() {
        "given" => Some(StepKeyword::Given),
        "when" => Some(StepKeyword::When),
        "then" => Some(StepKeyword::Then),
        _ => None,
    }
}

fn parse_step_pattern(
    attr: &syn::Attribute,
    function: &syn::Ident,
) -> Result<StepPattern, GlueIndexError> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok(infer_pattern(function)),
        syn::Meta::List(list) if list.tokens.is_empty() => Ok(infer_pattern(function)),
        syn::Meta::List(_) => attr
            .parse_args_with(parse_pattern_arguments)
            .map_err(|err| syntax_error(&err)),
        syn::Meta::NameValue(name_value) => Err(GlueIndexError::Syntax {
            message: format!(
                "step attribute on '{function}' must use parentheses, as in #[given(\"...\")]"
            ),
            line: name_value.span().start().line,
        }),
    }
}

fn parse_pattern_arguments(input: ParseStream<'_>) -> syn::Result<StepPattern> {
    if input.peek(syn::LitStr) {
        let literal: syn::LitStr = input.parse()?;
        skip_remaining(input)?;
        return Ok(StepPattern::Regex(regex::escape(&literal.value())));
    }

    let name: syn::Ident = input.parse()?;
    input.parse::<syn::Token![=]>()?;
    let literal: syn::LitStr = input.parse()?;
    skip_remaining(input)?;
    match name.to_string().as_str() {
        "expr" => Ok(StepPattern::Expression(literal.value())),
        "regex" => Ok(StepPattern::Regex(literal.value())),
        other => Err(syn::Error::new(
            name.span(),
            format!("unknown step attribute argument `{other}`, expected `expr` or `regex`"),
        )),
    }
}

// Trailing options such as `, timeout = ..` do not affect the pattern.
fn skip_remaining(input: ParseStream<'_>) -> syn::Result<()> {
    let _rest: proc_macro2::TokenStream = input.parse()?;
    Ok(())
}

fn infer_pattern(function: &syn::Ident) -> StepPattern {
    StepPattern::Expression(function.to_string().replace('_', " "))
}

fn syntax_error(err: &syn::Error) -> GlueIndexError {
    GlueIndexError::Syntax {
        message: err.to_string(),
        line: err.span().start().line,
    }
}
