//! Shared helpers for cuke-glue-server integration tests.
//!
//! Re-exports the crate's test support so every test binary builds projects
//! the same way.

#![allow(
    unused_imports,
    dead_code,
    reason = "each test binary uses a different subset of helpers"
)]

pub use cuke_glue_server::test_support::{TestWorkspace, WorkspaceBuilder};

use cuke_glue_server::markers::{Marker, MarkerKind};

/// Rust glue declaring a step for each literal, one function per line pair.
pub fn rust_steps(literals: &[&str]) -> String {
    let mut source = String::from("use cucumber::{given, then, when};\n");
    for (index, literal) in literals.iter().enumerate() {
        source.push_str(&format!("\n#[given(\"{literal}\")]\nfn step_{index}() {{}}\n"));
    }
    source
}

/// The single marker of `kind` on `name`.
///
/// # Panics
///
/// Panics unless exactly one marker of that kind is present.
pub fn single_marker(project: &TestWorkspace, name: &str, kind: MarkerKind) -> Marker {
    let mut matching: Vec<Marker> = project
        .markers(name)
        .into_iter()
        .filter(|marker| marker.kind == kind)
        .collect();
    assert_eq!(
        matching.len(),
        1,
        "expected one {kind} marker on {name}, got {matching:?}"
    );
    matching
        .pop()
        .unwrap_or_else(|| panic!("marker vanished"))
}
