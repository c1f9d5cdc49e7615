//! End-to-end smoke tests for the `cuke-glue-lsp` binary.
//!
//! Each test starts the server over a temporary project, talks JSON-RPC to
//! it on stdin/stdout, and checks what the builds publish.

mod wire;

use std::fs;

use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;
use wire::Session;

const FEATURE: &str = concat!(
    "Feature: smoke\n",
    "  Scenario: basic\n",
    "    Given a user exists\n",
);

const GLUE: &str = concat!(
    "use cucumber::given;\n",
    "\n",
    "#[given(\"a user exists\")]\n",
    "fn a_user_exists() {}\n",
);

/// A project holding only `smoke.feature`.
#[fixture]
fn project() -> TempDir {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("temp dir: {err}"));
    fs::write(dir.path().join("smoke.feature"), FEATURE)
        .unwrap_or_else(|err| panic!("write feature: {err}"));
    dir
}

fn field<'a>(value: &'a Value, pointer: &str) -> &'a Value {
    value
        .pointer(pointer)
        .unwrap_or_else(|| panic!("missing {pointer} in {value}"))
}

#[rstest]
fn advertises_save_text_and_server_name(project: TempDir) {
    let (session, result) = Session::start(project.path());

    assert_eq!(
        field(&result, "/capabilities/textDocumentSync/save/includeText"),
        &json!(true)
    );
    assert_eq!(field(&result, "/serverInfo/name"), &json!("cuke-glue-lsp"));

    session.shutdown();
}

#[rstest]
fn initial_build_publishes_unmatched_steps(project: TempDir) {
    let (mut session, _) = Session::start(project.path());

    let diagnostic = session.diagnostic_with_code("smoke.feature", "unmatched-step");

    assert_eq!(field(&diagnostic, "/source"), &json!("cuke-glue"));
    assert_eq!(
        field(&diagnostic, "/range"),
        &json!({
            "start": { "line": 2, "character": 10 },
            "end": { "line": 2, "character": 23 },
        })
    );
    session.shutdown();
}

#[rstest]
fn saving_glue_rebinds_feature_steps(project: TempDir) {
    let (mut session, _) = Session::start(project.path());
    session.diagnostic_with_code("smoke.feature", "unmatched-step");

    let glue = project.path().join("steps.rs");
    fs::write(&glue, GLUE).unwrap_or_else(|err| panic!("write glue: {err}"));
    session.save(&glue, Some(GLUE));

    let diagnostic = session.diagnostic_with_code("smoke.feature", "step-matched");
    assert_eq!(
        field(&diagnostic, "/message"),
        &json!("Glued with steps.rs:3")
    );
    session.shutdown();
}

#[rstest]
fn recalculate_command_reports_the_build(project: TempDir) {
    let (mut session, _) = Session::start(project.path());

    let report = session.recalculate(&project.path().join("smoke.feature"));

    assert_eq!(
        report,
        json!({ "glueFiles": 0, "featureFiles": 1, "removedFiles": 0 })
    );
    session.shutdown();
}
