//! Example rows of scenario outlines are checked against the glue.

mod support;

use cuke_glue_server::markers::{MarkerKind, Severity};
use support::{WorkspaceBuilder, single_marker};

const OUTLINE: &str = concat!(
    "Feature: cukes\n",
    "  Scenario Outline: eating\n",
    "    Given I have <count> cukes\n",
    "    When I eat <eaten>\n",
    "\n",
    "    Examples:\n",
    "      | count | eaten |\n",
    "      | 5     | 2     |\n",
    "      | many  | 2     |\n",
);

const GLUE: &str = concat!(
    "#[given(regex = r\"^I have (\\d+) cukes$\")]\n",
    "fn have(n: u32) {}\n",
    "\n",
    "#[when(expr = \"I eat {int}\")]\n",
    "fn eat(n: u32) {}\n",
);

#[test]
fn rows_leaving_a_step_unmatched_are_marked() {
    let project = WorkspaceBuilder::new()
        .with_feature("cukes.feature", OUTLINE)
        .with_rust_steps("steps.rs", GLUE)
        .build();

    let marker = single_marker(
        &project,
        "cukes.feature",
        MarkerKind::ScenarioOutlineExampleUnmatch,
    );

    assert_eq!(project.markers("cukes.feature").len(), 1);
    assert_eq!(marker.line, 9);
    assert_eq!(marker.severity, Severity::Warning);
    assert_eq!(
        marker.message,
        "No compatible step definition with | many  | 2     |"
    );
    let start = OUTLINE
        .find("| many")
        .unwrap_or_else(|| panic!("row present"));
    let row = "| many  | 2     |";
    assert_eq!(marker.span, Some(start..start + row.len()));
}

#[test]
fn every_row_is_marked_without_glue() {
    let project = WorkspaceBuilder::new()
        .with_feature("cukes.feature", OUTLINE)
        .build();

    let lines: Vec<_> = project
        .markers("cukes.feature")
        .iter()
        .map(|marker| (marker.kind, marker.line))
        .collect();
    assert_eq!(
        lines,
        vec![
            (MarkerKind::ScenarioOutlineExampleUnmatch, 8),
            (MarkerKind::ScenarioOutlineExampleUnmatch, 9),
        ]
    );
}

#[test]
fn rows_of_every_examples_table_are_checked() {
    let feature = concat!(
        "Feature: cukes\n",
        "  Scenario Outline: eating\n",
        "    Given I have <count> cukes\n",
        "\n",
        "    Examples: small\n",
        "      | count |\n",
        "      | 1     |\n",
        "\n",
        "    Examples: silly\n",
        "      | count |\n",
        "      | lots  |\n",
    );
    let project = WorkspaceBuilder::new()
        .with_feature("cukes.feature", feature)
        .with_rust_steps("steps.rs", GLUE)
        .build();

    let marker = single_marker(
        &project,
        "cukes.feature",
        MarkerKind::ScenarioOutlineExampleUnmatch,
    );
    assert_eq!(marker.line, 11);
}

#[test]
fn outline_without_rows_is_matched_as_written() {
    let feature = concat!(
        "Feature: cukes\n",
        "  Scenario Outline: eating\n",
        "    Given I have <count> cukes\n",
        "\n",
        "    Examples:\n",
        "      | count |\n",
    );
    let project = WorkspaceBuilder::new()
        .with_feature("cukes.feature", feature)
        .with_rust_steps("steps.rs", GLUE)
        .build();

    assert_eq!(
        project.kinds("cukes.feature"),
        vec![MarkerKind::UnmatchedStep]
    );
}

#[test]
fn ambiguous_expansion_is_marked_on_the_template_step() {
    let feature = concat!(
        "Feature: cukes\n",
        "  Scenario Outline: eating\n",
        "    Given I have <n> cukes\n",
        "\n",
        "    Examples:\n",
        "      | n |\n",
        "      | 5 |\n",
        "      | 6 |\n",
    );
    let glue = concat!(
        "#[given(\"I have 5 cukes\")]\n",
        "fn five() {}\n",
        "\n",
        "#[given(expr = \"I have {int} cukes\")]\n",
        "fn any(n: u32) {}\n",
    );
    let project = WorkspaceBuilder::new()
        .with_feature("cukes.feature", feature)
        .with_rust_steps("a.rs", glue)
        .build();

    let marker = single_marker(
        &project,
        "cukes.feature",
        MarkerKind::MultipleStepDefinitions,
    );

    assert_eq!(project.markers("cukes.feature").len(), 1);
    assert_eq!(marker.line, 3);
    assert_eq!(marker.severity, Severity::Error);
    assert_eq!(
        marker.message,
        "Step 'I have <n> cukes' have more than one glue code: a.rs:1,a.rs:4"
    );
    let start = feature
        .find("I have <n>")
        .unwrap_or_else(|| panic!("step present"));
    assert_eq!(marker.span, Some(start..start + "I have <n> cukes".len()));
}

#[test]
fn duplicate_glue_across_files_is_reported_inside_outlines() {
    let feature = concat!(
        "Feature: cukes\n",
        "  Scenario Outline: eating\n",
        "    Given I have <n> cukes\n",
        "\n",
        "    Examples:\n",
        "      | n |\n",
        "      | 5 |\n",
    );
    let glue = "#[given(\"I have 5 cukes\")]\nfn five() {}\n";
    let project = WorkspaceBuilder::new()
        .with_feature("cukes.feature", feature)
        .with_rust_steps("a.rs", glue)
        .with_rust_steps("b.rs", glue)
        .build();

    assert_eq!(
        project.kinds("cukes.feature"),
        vec![MarkerKind::MultipleStepDefinitions]
    );
}
