// Copyright (c) The casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic tests for the test case catalog.

use casebook::{
    catalog::{Annotation, TestCaseCatalog},
    errors::RunError,
    output::OutputFormat,
    reporter::{CatalogEvent, CatalogReporter, ReporterOpts},
    runner::{CaseStatus, CatalogRunner, RunStats},
};
use indoc::indoc;
use pretty_assertions::assert_eq;
use termcolor::NoColor;

static DOCSTRING: &str = "This is a test docstring. It should say what's being tested.";

static MULTI_LINE_DOCSTRING: &str = indoc! {"
    This is a test docstring. It should say what's being tested.

    Multi-line is omitted from the test output.
"};

/// Builds the canonical fixture: every combination of {annotation present,
/// absent} x {pass, fail}, plus a catalog-level annotation.
fn fixture_catalog() -> TestCaseCatalog {
    let mut catalog = TestCaseCatalog::with_annotation(
        Annotation::new("TestCase docstring").expect("non-empty annotation"),
    );
    catalog
        .register("test_docstring", Annotation::new(DOCSTRING), || Ok(()))
        .expect("registration succeeds");
    catalog
        .register("test_no_docstring", None, || Ok(()))
        .expect("registration succeeds");
    catalog
        .register(
            "test_docstring_fail",
            Annotation::new(MULTI_LINE_DOCSTRING),
            || {
                assert_eq!(2 + 2, 5, "deliberate failure");
                Ok(())
            },
        )
        .expect("registration succeeds");
    catalog
        .register("test_no_docstring_fail", None, || {
            assert_eq!(2 + 2, 5, "deliberate failure");
            Ok(())
        })
        .expect("registration succeeds");
    catalog
}

#[test]
fn run_all_yields_outcomes_in_declaration_order() {
    let catalog = fixture_catalog();

    let outcomes: Vec<_> = catalog
        .run_all()
        .map(|run| {
            let run = run.expect("no execution errors in the fixture");
            (run.name, run.run_status.status)
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("test_docstring", CaseStatus::Pass),
            ("test_no_docstring", CaseStatus::Pass),
            ("test_docstring_fail", CaseStatus::Fail),
            ("test_no_docstring_fail", CaseStatus::Fail),
        ]
    );

    // run_all is restartable: a second pass re-executes every case and
    // yields the same outcomes.
    let second: Vec<_> = catalog
        .run_all()
        .map(|run| {
            let run = run.expect("no execution errors in the fixture");
            (run.name, run.run_status.status)
        })
        .collect();
    assert_eq!(second, outcomes);
}

#[test]
fn annotations_are_absent_or_non_empty() {
    let catalog = fixture_catalog();

    let annotation = catalog
        .annotation_of("test_docstring")
        .expect("case exists")
        .expect("annotation present");
    assert_eq!(annotation.first_line(), DOCSTRING);
    assert!(!annotation.is_multi_line());

    assert_eq!(
        catalog.annotation_of("test_no_docstring").expect("case exists"),
        None,
        "absent annotation is an explicit None, not an empty string"
    );

    let multi = catalog
        .annotation_of("test_docstring_fail")
        .expect("case exists")
        .expect("annotation present");
    assert!(multi.is_multi_line());
    assert_eq!(multi.first_line(), DOCSTRING);
    // First-line extraction is idempotent.
    assert_eq!(multi.first_line(), DOCSTRING);
    // The full text is preserved verbatim for round-tripping.
    assert_eq!(multi.full_text(), MULTI_LINE_DOCSTRING);
}

#[test]
fn failed_assertions_carry_their_message() {
    let catalog = fixture_catalog();

    let run_status = catalog.run("test_docstring_fail").expect("case runs");
    assert_eq!(run_status.status, CaseStatus::Fail);
    let message = run_status.failure_message.expect("assert carries a message");
    assert!(
        message.contains("deliberate failure"),
        "message contains the assert text: {message}"
    );
}

#[test]
fn broken_case_surfaces_as_execution_error() {
    let mut catalog = fixture_catalog();
    catalog
        .register("test_broken", None, || Err("fixture file missing".into()))
        .expect("registration succeeds");

    // The broken case errors; the cases before it still yield outcomes.
    let results: Vec<_> = catalog.run_all().collect();
    assert_eq!(results.len(), 5);
    for run in &results[..4] {
        run.as_ref().expect("fixture cases yield outcomes");
    }
    let error = results
        .into_iter()
        .nth(4)
        .expect("five results")
        .expect_err("broken case errors");
    assert_eq!(error.name(), "test_broken");

    // Through run(), the same case is an error, not a FAIL outcome.
    match catalog.run("test_broken") {
        Err(RunError::Execution(error)) => assert_eq!(error.name(), "test_broken"),
        other => panic!("expected an execution error, got {other:?}"),
    }
}

#[test]
fn execute_reports_the_whole_run() {
    let catalog = fixture_catalog();
    let runner = CatalogRunner::new(&catalog);
    let reporter = CatalogReporter::new(&catalog, ReporterOpts::default());

    let mut buf = NoColor::new(vec![]);
    let mut statuses = Vec::new();
    let run_stats = runner.execute(|event| {
        if let CatalogEvent::CaseFinished { run_status, .. } = &event {
            statuses.push(run_status.status);
        }
        reporter
            .report_event(event, &mut buf)
            .expect("write succeeded");
    });

    assert_eq!(
        run_stats,
        RunStats {
            initial_run_count: 4,
            final_run_count: 4,
            passed: 2,
            failed: 2,
            exec_failed: 0,
        }
    );
    assert!(!run_stats.is_success());
    assert_eq!(
        statuses,
        vec![
            CaseStatus::Pass,
            CaseStatus::Pass,
            CaseStatus::Fail,
            CaseStatus::Fail,
        ]
    );

    let output = String::from_utf8(buf.into_inner()).expect("buffer is valid UTF-8");
    let mut lines = output.lines();
    assert_eq!(
        lines.next(),
        Some("    Starting 4 test cases: TestCase docstring")
    );
    // Case lines carry timings, so only check their shape: status, name, and
    // the first line of the annotation where one is present.
    let expected_case_lines = [
        ("        PASS [", "test_docstring          ", Some(DOCSTRING)),
        ("        PASS [", "test_no_docstring", None),
        ("        FAIL [", "test_docstring_fail     ", Some(DOCSTRING)),
        ("        FAIL [", "test_no_docstring_fail", None),
    ];
    for (prefix, name, annotation) in expected_case_lines {
        let line = loop {
            let line = lines.next().expect("case line present");
            // Skip failure-message detail lines between case lines.
            if line.starts_with("        PASS [")
                || line.starts_with("        FAIL [")
                || line.starts_with("     Summary ")
            {
                break line;
            }
        };
        assert!(line.starts_with(prefix), "line {line:?} starts with {prefix:?}");
        assert!(line.contains(name), "line {line:?} contains name {name:?}");
        match annotation {
            Some(annotation) => assert!(
                line.ends_with(annotation),
                "line {line:?} ends with the first line of the annotation"
            ),
            None => assert!(
                line.ends_with(name.trim_end()),
                "line {line:?} ends with the bare name"
            ),
        }
    }
    let summary = lines
        .find(|line| line.starts_with("     Summary "))
        .expect("summary line present");
    assert!(
        summary.ends_with("4 test cases run: 2 passed, 2 failed"),
        "summary {summary:?} counts outcomes"
    );
}

#[test]
fn listing_shows_first_lines_only() {
    let catalog = fixture_catalog();

    static EXPECTED_PLAIN: &str = indoc! {"
        TestCase docstring:
            test_docstring: This is a test docstring. It should say what's being tested.
            test_no_docstring
            test_docstring_fail: This is a test docstring. It should say what's being tested.
            test_no_docstring_fail
    "};
    assert_eq!(
        catalog
            .to_string(OutputFormat::Plain)
            .expect("plain succeeded"),
        EXPECTED_PLAIN
    );
}
