//! Executing legacy test classes end to end
//!
//! Each test discovers one or more sample classes, executes them against an
//! [`EventRecorder`], checks that the stream nests correctly, and then asserts
//! on individual events by index.

mod common;

use common::*;
use vintage::testing::{EventRecorder, render, verify_stream};
use vintage::{DiscoveryRequest, ExecutionRequest, ExecutionSummary, UNFINISHED_TEST_MESSAGE, VintageTestEngine};
use vintage_core::{EventKind, ExecutionEvent, NodeKind};

/// Discover `classes`, execute them, and return the recorded events.
fn execute(classes: &[&str]) -> (Vec<ExecutionEvent>, ExecutionSummary) {
    init_tracing();
    let engine = VintageTestEngine::new();
    let request = DiscoveryRequest::for_classes(classes.iter().copied());
    let root = engine.discover(&request, &SampleResolver::new()).expect("discovery failed");

    let mut recorder = EventRecorder::new();
    let summary = engine.execute(ExecutionRequest::new(root, &mut recorder));
    let events = recorder.into_events();

    if let Err(violation) = verify_stream(&events) {
        panic!("malformed event stream: {violation}\n{}", render(&events));
    }
    (events, summary)
}

fn at(events: &[ExecutionEvent], index: usize) -> String {
    events[index].to_string()
}

// ============================================================================
// Plain classes
// ============================================================================

#[test]
fn test_executes_single_failing_test() {
    let (events, summary) = execute(&[SINGLE_FAILING]);

    assert_eq!(events.len(), 6);
    assert_eq!(at(&events, 0), "engine:JUnit Vintage started");
    assert_eq!(at(&events, 1), format!("container:{SINGLE_FAILING} started"));
    assert_eq!(at(&events, 2), "test:failingTest started");
    assert_eq!(at(&events, 3), format!("test:failingTest failed: {FAILURE_MESSAGE}"));
    assert_eq!(at(&events, 4), format!("container:{SINGLE_FAILING} finished"));
    assert_eq!(at(&events, 5), "engine:JUnit Vintage finished");

    assert!(!events.iter().any(|e| e.node_kind == NodeKind::Test && e.kind == EventKind::FinishedSuccessfully));
    assert_eq!(summary.tests_failed, 1);
    assert_eq!(summary.engine_failure, None);
}

#[test]
fn test_executes_two_tests() {
    let (events, _) = execute(&[TWO_TESTS]);

    assert_eq!(events.len(), 8);
    assert_eq!(at(&events, 1), format!("container:{TWO_TESTS} started"));
    assert_eq!(at(&events, 2), "test:failingTest started");
    assert_eq!(at(&events, 3), format!("test:failingTest failed: {FAILURE_MESSAGE}"));
    assert_eq!(at(&events, 4), "test:successfulTest started");
    assert_eq!(at(&events, 5), "test:successfulTest finished");
    assert_eq!(at(&events, 6), format!("container:{TWO_TESTS} finished"));
    assert_eq!(at(&events, 7), "engine:JUnit Vintage finished");
}

#[test]
fn test_executes_four_tests_with_ignored_one() {
    let (events, summary) = execute(&[FOUR_TESTS]);

    assert_eq!(events.len(), 11);
    insta::assert_snapshot!(render(&events), @r"
    engine:JUnit Vintage started
    container:samples.PlainJUnit4TestCaseWithFourTests started
    test:abortedTest started
    test:abortedTest aborted: this test should be aborted
    test:failingTest started
    test:failingTest failed: this test should fail
    test:ignoredTest skipped: <unknown>
    test:successfulTest started
    test:successfulTest finished
    container:samples.PlainJUnit4TestCaseWithFourTests finished
    engine:JUnit Vintage finished
    ");

    let ignored: Vec<_> = events.iter().filter(|e| e.display_name == "ignoredTest").collect();
    assert_eq!(ignored.len(), 1);
    assert_eq!(ignored[0].kind, EventKind::Skipped("<unknown>".to_string()));

    assert_eq!(summary.tests_started, 3);
    assert_eq!(summary.tests_succeeded, 1);
    assert_eq!(summary.tests_failed, 1);
    assert_eq!(summary.tests_aborted, 1);
    assert_eq!(summary.tests_skipped, 1);
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_executes_enclosed_class() {
    let (events, _) = execute(&[ENCLOSED]);

    assert_eq!(events.len(), 8);
    assert_eq!(at(&events, 1), format!("container:{ENCLOSED} started"));
    assert_eq!(at(&events, 2), format!("container:{ENCLOSED_NESTED} started"));
    assert_eq!(at(&events, 3), "test:failingTest started");
    assert_eq!(at(&events, 4), format!("test:failingTest failed: {FAILURE_MESSAGE}"));
    assert_eq!(at(&events, 5), format!("container:{ENCLOSED_NESTED} finished"));
    assert_eq!(at(&events, 6), format!("container:{ENCLOSED} finished"));
    assert_eq!(at(&events, 7), "engine:JUnit Vintage finished");

    let parent = events[3].parent_id().map(ToString::to_string);
    assert_eq!(
        parent.as_deref(),
        Some("[engine:junit-vintage]/[runner:samples.EnclosedJUnit4TestCase]/[suite:samples.EnclosedJUnit4TestCase$NestedClass]")
    );
    assert_eq!(events[3].path.len(), 3);
}

#[test]
fn test_executes_suite_of_suites() {
    let (events, _) = execute(&[SUITE]);

    assert_eq!(events.len(), 10);
    insta::assert_snapshot!(render(&events), @r"
    engine:JUnit Vintage started
    container:samples.JUnit4SuiteWithJUnit3SuiteWithSingleTestCase started
    container:TestSuite with 1 tests started
    container:samples.PlainJUnit3TestCaseWithSingleTestWhichFails started
    test:test started
    test:test failed: this test should fail
    container:samples.PlainJUnit3TestCaseWithSingleTestWhichFails finished
    container:TestSuite with 1 tests finished
    container:samples.JUnit4SuiteWithJUnit3SuiteWithSingleTestCase finished
    engine:JUnit Vintage finished
    ");
    assert_eq!(at(&events, 2), format!("container:{JUNIT3_SUITE_LABEL} started"));
    assert_eq!(at(&events, 3), format!("container:{JUNIT3_SINGLE_FAILING} started"));
}

#[test]
fn test_announced_suites_nest_like_inferred_ones() {
    let (events, summary) = execute(&[ANNOUNCING]);

    insta::assert_snapshot!(render(&events), @r"
    engine:JUnit Vintage started
    container:samples.SuiteAnnouncingItsChildren started
    container:samples.First started
    test:a started
    test:a finished
    container:samples.First finished
    container:samples.Second started
    test:b started
    test:b finished
    container:samples.Second finished
    container:samples.SuiteAnnouncingItsChildren finished
    engine:JUnit Vintage finished
    ");
    assert!(summary.is_successful());
}

// ============================================================================
// Several classes
// ============================================================================

#[test]
fn test_one_engine_pair_for_several_classes() {
    let (events, _) = execute(&[SINGLE_FAILING, "samples.NotATestCase", TWO_TESTS]);

    assert_eq!(events.len(), 12);
    assert_eq!(events.iter().filter(|e| e.is_engine()).count(), 2);
    assert_eq!(at(&events, 4), format!("container:{SINGLE_FAILING} finished"));
    assert_eq!(at(&events, 5), format!("container:{TWO_TESTS} started"));
}

#[test]
fn test_empty_class_starts_and_finishes() {
    let (events, summary) = execute(&[EMPTY_CLASS]);

    assert_eq!(
        events.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "engine:JUnit Vintage started".to_string(),
            format!("container:{EMPTY_CLASS} started"),
            format!("container:{EMPTY_CLASS} finished"),
            "engine:JUnit Vintage finished".to_string(),
        ]
    );
    assert_eq!(summary.containers_started, 1);
    assert_eq!(summary.tests_started, 0);
}

#[test]
fn test_repeated_description_runs_twice() {
    let (events, summary) = execute(&[REPEATED]);

    assert_eq!(events.len(), 8);
    assert_eq!(at(&events, 3), "test:repeated finished");
    assert_eq!(at(&events, 5), format!("test:repeated failed: {FAILURE_MESSAGE}"));
    assert_ne!(events[2].unique_id, events[4].unique_id);
    assert!(events[4].unique_id.to_string().ends_with("[test:repeated(samples.TestCaseWithRepeatedTest)#2]"));
    assert_eq!(summary.tests_started, 2);
}

// ============================================================================
// Class-level outcomes
// ============================================================================

#[test]
fn test_class_fixture_failure_fails_the_class() {
    let (events, summary) = execute(&[FAILING_FIXTURE]);

    assert_eq!(events.len(), 4);
    assert_eq!(at(&events, 1), format!("container:{FAILING_FIXTURE} started"));
    assert_eq!(at(&events, 2), format!("container:{FAILING_FIXTURE} failed: before class failed"));
    assert_eq!(at(&events, 3), "engine:JUnit Vintage finished");
    assert_eq!(summary.containers_failed, 1);
    assert_eq!(summary.engine_failure, None);
}

#[test]
fn test_ignored_class_is_skipped_once() {
    let (events, summary) = execute(&[IGNORED_CLASS]);

    assert_eq!(events.len(), 3);
    assert_eq!(at(&events, 1), format!("container:{IGNORED_CLASS} skipped: <unknown>"));
    assert_eq!(summary.containers_skipped, 1);
    assert_eq!(summary.tests_skipped, 0);
    assert!(summary.is_successful());
}

// ============================================================================
// Engine-level failures
// ============================================================================

#[test]
fn test_runner_error_fails_engine_and_stops() {
    let (events, summary) = execute(&[CRASHING, TWO_TESTS]);

    assert_eq!(events.len(), 8);
    assert_eq!(at(&events, 4), "test:second started");
    assert_eq!(at(&events, 5), format!("test:second failed: {UNFINISHED_TEST_MESSAGE}"));
    assert_eq!(at(&events, 6), format!("container:{CRASHING} finished"));
    assert_eq!(
        at(&events, 7),
        format!("engine:JUnit Vintage failed: legacy runner for `{CRASHING}` failed: runner aborted: runner crashed")
    );
    assert!(!events.iter().any(|e| e.display_name == TWO_TESTS));

    let engine_failure = summary.engine_failure.expect("engine should fail");
    assert!(engine_failure.message().contains("runner crashed"));
}

#[test]
fn test_runner_failing_before_any_notification_reports_only_the_engine() {
    let (events, summary) = execute(&[CRASHING_ON_START, TWO_TESTS]);

    insta::assert_snapshot!(render(&events), @r"
    engine:JUnit Vintage started
    engine:JUnit Vintage failed: legacy runner for `samples.TestCaseWhoseRunnerCannotStart` failed: runner could not be initialized: cannot start
    ");
    assert_eq!(summary.containers_started, 0);
    assert!(summary.engine_failure.is_some());
}

#[test]
fn test_runner_error_does_not_visit_trailing_empty_suites() {
    let (events, _) = execute(&[CRASHING_MID_TEST]);

    insta::assert_snapshot!(render(&events), @r"
    engine:JUnit Vintage started
    container:samples.TestCaseWhoseRunnerCrashesMidTest started
    test:running started
    test:running failed: test did not finish before its runner returned
    container:samples.TestCaseWhoseRunnerCrashesMidTest finished
    engine:JUnit Vintage failed: legacy runner for `samples.TestCaseWhoseRunnerCrashesMidTest` failed: runner aborted: runner crashed
    ");
    assert!(!events.iter().any(|e| e.display_name.ends_with("$Trailing")));
}

#[test]
fn test_undeclared_test_fails_engine() {
    let (events, summary) = execute(&[LYING, SINGLE_FAILING]);

    assert_eq!(events.len(), 6);
    assert_eq!(at(&events, 2), "test:declared started");
    assert_eq!(at(&events, 3), "test:declared finished");
    assert_eq!(at(&events, 4), format!("container:{LYING} finished"));
    assert_eq!(
        at(&events, 5),
        format!("engine:JUnit Vintage failed: legacy runner reported `undeclared({LYING})`, which was not discovered")
    );
    assert!(!summary.is_successful());
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_recorded_stream_serializes_to_json() {
    let (events, _) = execute(&[SINGLE_FAILING]);

    let json = serde_json::to_value(&events).expect("events serialize");
    assert_eq!(json[0]["node_kind"], "engine");
    assert_eq!(json[0]["kind"]["type"], "started");
    assert_eq!(json[3]["display_name"], "failingTest");
    assert_eq!(json[3]["kind"]["type"], "finished_with_failure");
    assert_eq!(json[3]["kind"]["detail"]["message"], FAILURE_MESSAGE);

    let back: Vec<ExecutionEvent> = serde_json::from_value(json).expect("events deserialize");
    assert_eq!(back, events);
}
