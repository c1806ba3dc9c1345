//! Sample legacy test classes and shared helpers for integration tests.

#![allow(dead_code)]

use tracing_subscriber::EnvFilter;
use vintage::legacy::{Description, RunNotifier, Runner, RunnerError, RunnerResolver};
use vintage::legacy::scripted::{Outcome, ScriptedRegistry, ScriptedRunner, ScriptedSuite};

pub const SINGLE_FAILING: &str = "samples.PlainJUnit4TestCaseWithSingleTestWhichFails";
pub const TWO_TESTS: &str = "samples.PlainJUnit4TestCaseWithTwoTests";
pub const FOUR_TESTS: &str = "samples.PlainJUnit4TestCaseWithFourTests";
pub const ENCLOSED: &str = "samples.EnclosedJUnit4TestCase";
pub const ENCLOSED_NESTED: &str = "samples.EnclosedJUnit4TestCase$NestedClass";
pub const SUITE: &str = "samples.JUnit4SuiteWithJUnit3SuiteWithSingleTestCase";
pub const JUNIT3_SUITE_LABEL: &str = "TestSuite with 1 tests";
pub const JUNIT3_SINGLE_FAILING: &str = "samples.PlainJUnit3TestCaseWithSingleTestWhichFails";
pub const EMPTY_CLASS: &str = "samples.EmptyTestCase";
pub const FAILING_FIXTURE: &str = "samples.TestCaseWithFailingBeforeClass";
pub const IGNORED_CLASS: &str = "samples.IgnoredTestCase";
pub const CRASHING: &str = "samples.TestCaseWhoseRunnerCrashes";
pub const CRASHING_ON_START: &str = "samples.TestCaseWhoseRunnerCannotStart";
pub const CRASHING_MID_TEST: &str = "samples.TestCaseWhoseRunnerCrashesMidTest";
pub const LYING: &str = "samples.TestCaseWithUndeclaredTest";
pub const ANNOUNCING: &str = "samples.SuiteAnnouncingItsChildren";
pub const REPEATED: &str = "samples.TestCaseWithRepeatedTest";

pub const FAILURE_MESSAGE: &str = "this test should fail";
pub const ABORT_MESSAGE: &str = "this test should be aborted";

/// Route engine logs through the test writer. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fails() -> Outcome {
    Outcome::Fail(FAILURE_MESSAGE.to_string())
}

/// Every sample class, resolvable by name.
pub fn samples() -> ScriptedRegistry {
    ScriptedRegistry::new()
        .with(ScriptedRunner::new(
            ScriptedSuite::class(SINGLE_FAILING).test("failingTest", fails()),
        ))
        .with(ScriptedRunner::new(
            ScriptedSuite::class(TWO_TESTS)
                .test("failingTest", fails())
                .test("successfulTest", Outcome::Pass),
        ))
        .with(ScriptedRunner::new(
            ScriptedSuite::class(FOUR_TESTS)
                .test("abortedTest", Outcome::Abort(ABORT_MESSAGE.to_string()))
                .test("failingTest", fails())
                .test("ignoredTest", Outcome::Ignore)
                .test("successfulTest", Outcome::Pass),
        ))
        .with(ScriptedRunner::new(
            ScriptedSuite::class(ENCLOSED).suite(ScriptedSuite::class(ENCLOSED_NESTED).test("failingTest", fails())),
        ))
        .with(ScriptedRunner::new(ScriptedSuite::class(SUITE).suite(
            ScriptedSuite::labelled(JUNIT3_SUITE_LABEL)
                .suite(ScriptedSuite::class(JUNIT3_SINGLE_FAILING).test("test", fails())),
        )))
        .with(ScriptedRunner::new(ScriptedSuite::class(EMPTY_CLASS)))
        .with(ScriptedRunner::new(
            ScriptedSuite::class(FAILING_FIXTURE)
                .test("neverRuns", Outcome::Pass)
                .failing_class("before class failed"),
        ))
        .with(ScriptedRunner::new(
            ScriptedSuite::class(IGNORED_CLASS)
                .test("first", Outcome::Pass)
                .test("second", Outcome::Pass)
                .ignored(),
        ))
        .with(
            ScriptedRunner::new(
                ScriptedSuite::class(CRASHING)
                    .test("first", Outcome::Pass)
                    .test("second", Outcome::Pass),
            )
            .failing_after(3, RunnerError::Aborted("runner crashed".to_string())),
        )
        .with(
            ScriptedRunner::new(
                ScriptedSuite::class(CRASHING_ON_START)
                    .suite(ScriptedSuite::class(format!("{CRASHING_ON_START}$Empty")))
                    .test("neverRuns", Outcome::Pass),
            )
            .failing_after(0, RunnerError::Initialization("cannot start".to_string())),
        )
        .with(
            ScriptedRunner::new(
                ScriptedSuite::class(CRASHING_MID_TEST)
                    .test("running", Outcome::Pass)
                    .suite(ScriptedSuite::class(format!("{CRASHING_MID_TEST}$Trailing"))),
            )
            .failing_after(1, RunnerError::Aborted("runner crashed".to_string())),
        )
        .with(
            ScriptedRunner::new(
                ScriptedSuite::class(ANNOUNCING)
                    .suite(ScriptedSuite::class("samples.First").test("a", Outcome::Pass))
                    .suite(ScriptedSuite::class("samples.Second").test("b", Outcome::Pass)),
            )
            .announcing_suites(),
        )
        .with(ScriptedRunner::new(
            ScriptedSuite::class(REPEATED)
                .test("repeated", Outcome::Pass)
                .test("repeated", fails()),
        ))
}

/// Declares one test but also reports one it never declared.
#[derive(Debug, Clone)]
pub struct UndeclaredTestRunner;

impl Runner for UndeclaredTestRunner {
    fn description(&self) -> Description {
        Description::class(LYING).with_child(Description::test(LYING, "declared"))
    }

    fn run(&self, notifier: &mut RunNotifier<'_>) -> Result<(), RunnerError> {
        let declared = Description::test(LYING, "declared");
        let undeclared = Description::test(LYING, "undeclared");
        notifier.fire_test_started(&declared);
        notifier.fire_test_finished(&declared);
        notifier.fire_test_started(&undeclared);
        notifier.fire_test_finished(&undeclared);
        Ok(())
    }
}

/// [`samples`] plus [`UndeclaredTestRunner`] under [`LYING`].
pub struct SampleResolver {
    registry: ScriptedRegistry,
}

impl SampleResolver {
    pub fn new() -> Self {
        Self { registry: samples() }
    }
}

impl RunnerResolver for SampleResolver {
    fn resolve(&self, class_name: &str) -> Option<Box<dyn Runner>> {
        if class_name == LYING {
            return Some(Box::new(UndeclaredTestRunner));
        }
        self.registry.resolve(class_name)
    }
}
