//! A deterministic, in-memory legacy runner.
//!
//! [`ScriptedRunner`] plays back a pre-declared suite exactly the way a classic legacy runner would:
//! children in declared order, ignored tests reported with `test_ignored` only, failures between
//! `test_started` and `test_finished`, class-level failures reported on the class description
//! without running its children. It can optionally announce suite boundaries and fail mid-run,
//! which makes it the test double for everything built on top of this crate.
//!
//! ```rust
//! use vintage_legacy::scripted::{Outcome, ScriptedRunner, ScriptedSuite};
//! use vintage_legacy::Runner;
//!
//! let runner = ScriptedRunner::new(
//!     ScriptedSuite::class("com.example.FooTest")
//!         .test("failingTest", Outcome::Fail("this test should fail".into()))
//!         .test("successfulTest", Outcome::Pass),
//! );
//! assert_eq!(runner.description().test_count(), 2);
//! ```

use crate::description::Description;
use crate::notification::{Failure, RunNotifier};
use crate::runner::{Runner, RunnerError, RunnerResolver};

/// How a scripted test ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// Assertion failure carrying its message.
    Fail(String),
    /// Violated assumption carrying its message.
    Abort(String),
    Ignore,
}

#[derive(Debug, Clone)]
struct ScriptedTest {
    description: Description,
    outcome: Outcome,
}

#[derive(Debug, Clone)]
enum ScriptedChild {
    Test(ScriptedTest),
    Suite(ScriptedSuite),
}

/// A class or suite with its scripted children.
#[derive(Debug, Clone)]
pub struct ScriptedSuite {
    label: Description,
    children: Vec<ScriptedChild>,
    class_failure: Option<String>,
    ignored: bool,
}

impl ScriptedSuite {
    /// A test class named by its fully qualified name.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self::from_label(Description::class(class_name))
    }

    /// A suite identified only by a label, such as `TestSuite with 1 tests`.
    pub fn labelled(label: impl Into<String>) -> Self {
        Self::from_label(Description::suite(label))
    }

    fn from_label(label: Description) -> Self {
        Self {
            label,
            children: Vec::new(),
            class_failure: None,
            ignored: false,
        }
    }

    /// Add a test method of this class.
    pub fn test(self, method_name: impl Into<String>, outcome: Outcome) -> Self {
        let class_name = self
            .label
            .class_name()
            .unwrap_or(self.label.display_name())
            .to_string();
        self.test_described(Description::test(class_name, method_name), outcome)
    }

    /// Add a test with an explicit description (for repeated or foreign ids).
    pub fn test_described(mut self, description: Description, outcome: Outcome) -> Self {
        self.children.push(ScriptedChild::Test(ScriptedTest { description, outcome }));
        self
    }

    /// Nest a suite or class.
    pub fn suite(mut self, child: ScriptedSuite) -> Self {
        self.children.push(ScriptedChild::Suite(child));
        self
    }

    /// Fail at class level (like a failing class fixture): none of the children run.
    pub fn failing_class(mut self, message: impl Into<String>) -> Self {
        self.class_failure = Some(message.into());
        self
    }

    /// Ignore the whole class: one `test_ignored` for the class, nothing else.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn name(&self) -> &str {
        self.label.display_name()
    }

    /// The static description tree of this suite.
    pub fn description(&self) -> Description {
        let mut description = self.label.clone();
        for child in &self.children {
            match child {
                ScriptedChild::Test(t) => description.add_child(t.description.clone()),
                ScriptedChild::Suite(s) => description.add_child(s.description()),
            }
        }
        description
    }
}

#[derive(Debug, Clone)]
struct InjectedError {
    after: usize,
    error: RunnerError,
}

/// Plays back a [`ScriptedSuite`].
#[derive(Debug, Clone)]
pub struct ScriptedRunner {
    root: ScriptedSuite,
    announce_suites: bool,
    error: Option<InjectedError>,
}

impl ScriptedRunner {
    pub fn new(root: ScriptedSuite) -> Self {
        Self {
            root,
            announce_suites: false,
            error: None,
        }
    }

    /// Also send `test_suite_started`/`test_suite_finished` around every suite.
    pub fn announcing_suites(mut self) -> Self {
        self.announce_suites = true;
        self
    }

    /// Return `error` from `run` once `notifications` notifications have been sent.
    pub fn failing_after(mut self, notifications: usize, error: RunnerError) -> Self {
        self.error = Some(InjectedError {
            after: notifications,
            error,
        });
        self
    }

    pub fn class_name(&self) -> &str {
        self.root.name()
    }
}

impl Runner for ScriptedRunner {
    fn description(&self) -> Description {
        self.root.description()
    }

    fn run(&self, notifier: &mut RunNotifier<'_>) -> Result<(), RunnerError> {
        let mut script = Playback {
            notifier,
            fired: 0,
            error: self.error.as_ref(),
            announce_suites: self.announce_suites,
        };
        script.suite(&self.root)
    }
}

struct Playback<'r, 'n, 'a> {
    notifier: &'n mut RunNotifier<'a>,
    fired: usize,
    error: Option<&'r InjectedError>,
    announce_suites: bool,
}

impl<'a> Playback<'_, '_, 'a> {
    fn fire(&mut self, send: impl FnOnce(&mut RunNotifier<'a>)) -> Result<(), RunnerError> {
        if let Some(injected) = self.error {
            if self.fired >= injected.after {
                tracing::trace!(fired = self.fired, "scripted runner failing");
                return Err(injected.error.clone());
            }
        }
        send(&mut *self.notifier);
        self.fired += 1;
        Ok(())
    }

    fn suite(&mut self, suite: &ScriptedSuite) -> Result<(), RunnerError> {
        let description = suite.description();
        if suite.ignored {
            return self.fire(|n| n.fire_test_ignored(&description));
        }

        if self.announce_suites {
            self.fire(|n| n.fire_test_suite_started(&description))?;
        }

        if let Some(message) = &suite.class_failure {
            let failure = Failure::new(description.clone(), message.clone());
            self.fire(|n| n.fire_test_failure(&failure))?;
        } else {
            for child in &suite.children {
                match child {
                    ScriptedChild::Test(t) => self.test(t)?,
                    ScriptedChild::Suite(s) => self.suite(s)?,
                }
            }
        }

        if self.announce_suites {
            self.fire(|n| n.fire_test_suite_finished(&description))?;
        }
        Ok(())
    }

    fn test(&mut self, test: &ScriptedTest) -> Result<(), RunnerError> {
        let description = &test.description;
        if test.outcome == Outcome::Ignore {
            return self.fire(|n| n.fire_test_ignored(description));
        }

        self.fire(|n| n.fire_test_started(description))?;
        match &test.outcome {
            Outcome::Fail(message) => {
                let failure = Failure::new(description.clone(), message.clone());
                self.fire(|n| n.fire_test_failure(&failure))?;
            }
            Outcome::Abort(message) => {
                let failure = Failure::new(description.clone(), message.clone());
                self.fire(|n| n.fire_test_assumption_failed(&failure))?;
            }
            Outcome::Pass | Outcome::Ignore => {}
        }
        self.fire(|n| n.fire_test_finished(description))
    }
}

/// Resolves class names to registered scripted runners; anything else is not a test class.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRegistry {
    runners: Vec<ScriptedRunner>,
}

impl ScriptedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, runner: ScriptedRunner) {
        self.runners.push(runner);
    }

    pub fn with(mut self, runner: ScriptedRunner) -> Self {
        self.register(runner);
        self
    }
}

impl RunnerResolver for ScriptedRegistry {
    fn resolve(&self, class_name: &str) -> Option<Box<dyn Runner>> {
        self.runners
            .iter()
            .find(|r| r.class_name() == class_name)
            .map(|r| Box::new(r.clone()) as Box<dyn Runner>)
    }
}
