//! Notification callbacks.

use crate::description::Description;

/// A failed assertion, an unexpected error, or a violated assumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    description: Description,
    message: String,
    trace: Option<String>,
}

impl Failure {
    pub fn new(description: Description, message: impl Into<String>) -> Self {
        Self {
            description,
            message: message.into(),
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

/// Callbacks a legacy runner pushes while it runs.
///
/// Ignored tests get `test_ignored` *instead of* `test_started`/`test_finished`. A failing test gets
/// `test_started`, then `test_failure` (or `test_assumption_failure`), then `test_finished`.
/// Class-level problems are reported as a failure on the class description without any start.
pub trait RunListener {
    fn test_run_started(&mut self, _description: &Description) {}

    fn test_run_finished(&mut self) {}

    /// Only sent by runners that announce suite boundaries.
    fn test_suite_started(&mut self, _description: &Description) {}

    /// Only sent by runners that announce suite boundaries.
    fn test_suite_finished(&mut self, _description: &Description) {}

    fn test_started(&mut self, description: &Description);

    fn test_finished(&mut self, description: &Description);

    fn test_failure(&mut self, failure: &Failure);

    fn test_assumption_failure(&mut self, failure: &Failure);

    fn test_ignored(&mut self, description: &Description);
}

/// Fans notifications out to the listeners of one run.
///
/// A notifier is created per run and borrows its listeners for that run only.
#[derive(Default)]
pub struct RunNotifier<'a> {
    listeners: Vec<&'a mut dyn RunListener>,
}

impl<'a> RunNotifier<'a> {
    pub fn new() -> Self {
        Self { listeners: Vec::new() }
    }

    pub fn add_listener(&mut self, listener: &'a mut dyn RunListener) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn fire_test_run_started(&mut self, description: &Description) {
        for l in &mut self.listeners {
            l.test_run_started(description);
        }
    }

    pub fn fire_test_run_finished(&mut self) {
        for l in &mut self.listeners {
            l.test_run_finished();
        }
    }

    pub fn fire_test_suite_started(&mut self, description: &Description) {
        for l in &mut self.listeners {
            l.test_suite_started(description);
        }
    }

    pub fn fire_test_suite_finished(&mut self, description: &Description) {
        for l in &mut self.listeners {
            l.test_suite_finished(description);
        }
    }

    pub fn fire_test_started(&mut self, description: &Description) {
        for l in &mut self.listeners {
            l.test_started(description);
        }
    }

    pub fn fire_test_finished(&mut self, description: &Description) {
        for l in &mut self.listeners {
            l.test_finished(description);
        }
    }

    pub fn fire_test_failure(&mut self, failure: &Failure) {
        for l in &mut self.listeners {
            l.test_failure(failure);
        }
    }

    pub fn fire_test_assumption_failed(&mut self, failure: &Failure) {
        for l in &mut self.listeners {
            l.test_assumption_failure(failure);
        }
    }

    pub fn fire_test_ignored(&mut self, description: &Description) {
        for l in &mut self.listeners {
            l.test_ignored(description);
        }
    }
}
