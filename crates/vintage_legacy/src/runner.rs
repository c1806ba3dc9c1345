//! Runner and resolver traits.

use thiserror::Error;

use crate::description::Description;
use crate::notification::RunNotifier;

/// Errors escaping a runner invocation itself.
///
/// Per-test failures never surface here; they are reported through the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error("runner could not be initialized: {0}")]
    Initialization(String),

    #[error("runner aborted: {0}")]
    Aborted(String),
}

/// A legacy runner: describes its tests statically and runs them, pushing notifications.
pub trait Runner {
    /// The static description tree. Must not run anything.
    fn description(&self) -> Description;

    /// Run every test, reporting through `notifier`.
    fn run(&self, notifier: &mut RunNotifier<'_>) -> Result<(), RunnerError>;
}

/// Decides which classes are legacy test classes and builds their runners.
pub trait RunnerResolver {
    /// `None` when `class_name` is not a test or suite under the legacy rules.
    fn resolve(&self, class_name: &str) -> Option<Box<dyn Runner>>;
}
