//! The execution driver.
//!
//! [`VintageTestEngine`] ties discovery and execution together:
//!
//! 1. report the engine root as started
//! 2. run each discovered runner with a [`NotificationBridge`] attached to its notifier
//! 3. close whatever the runner left open; after a runner error nothing else of its subtree is reported
//! 4. report the engine root as finished, or failed when a runner itself failed
//!
//! Nothing escapes [`VintageTestEngine::execute`]: per-test outcomes become events, and engine-level
//! problems become the engine root's failure.

use tracing::{debug, error, info};
use vintage_core::{Cause, DescriptorTreeBuilder, EventKind, EventTarget, ExecutionListener, NodeKind};
use vintage_legacy::{RunNotifier, RunnerResolver};

use crate::bridge::NotificationBridge;
use crate::config::EngineConfig;
use crate::discovery::{self, DiscoveryRequest, EngineDescriptor};
use crate::error::EngineError;

/// Counts of what one execution reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub tests_started: usize,
    pub tests_succeeded: usize,
    pub tests_failed: usize,
    pub tests_aborted: usize,
    pub tests_skipped: usize,
    pub containers_started: usize,
    pub containers_failed: usize,
    pub containers_skipped: usize,
    /// Set when the engine root finished with a failure.
    pub engine_failure: Option<Cause>,
}

impl ExecutionSummary {
    pub(crate) fn record(&mut self, node: NodeKind, kind: &EventKind) {
        match (node, kind) {
            (NodeKind::Engine, _) => {}
            (NodeKind::Test, EventKind::Started) => self.tests_started += 1,
            (NodeKind::Test, EventKind::FinishedSuccessfully) => self.tests_succeeded += 1,
            (NodeKind::Test, EventKind::FinishedWithFailure(_)) => self.tests_failed += 1,
            (NodeKind::Test, EventKind::Aborted(_)) => self.tests_aborted += 1,
            (NodeKind::Test, EventKind::Skipped(_)) => self.tests_skipped += 1,
            (NodeKind::Container, EventKind::Started) => self.containers_started += 1,
            (NodeKind::Container, EventKind::FinishedWithFailure(_) | EventKind::Aborted(_)) => {
                self.containers_failed += 1
            }
            (NodeKind::Container, EventKind::Skipped(_)) => self.containers_skipped += 1,
            (NodeKind::Container, EventKind::FinishedSuccessfully) => {}
        }
    }

    /// No failures anywhere, including the engine root.
    pub fn is_successful(&self) -> bool {
        self.engine_failure.is_none() && self.tests_failed == 0 && self.containers_failed == 0
    }
}

/// A discovered engine plus the listener that should observe its execution.
pub struct ExecutionRequest<'a> {
    root: EngineDescriptor,
    listener: &'a mut dyn ExecutionListener,
}

impl<'a> ExecutionRequest<'a> {
    pub fn new(root: EngineDescriptor, listener: &'a mut dyn ExecutionListener) -> Self {
        Self { root, listener }
    }

    pub fn root(&self) -> &EngineDescriptor {
        &self.root
    }
}

/// Test engine running legacy runners.
#[derive(Debug, Clone, Default)]
pub struct VintageTestEngine {
    config: EngineConfig,
}

impl VintageTestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.engine_id
    }

    /// Build the descriptor tree for `request`.
    pub fn discover(
        &self,
        request: &DiscoveryRequest,
        resolver: &dyn RunnerResolver,
    ) -> Result<EngineDescriptor, EngineError> {
        discovery::discover(request, resolver, &self.config)
    }

    /// Run a discovered engine, reporting every event to the request's listener.
    #[tracing::instrument(skip_all, fields(engine = %self.config.engine_id, runners = request.root.runners.len()))]
    pub fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionSummary {
        let ExecutionRequest { root, listener } = request;
        let EngineDescriptor { tree, runners } = root;

        let mut bridge = NotificationBridge::new(&tree, listener, &self.config.default_skip_reason);
        bridge.start_engine();

        let mut failure = None;
        for entry in &runners {
            bridge.begin_runner(entry.node, &entry.index);
            let result = {
                let mut notifier = RunNotifier::new();
                notifier.add_listener(&mut bridge);
                notifier.fire_test_run_started(&entry.description);
                let result = entry.runner.run(&mut notifier);
                notifier.fire_test_run_finished();
                result
            };
            if let Err(source) = result {
                bridge.abort_runner();
                error!(class = %entry.class_name, error = %source, "legacy runner failed");
                failure = Some(EngineError::Runner {
                    class: entry.class_name.clone(),
                    source,
                });
                break;
            }
            bridge.finish_runner();
            if let Some(defect) = bridge.take_defect() {
                failure = Some(defect);
                break;
            }
            debug!(class = %entry.class_name, "legacy runner finished");
        }

        bridge.finish();
        let cause = failure.map(|e| e.to_cause());
        bridge.finish_engine(cause.as_ref());

        let summary = bridge.into_summary();
        info!(
            started = summary.tests_started,
            failed = summary.tests_failed,
            aborted = summary.tests_aborted,
            skipped = summary.tests_skipped,
            "execution finished"
        );
        summary
    }

    /// Discover and execute in one go.
    ///
    /// A discovery failure is reported as the engine root starting and then failing.
    pub fn run(
        &self,
        request: &DiscoveryRequest,
        resolver: &dyn RunnerResolver,
        listener: &mut dyn ExecutionListener,
    ) -> ExecutionSummary {
        match self.discover(request, resolver) {
            Ok(root) => self.execute(ExecutionRequest::new(root, listener)),
            Err(err) => {
                error!(error = %err, "discovery failed");
                self.report_engine_failure(listener, err.to_cause())
            }
        }
    }

    fn report_engine_failure(&self, listener: &mut dyn ExecutionListener, cause: Cause) -> ExecutionSummary {
        let tree = DescriptorTreeBuilder::new(&self.config.engine_id, &self.config.display_name).build();
        let target = EventTarget::new(tree.node(tree.root()), &[]);
        listener.started(&target);
        listener.finished_with_failure(&target, &cause);
        ExecutionSummary {
            engine_failure: Some(cause),
            ..ExecutionSummary::default()
        }
    }
}
