//! The notification bridge: legacy callbacks → ordered execution events.
//!
//! Legacy notifications are flat. Nothing says when a class starts or ends, ignored tests are never
//! started, and a failing test sends two callbacks (`test_failure`, then `test_finished`) for what is
//! one outcome. The bridge turns that into a strictly nested event stream by keeping, per run:
//!
//! - a status per node (`Pending`, `Open`, `Settled`)
//! - a stack of open nodes, root first, derived from the static tree rather than from the callbacks
//! - outcomes recorded against containers (class-level failures) until the container closes
//!
//! Containers start lazily, right before the first event inside them, and close as soon as activity
//! moves outside them or the runner returns. Empty containers have no activity at all, so they are
//! started and finished when the run passes their position in declared order.

use std::collections::HashMap;

use tracing::{debug, error, warn};
use vintage_core::{Cause, DescriptorTree, EventKind, EventTarget, ExecutionListener, NodeIdx, NodeKind};
use vintage_legacy::{Description, Failure, RunListener};

use crate::discovery::DescriptionIndex;
use crate::engine::ExecutionSummary;
use crate::error::EngineError;

/// Reported for a test that was started but never finished before its runner returned.
pub const UNFINISHED_TEST_MESSAGE: &str = "test did not finish before its runner returned";

/// Lifecycle of one bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Running,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    Open,
    Settled,
}

/// The runner currently being played back.
struct Scope<'a> {
    index: &'a DescriptionIndex,
    order: Vec<NodeIdx>,
    position: HashMap<NodeIdx, usize>,
    cursor: usize,
}

/// Translates one engine run's legacy notifications into events on `listener`.
pub struct NotificationBridge<'a, L: ExecutionListener + ?Sized> {
    tree: &'a DescriptorTree,
    listener: &'a mut L,
    skip_reason: &'a str,
    state: BridgeState,
    status: Vec<Status>,
    open: Vec<NodeIdx>,
    container_outcomes: HashMap<NodeIdx, EventKind>,
    scope: Option<Scope<'a>>,
    defect: Option<EngineError>,
    summary: ExecutionSummary,
}

impl<'a, L: ExecutionListener + ?Sized> NotificationBridge<'a, L> {
    pub fn new(tree: &'a DescriptorTree, listener: &'a mut L, skip_reason: &'a str) -> Self {
        Self {
            tree,
            listener,
            skip_reason,
            state: BridgeState::Idle,
            status: vec![Status::Pending; tree.len()],
            open: Vec::new(),
            container_outcomes: HashMap::new(),
            scope: None,
            defect: None,
            summary: ExecutionSummary::default(),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    // ========================================================================
    // Driver-facing API
    // ========================================================================

    /// Report the engine root as started.
    pub fn start_engine(&mut self) {
        let root = self.tree.root();
        self.status[root.index()] = Status::Open;
        self.emit(root, &EventKind::Started);
    }

    /// Report the engine root's terminal event.
    pub fn finish_engine(&mut self, failure: Option<&Cause>) {
        let root = self.tree.root();
        if self.status[root.index()] != Status::Open {
            return;
        }
        self.status[root.index()] = Status::Settled;
        match failure {
            Some(cause) => {
                self.summary.engine_failure = Some(cause.clone());
                self.emit(root, &EventKind::FinishedWithFailure(cause.clone()));
            }
            None => self.emit(root, &EventKind::FinishedSuccessfully),
        }
    }

    /// Bind the bridge to the runner whose container is `node`.
    pub(crate) fn begin_runner(&mut self, node: NodeIdx, index: &'a DescriptionIndex) {
        let order = self.tree.preorder(node);
        let position = order.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        self.scope = Some(Scope {
            index,
            order,
            position,
            cursor: 0,
        });
    }

    /// The current runner returned: report what is left of its subtree and close it.
    pub fn finish_runner(&mut self) {
        if self.defect.is_none() {
            let end = self.scope.as_ref().map_or(0, |s| s.order.len());
            self.sweep_empty_containers(end);
        }
        self.close_all();
        self.scope = None;
    }

    /// The current runner failed: close what it left open without visiting the rest of its subtree.
    pub fn abort_runner(&mut self) {
        self.close_all();
        self.scope = None;
    }

    /// No more notifications will arrive for this run.
    pub fn finish(&mut self) {
        self.close_all();
        if self.state != BridgeState::Done {
            debug!("bridge done");
        }
        self.state = BridgeState::Done;
    }

    /// The defect that stopped the bridge, if any.
    pub fn take_defect(&mut self) -> Option<EngineError> {
        self.defect.take()
    }

    pub fn has_defect(&self) -> bool {
        self.defect.is_some()
    }

    pub fn summary(&self) -> &ExecutionSummary {
        &self.summary
    }

    pub fn into_summary(self) -> ExecutionSummary {
        self.summary
    }

    // ========================================================================
    // Emission
    // ========================================================================

    fn emit(&mut self, idx: NodeIdx, kind: &EventKind) {
        let tree = self.tree;
        let node = tree.node(idx);
        let path = tree.path_ids(idx);
        let target = EventTarget::new(node, &path);
        self.summary.record(node.kind(), kind);
        self.listener.execution_event(&target, kind);
    }

    fn open(&mut self, idx: NodeIdx) {
        self.status[idx.index()] = Status::Open;
        self.open.push(idx);
        self.emit(idx, &EventKind::Started);
    }

    /// Pop the top of the open stack and report its terminal event.
    fn close_top(&mut self) {
        let Some(idx) = self.open.pop() else {
            return;
        };
        self.status[idx.index()] = Status::Settled;

        let kind = if self.tree.node(idx).is_test() {
            warn!(test = %self.tree.node(idx).unique_id(), "test never finished");
            EventKind::FinishedWithFailure(Cause::new(UNFINISHED_TEST_MESSAGE))
        } else {
            self.container_outcomes
                .remove(&idx)
                .unwrap_or(EventKind::FinishedSuccessfully)
        };
        self.emit(idx, &kind);
    }

    /// Report the terminal event of `idx`, a test on top of the open stack.
    fn finish_open_test(&mut self, idx: NodeIdx, kind: EventKind) {
        if self.open.last() == Some(&idx) {
            self.open.pop();
        }
        self.status[idx.index()] = Status::Settled;
        self.emit(idx, &kind);
    }

    /// Close open nodes down to and including `idx`.
    fn close_through(&mut self, idx: NodeIdx) {
        if !self.open.contains(&idx) {
            return;
        }
        while let Some(&top) = self.open.last() {
            self.close_top();
            if top == idx {
                break;
            }
        }
    }

    fn close_all(&mut self) {
        while !self.open.is_empty() {
            self.close_top();
        }
    }

    /// Close every open node that does not enclose `idx`.
    fn close_unrelated(&mut self, idx: NodeIdx) {
        while let Some(&top) = self.open.last() {
            if top == idx || self.tree.is_ancestor_of(top, idx) {
                break;
            }
            self.close_top();
        }
    }

    /// Start the not-yet-started containers enclosing `idx`, outermost first.
    fn open_ancestors(&mut self, idx: NodeIdx) {
        for ancestor in self.tree.ancestors(idx) {
            if self.tree.node(ancestor).kind() == NodeKind::Engine {
                continue;
            }
            if self.status[ancestor.index()] == Status::Pending {
                self.open(ancestor);
            }
        }
    }

    /// Bring the stream to `idx`: report empty containers declared before it, close what it is
    /// not part of, and start its enclosing containers.
    fn advance_to(&mut self, idx: NodeIdx) {
        let position = self.scope.as_ref().and_then(|s| s.position.get(&idx).copied());
        if let Some(position) = position {
            self.sweep_empty_containers(position);
        }
        self.close_unrelated(idx);
        self.open_ancestors(idx);
    }

    /// Start and finish every pending empty container declared before `end`.
    fn sweep_empty_containers(&mut self, end: usize) {
        loop {
            let next = match self.scope.as_mut() {
                Some(scope) if scope.cursor < end && scope.cursor < scope.order.len() => {
                    let idx = scope.order[scope.cursor];
                    scope.cursor += 1;
                    idx
                }
                _ => break,
            };

            if self.tree.node(next).is_empty_container()
                && self.status[next.index()] == Status::Pending
                && !self.inside_settled(next)
            {
                self.close_unrelated(next);
                self.open_ancestors(next);
                self.open(next);
                self.close_through(next);
            }
        }
    }

    /// Whether some container enclosing `idx` has already finished.
    fn inside_settled(&self, idx: NodeIdx) -> bool {
        self.tree
            .ancestors(idx)
            .iter()
            .any(|a| self.status[a.index()] == Status::Settled)
    }

    fn settle_subtree(&mut self, idx: NodeIdx) {
        for node in self.tree.preorder(idx) {
            if self.status[node.index()] == Status::Pending {
                self.status[node.index()] = Status::Settled;
            }
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Whether callbacks are still being translated. Moves `Idle` to `Running`.
    fn accepting(&mut self, callback: &str) -> bool {
        match self.state {
            BridgeState::Done => {
                warn!(callback, "notification after the run finished, ignoring");
                false
            }
            BridgeState::Idle => {
                debug!("bridge running");
                self.state = BridgeState::Running;
                self.defect.is_none()
            }
            BridgeState::Running => self.defect.is_none(),
        }
    }

    /// Nodes discovered for `description`, or record a defect when there are none.
    fn candidates(&mut self, description: &Description) -> Option<Vec<NodeIdx>> {
        let found = self
            .scope
            .as_ref()
            .and_then(|s| s.index.get(description.unique_id()))
            .cloned();
        if found.is_none() {
            error!(legacy_id = description.unique_id(), "notification for an undiscovered description");
            self.defect = Some(EngineError::UnknownDescription {
                legacy_id: description.unique_id().to_string(),
            });
        }
        found
    }

    fn first_with(&self, nodes: &[NodeIdx], status: Status) -> Option<NodeIdx> {
        nodes.iter().copied().find(|n| self.status[n.index()] == status)
    }

    fn first_open_or_pending(&self, nodes: &[NodeIdx]) -> Option<NodeIdx> {
        self.first_with(nodes, Status::Open)
            .or_else(|| self.first_with(nodes, Status::Pending))
    }

    /// Shared handling of `test_failure` and `test_assumption_failure`.
    fn record_outcome(&mut self, failure: &Failure, kind: EventKind, callback: &str) {
        if !self.accepting(callback) {
            return;
        }
        let Some(nodes) = self.candidates(failure.description()) else {
            return;
        };
        let Some(idx) = self.first_open_or_pending(&nodes) else {
            warn!(legacy_id = failure.description().unique_id(), callback, "outcome for a finished node, ignoring");
            return;
        };

        if self.tree.node(idx).is_test() {
            if self.status[idx.index()] == Status::Pending {
                self.advance_to(idx);
                self.open(idx);
            } else {
                self.close_unrelated(idx);
            }
            self.finish_open_test(idx, kind);
        } else {
            if self.status[idx.index()] == Status::Pending {
                self.advance_to(idx);
                self.open(idx);
            }
            self.settle_subtree(idx);
            self.container_outcomes.entry(idx).or_insert(kind);
        }
    }
}

fn cause_of(failure: &Failure) -> Cause {
    let cause = Cause::new(failure.message());
    match failure.trace() {
        Some(trace) => cause.with_trace(trace),
        None => cause,
    }
}

impl<L: ExecutionListener + ?Sized> RunListener for NotificationBridge<'_, L> {
    fn test_run_started(&mut self, description: &Description) {
        if self.accepting("test_run_started") {
            debug!(runner = description.display_name(), "legacy run started");
        }
    }

    fn test_suite_started(&mut self, description: &Description) {
        if !self.accepting("test_suite_started") {
            return;
        }
        let Some(nodes) = self.candidates(description) else {
            return;
        };
        if let Some(idx) = self.first_with(&nodes, Status::Pending) {
            if self.tree.node(idx).is_container() {
                self.advance_to(idx);
                self.open(idx);
            }
        }
    }

    fn test_suite_finished(&mut self, description: &Description) {
        if !self.accepting("test_suite_finished") {
            return;
        }
        let Some(nodes) = self.candidates(description) else {
            return;
        };
        if let Some(idx) = self.first_with(&nodes, Status::Open) {
            self.close_through(idx);
        }
    }

    fn test_started(&mut self, description: &Description) {
        if !self.accepting("test_started") {
            return;
        }
        let Some(nodes) = self.candidates(description) else {
            return;
        };
        let Some(idx) = self.first_with(&nodes, Status::Pending) else {
            warn!(legacy_id = description.unique_id(), "test started twice, ignoring");
            return;
        };
        self.advance_to(idx);
        self.open(idx);
    }

    fn test_finished(&mut self, description: &Description) {
        if !self.accepting("test_finished") {
            return;
        }
        let Some(nodes) = self.candidates(description) else {
            return;
        };

        if let Some(idx) = self.first_with(&nodes, Status::Open) {
            if self.tree.node(idx).is_test() {
                self.close_unrelated(idx);
                self.finish_open_test(idx, EventKind::FinishedSuccessfully);
            } else {
                self.close_through(idx);
            }
        } else if self.first_with(&nodes, Status::Settled).is_some() {
            // Second half of a failure or abort that was already reported.
        } else if let Some(idx) = self.first_with(&nodes, Status::Pending) {
            warn!(legacy_id = description.unique_id(), "finished without being started, reporting both");
            self.advance_to(idx);
            self.open(idx);
            if self.tree.node(idx).is_test() {
                self.finish_open_test(idx, EventKind::FinishedSuccessfully);
            } else {
                self.close_through(idx);
            }
        }
    }

    fn test_failure(&mut self, failure: &Failure) {
        self.record_outcome(failure, EventKind::FinishedWithFailure(cause_of(failure)), "test_failure");
    }

    fn test_assumption_failure(&mut self, failure: &Failure) {
        self.record_outcome(failure, EventKind::Aborted(cause_of(failure)), "test_assumption_failure");
    }

    fn test_ignored(&mut self, description: &Description) {
        if !self.accepting("test_ignored") {
            return;
        }
        let Some(nodes) = self.candidates(description) else {
            return;
        };
        let Some(idx) = self.first_with(&nodes, Status::Pending) else {
            warn!(legacy_id = description.unique_id(), "ignored after it already ran, ignoring");
            return;
        };

        self.advance_to(idx);
        self.settle_subtree(idx);
        let reason = self.skip_reason.to_string();
        self.emit(idx, &EventKind::Skipped(reason));
    }
}
