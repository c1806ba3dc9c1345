//! Helpers for observing the engine in tests.
//!
//! - [`EventRecorder`]: an [`ExecutionListener`] that keeps every event
//! - [`render`]: one line per event, handy for snapshots
//! - [`verify_stream`]: checks the structural guarantees of an event stream

use std::collections::HashSet;

use thiserror::Error;
use vintage_core::{Cause, EventKind, EventTarget, ExecutionEvent, ExecutionListener, UniqueId};

/// Records every event it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Vec<ExecutionEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ExecutionEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ExecutionEvent> {
        self.events
    }

    fn push(&mut self, target: &EventTarget<'_>, kind: EventKind) {
        self.events.push(ExecutionEvent::from_target(target, kind));
    }
}

impl ExecutionListener for EventRecorder {
    fn started(&mut self, target: &EventTarget<'_>) {
        self.push(target, EventKind::Started);
    }

    fn finished_successfully(&mut self, target: &EventTarget<'_>) {
        self.push(target, EventKind::FinishedSuccessfully);
    }

    fn finished_with_failure(&mut self, target: &EventTarget<'_>, cause: &Cause) {
        self.push(target, EventKind::FinishedWithFailure(cause.clone()));
    }

    fn aborted(&mut self, target: &EventTarget<'_>, cause: &Cause) {
        self.push(target, EventKind::Aborted(cause.clone()));
    }

    fn skipped(&mut self, target: &EventTarget<'_>, reason: &str) {
        self.push(target, EventKind::Skipped(reason.to_string()));
    }
}

/// One line per event.
pub fn render(events: &[ExecutionEvent]) -> String {
    events.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// A structural problem in an event stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamViolation {
    #[error("event {index}: `{id}` started more than once")]
    StartedTwice { index: usize, id: UniqueId },

    #[error("event {index}: `{id}` reported while its parent was not the innermost open node")]
    OutsideParent { index: usize, id: UniqueId },

    #[error("event {index}: `{id}` finished while not the innermost open node")]
    UnbalancedTerminal { index: usize, id: UniqueId },

    #[error("event {index}: `{id}` skipped after being started")]
    SkippedAfterStart { index: usize, id: UniqueId },

    #[error("event {index}: `{id}` started after being skipped")]
    StartedAfterSkip { index: usize, id: UniqueId },

    #[error("expected exactly one engine start, found {0}")]
    EngineStarts(usize),

    #[error("{0} node(s) never finished")]
    Unclosed(usize),
}

/// Check that `events` form a strictly nested stream.
///
/// Every start is matched by exactly one terminal event in LIFO order, every event is reported
/// while its parent is the innermost open node, skipped nodes are never started, and the engine
/// root starts exactly once.
pub fn verify_stream(events: &[ExecutionEvent]) -> Result<(), StreamViolation> {
    let mut open: Vec<&UniqueId> = Vec::new();
    let mut started: HashSet<&UniqueId> = HashSet::new();
    let mut skipped: HashSet<&UniqueId> = HashSet::new();
    let mut engine_starts = 0;

    for (index, event) in events.iter().enumerate() {
        let id = &event.unique_id;
        match &event.kind {
            EventKind::Started | EventKind::Skipped(_) => {
                if open.last().copied() != event.parent_id() {
                    return Err(StreamViolation::OutsideParent { index, id: id.clone() });
                }
                if matches!(event.kind, EventKind::Skipped(_)) {
                    if started.contains(id) {
                        return Err(StreamViolation::SkippedAfterStart { index, id: id.clone() });
                    }
                    skipped.insert(id);
                    continue;
                }
                if skipped.contains(id) {
                    return Err(StreamViolation::StartedAfterSkip { index, id: id.clone() });
                }
                if !started.insert(id) {
                    return Err(StreamViolation::StartedTwice { index, id: id.clone() });
                }
                if event.is_engine() {
                    engine_starts += 1;
                }
                open.push(id);
            }
            _ => {
                if open.last().copied() != Some(id) {
                    return Err(StreamViolation::UnbalancedTerminal { index, id: id.clone() });
                }
                open.pop();
            }
        }
    }

    if engine_starts != 1 {
        return Err(StreamViolation::EngineStarts(engine_starts));
    }
    if !open.is_empty() {
        return Err(StreamViolation::Unclosed(open.len()));
    }
    Ok(())
}
