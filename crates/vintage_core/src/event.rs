//! Execution events and the listener they are delivered to.
//!
//! The engine reports every lifecycle change of a node through an [`ExecutionListener`]. Each call
//! receives an [`EventTarget`] describing the node and the containers enclosing it, so a listener
//! can record or assert on the stream without holding the descriptor tree.

use std::fmt;

use crate::descriptor::{NodeKind, TestDescriptor};
use crate::unique_id::UniqueId;

/// Why a node finished with a failure or was aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cause {
    message: String,
    trace: Option<String>,
}

impl Cause {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What happened to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "type", content = "detail"))]
pub enum EventKind {
    Started,
    FinishedSuccessfully,
    FinishedWithFailure(Cause),
    Aborted(Cause),
    Skipped(String),
}

impl EventKind {
    /// Terminal events close a previously started node.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::FinishedSuccessfully | EventKind::FinishedWithFailure(_) | EventKind::Aborted(_)
        )
    }

    pub fn cause(&self) -> Option<&Cause> {
        match self {
            EventKind::FinishedWithFailure(cause) | EventKind::Aborted(cause) => Some(cause),
            _ => None,
        }
    }
}

/// The node an event is reported for.
#[derive(Debug, Clone, Copy)]
pub struct EventTarget<'a> {
    pub unique_id: &'a UniqueId,
    pub display_name: &'a str,
    pub kind: NodeKind,
    /// Ids of the enclosing nodes, root first. Empty for the engine root.
    pub path: &'a [UniqueId],
}

impl<'a> EventTarget<'a> {
    pub fn new(node: &'a TestDescriptor, path: &'a [UniqueId]) -> Self {
        Self {
            unique_id: node.unique_id(),
            display_name: node.display_name(),
            kind: node.kind(),
            path,
        }
    }
}

/// Receives the engine's event stream.
///
/// Implementations only observe; they never influence execution.
pub trait ExecutionListener {
    fn started(&mut self, target: &EventTarget<'_>);

    fn finished_successfully(&mut self, target: &EventTarget<'_>);

    fn finished_with_failure(&mut self, target: &EventTarget<'_>, cause: &Cause);

    fn aborted(&mut self, target: &EventTarget<'_>, cause: &Cause);

    fn skipped(&mut self, target: &EventTarget<'_>, reason: &str);

    /// Route an [`EventKind`] to the matching callback.
    fn execution_event(&mut self, target: &EventTarget<'_>, kind: &EventKind) {
        match kind {
            EventKind::Started => self.started(target),
            EventKind::FinishedSuccessfully => self.finished_successfully(target),
            EventKind::FinishedWithFailure(cause) => self.finished_with_failure(target, cause),
            EventKind::Aborted(cause) => self.aborted(target, cause),
            EventKind::Skipped(reason) => self.skipped(target, reason),
        }
    }
}

/// An owned copy of one delivered event, as kept by recording listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionEvent {
    pub unique_id: UniqueId,
    pub display_name: String,
    pub node_kind: NodeKind,
    pub path: Vec<UniqueId>,
    pub kind: EventKind,
}

impl ExecutionEvent {
    pub fn from_target(target: &EventTarget<'_>, kind: EventKind) -> Self {
        Self {
            unique_id: target.unique_id.clone(),
            display_name: target.display_name.to_string(),
            node_kind: target.kind,
            path: target.path.to_vec(),
            kind,
        }
    }

    pub fn is_engine(&self) -> bool {
        self.node_kind == NodeKind::Engine
    }

    /// Id of the directly enclosing node, if any.
    pub fn parent_id(&self) -> Option<&UniqueId> {
        self.path.last()
    }
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ", self.node_kind, self.display_name)?;
        match &self.kind {
            EventKind::Started => write!(f, "started"),
            EventKind::FinishedSuccessfully => write!(f, "finished"),
            EventKind::FinishedWithFailure(cause) => write!(f, "failed: {cause}"),
            EventKind::Aborted(cause) => write!(f, "aborted: {cause}"),
            EventKind::Skipped(reason) => write!(f, "skipped: {reason}"),
        }
    }
}
