//! The discovered descriptor tree.
//!
//! Nodes live in an arena owned by [`DescriptorTree`]; parents and children refer to each other by
//! [`NodeIdx`]. A tree is assembled once through [`DescriptorTreeBuilder`] and is read-only afterwards:
//! execution only reports events against it.
//!
//! ## Invariants
//!
//! - Exactly one [`NodeKind::Engine`] node, at index 0.
//! - [`NodeKind::Test`] nodes never have children.
//! - Containers may be empty.
//! - Unique ids are unique within the tree.
//! - Children keep the order in which they were added.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::unique_id::UniqueId;

/// Index of a node inside the [`DescriptorTree`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Variant of a descriptor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NodeKind {
    Engine,
    Container,
    Test,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Engine => write!(f, "engine"),
            NodeKind::Container => write!(f, "container"),
            NodeKind::Test => write!(f, "test"),
        }
    }
}

/// Errors raised while assembling a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("test `{0}` cannot have children")]
    ChildOfTest(UniqueId),

    #[error("only the root may be an engine node (attempted under `{0}`)")]
    NestedEngine(UniqueId),

    #[error("node index {0} does not belong to this tree")]
    UnknownParent(usize),
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct TestDescriptor {
    unique_id: UniqueId,
    display_name: String,
    kind: NodeKind,
    legacy_id: Option<String>,
    parent: Option<NodeIdx>,
    children: Vec<NodeIdx>,
}

impl TestDescriptor {
    pub fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Identity of the legacy description this node was translated from.
    pub fn legacy_id(&self) -> Option<&str> {
        self.legacy_id.as_deref()
    }

    pub fn parent(&self) -> Option<NodeIdx> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIdx] {
        &self.children
    }

    pub fn is_test(&self) -> bool {
        self.kind == NodeKind::Test
    }

    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    /// A container that was discovered without anything inside it.
    pub fn is_empty_container(&self) -> bool {
        self.kind == NodeKind::Container && self.children.is_empty()
    }
}

/// Incrementally assembles a [`DescriptorTree`].
#[derive(Debug)]
pub struct DescriptorTreeBuilder {
    nodes: Vec<TestDescriptor>,
    ids: HashMap<UniqueId, NodeIdx>,
}

impl DescriptorTreeBuilder {
    /// Start a tree with its engine root.
    pub fn new(engine_id: &str, display_name: &str) -> Self {
        let root_id = UniqueId::for_engine(engine_id);
        let root = TestDescriptor {
            unique_id: root_id.clone(),
            display_name: display_name.to_string(),
            kind: NodeKind::Engine,
            legacy_id: None,
            parent: None,
            children: Vec::new(),
        };

        let mut ids = HashMap::new();
        ids.insert(root_id, NodeIdx(0));
        Self { nodes: vec![root], ids }
    }

    pub fn root(&self) -> NodeIdx {
        NodeIdx(0)
    }

    /// Append a child under `parent`.
    ///
    /// The child's id is the parent's id plus `[segment_kind:segment_value]`. When a sibling already
    /// took that id, the value gets an occurrence suffix (`#2`, `#3`, ...) so repeated legacy
    /// descriptions still map to distinct, reproducible ids.
    pub fn add_child(
        &mut self,
        parent: NodeIdx,
        kind: NodeKind,
        segment_kind: &str,
        segment_value: &str,
        display_name: &str,
        legacy_id: Option<&str>,
    ) -> Result<NodeIdx, TreeError> {
        let parent_node = self.nodes.get(parent.0).ok_or(TreeError::UnknownParent(parent.0))?;
        match (parent_node.kind, kind) {
            (NodeKind::Test, _) => return Err(TreeError::ChildOfTest(parent_node.unique_id.clone())),
            (_, NodeKind::Engine) => return Err(TreeError::NestedEngine(parent_node.unique_id.clone())),
            _ => {}
        }

        let mut unique_id = parent_node.unique_id.append(segment_kind, segment_value);
        let mut occurrence = 1;
        while self.ids.contains_key(&unique_id) {
            occurrence += 1;
            unique_id = parent_node
                .unique_id
                .append(segment_kind, format!("{segment_value}#{occurrence}"));
        }

        let idx = NodeIdx(self.nodes.len());
        self.nodes.push(TestDescriptor {
            unique_id: unique_id.clone(),
            display_name: display_name.to_string(),
            kind,
            legacy_id: legacy_id.map(str::to_string),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(idx);
        self.ids.insert(unique_id, idx);
        Ok(idx)
    }

    /// Freeze the tree.
    pub fn build(self) -> DescriptorTree {
        DescriptorTree {
            nodes: self.nodes,
            ids: self.ids,
        }
    }
}

/// Immutable descriptor tree produced by discovery.
#[derive(Debug, Clone)]
pub struct DescriptorTree {
    nodes: Vec<TestDescriptor>,
    ids: HashMap<UniqueId, NodeIdx>,
}

impl DescriptorTree {
    pub fn root(&self) -> NodeIdx {
        NodeIdx(0)
    }

    /// Look up a node.
    ///
    /// # Panics
    ///
    /// Panics if `idx` came from a different tree and is out of range.
    pub fn node(&self, idx: NodeIdx) -> &TestDescriptor {
        &self.nodes[idx.0]
    }

    pub fn get(&self, idx: NodeIdx) -> Option<&TestDescriptor> {
        self.nodes.get(idx.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A built tree holds at least its engine root, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, unique_id: &UniqueId) -> Option<NodeIdx> {
        self.ids.get(unique_id).copied()
    }

    pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.nodes[idx.0].children
    }

    pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.nodes[idx.0].parent
    }

    /// Ancestors of `idx`, root first, excluding `idx` itself.
    pub fn ancestors(&self, idx: NodeIdx) -> Vec<NodeIdx> {
        let mut chain = Vec::new();
        let mut current = self.parent(idx);
        while let Some(p) = current {
            chain.push(p);
            current = self.parent(p);
        }
        chain.reverse();
        chain
    }

    /// Unique ids of the enclosing nodes of `idx`, root first.
    pub fn path_ids(&self, idx: NodeIdx) -> Vec<UniqueId> {
        self.ancestors(idx)
            .into_iter()
            .map(|a| self.nodes[a.0].unique_id.clone())
            .collect()
    }

    /// Whether `ancestor` strictly encloses `idx`.
    pub fn is_ancestor_of(&self, ancestor: NodeIdx, idx: NodeIdx) -> bool {
        let mut current = self.parent(idx);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// `idx` and all its descendants in declared (pre-)order.
    pub fn preorder(&self, idx: NodeIdx) -> Vec<NodeIdx> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// All nodes in arena order, paired with their index.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &TestDescriptor)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIdx(i), n))
    }
}
