//! Discovery: legacy description trees → descriptor tree.
//!
//! Every requested class is handed to a [`RunnerResolver`]. Classes it does not recognise are left
//! out silently (a class path is full of non-test classes). For the rest, the runner's static
//! [`Description`] is translated node by node:
//!
//! - the runner's own description becomes a `runner` container under the engine root
//! - a description with children, or one declared as a suite, becomes a `suite` container
//! - anything else becomes a `test`
//!
//! The translation only looks at tree shape, so suites wrapping older suites and enclosed classes
//! need no special handling, and nesting depth is preserved. Each runner also gets an index from
//! legacy ids to the nodes built for them, which the bridge uses during execution.

use std::collections::HashMap;

use tracing::debug;
use vintage_core::{DescriptorTree, DescriptorTreeBuilder, NodeIdx, NodeKind};
use vintage_legacy::{Description, Runner, RunnerResolver};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Segment kind of the per-class container.
pub const RUNNER_SEGMENT: &str = "runner";
/// Segment kind of nested containers.
pub const SUITE_SEGMENT: &str = "suite";
/// Segment kind of tests.
pub const TEST_SEGMENT: &str = "test";

/// Legacy id → nodes translated from descriptions with that id, in discovery order.
pub(crate) type DescriptionIndex = HashMap<String, Vec<NodeIdx>>;

/// Which classes to discover, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryRequest {
    classes: Vec<String>,
}

impl DiscoveryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_class(class_name: impl Into<String>) -> Self {
        Self::new().with_class(class_name)
    }

    pub fn for_classes<I, S>(class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: class_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.classes.push(class_name.into());
        self
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// One discovered class: its container node, its runner, and its description index.
pub struct RunnerEntry {
    pub(crate) node: NodeIdx,
    pub(crate) class_name: String,
    pub(crate) description: Description,
    pub(crate) runner: Box<dyn Runner>,
    pub(crate) index: DescriptionIndex,
}

impl RunnerEntry {
    pub fn node(&self) -> NodeIdx {
        self.node
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn description(&self) -> &Description {
        &self.description
    }
}

impl std::fmt::Debug for RunnerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerEntry")
            .field("node", &self.node)
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}

/// Result of discovery: the frozen tree plus what execution needs to drive it.
#[derive(Debug)]
pub struct EngineDescriptor {
    pub(crate) tree: DescriptorTree,
    pub(crate) runners: Vec<RunnerEntry>,
}

impl EngineDescriptor {
    pub fn tree(&self) -> &DescriptorTree {
        &self.tree
    }

    pub fn runners(&self) -> &[RunnerEntry] {
        &self.runners
    }
}

/// Discover `request` through `resolver`.
#[tracing::instrument(skip_all, fields(class_count = request.classes().len()))]
pub fn discover(
    request: &DiscoveryRequest,
    resolver: &dyn RunnerResolver,
    config: &EngineConfig,
) -> Result<EngineDescriptor, EngineError> {
    let mut builder = DescriptorTreeBuilder::new(&config.engine_id, &config.display_name);
    let mut runners = Vec::new();

    for class_name in request.classes() {
        let Some(runner) = resolver.resolve(class_name) else {
            debug!(class = %class_name, "not a legacy test class, skipping");
            continue;
        };

        let description = runner.description();
        let mut index = DescriptionIndex::new();
        let node = builder.add_child(
            builder.root(),
            NodeKind::Container,
            RUNNER_SEGMENT,
            class_name,
            description.display_name(),
            Some(description.unique_id()),
        )?;
        index.entry(description.unique_id().to_string()).or_default().push(node);
        translate_children(&mut builder, node, &description, &mut index)?;

        debug!(class = %class_name, tests = description.test_count(), "discovered legacy class");
        runners.push(RunnerEntry {
            node,
            class_name: class_name.clone(),
            description,
            runner,
            index,
        });
    }

    Ok(EngineDescriptor {
        tree: builder.build(),
        runners,
    })
}

fn translate_children(
    builder: &mut DescriptorTreeBuilder,
    parent: NodeIdx,
    description: &Description,
    index: &mut DescriptionIndex,
) -> Result<(), EngineError> {
    for child in description.children() {
        let idx = if child.is_test() {
            builder.add_child(
                parent,
                NodeKind::Test,
                TEST_SEGMENT,
                child.unique_id(),
                child.method_name().unwrap_or(child.display_name()),
                Some(child.unique_id()),
            )?
        } else {
            builder.add_child(
                parent,
                NodeKind::Container,
                SUITE_SEGMENT,
                child.unique_id(),
                child.display_name(),
                Some(child.unique_id()),
            )?
        };
        index.entry(child.unique_id().to_string()).or_default().push(idx);

        if child.is_suite() {
            translate_children(builder, idx, child, index)?;
        }
    }
    Ok(())
}
