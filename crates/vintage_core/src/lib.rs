//! Shared platform vocabulary for the vintage test engine.
//!
//! This crate is dependency-light and holds the pieces both the engine and its listeners agree on:
//!
//! - [`unique_id`]: stable, segment-based identities for discovered nodes
//! - [`descriptor`]: the immutable descriptor tree (engine root, containers, tests)
//! - [`event`]: execution events and the [`ExecutionListener`] sink trait
//!
//! ## Notes
//! - Nothing here knows about the legacy runner protocol; that lives in `vintage_legacy`.
//! - Enable the `serde` feature to serialize ids, causes and recorded events.
//!
//! ## Examples
//! ```rust
//! use vintage_core::descriptor::{DescriptorTreeBuilder, NodeKind};
//!
//! let mut builder = DescriptorTreeBuilder::new("junit-vintage", "JUnit Vintage");
//! let class = builder
//!     .add_child(builder.root(), NodeKind::Container, "runner", "com.example.FooTest", "com.example.FooTest", None)
//!     .unwrap();
//! builder
//!     .add_child(class, NodeKind::Test, "test", "ok(com.example.FooTest)", "ok", None)
//!     .unwrap();
//! let tree = builder.build();
//! assert_eq!(tree.len(), 3);
//! ```

#![forbid(unsafe_code)]

pub mod descriptor;
pub mod event;
pub mod unique_id;

pub use descriptor::{DescriptorTree, DescriptorTreeBuilder, NodeIdx, NodeKind, TestDescriptor, TreeError};
pub use event::{Cause, EventKind, EventTarget, ExecutionEvent, ExecutionListener};
pub use unique_id::{Segment, UniqueId, UniqueIdError};
