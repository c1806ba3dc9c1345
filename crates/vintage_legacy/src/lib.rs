//! The legacy runner protocol, as seen by the vintage engine.
//!
//! A legacy runner describes its tests up front as a static [`Description`] tree and then, when run,
//! pushes flat notifications (`test_started`, `test_failure`, `test_ignored`, ...) to every
//! [`RunListener`] registered on the [`RunNotifier`] it was handed. Nothing in the notifications
//! says where a suite begins or ends; consumers have to infer that from the description tree.
//!
//! ## Modules
//!
//! - [`description`]: static description trees
//! - [`notification`]: failures, the listener callbacks and the notifier fanning them out
//! - [`runner`]: the runner and resolver traits the engine drives
//! - [`scripted`]: a deterministic in-memory runner used to exercise the engine

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod description;
pub mod notification;
pub mod runner;
pub mod scripted;

pub use description::Description;
pub use notification::{Failure, RunListener, RunNotifier};
pub use runner::{Runner, RunnerError, RunnerResolver};
