#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
//! Vintage: legacy notification-based test runners, executed as an event-stream test engine.
//!
//! A legacy runner describes its tests once, as a static description tree, and then reports what
//! happens through flat callbacks. This crate adapts that model to an engine whose listeners see a
//! strictly nested stream of `started` / `finished` / `skipped` events over a discovered tree.
//!
//! - **Discovery** ([`discovery`]): description trees → descriptor tree with stable ids
//! - **Execution** ([`engine`]): drives each runner with a [`NotificationBridge`] attached
//! - **Bridge** ([`bridge`]): legacy callbacks → ordered execution events
//!
//! ## Panic Policy
//!
//! Library code never panics on legacy runner behaviour. Per-test problems become events, and
//! problems with the run as a whole become the engine root's failure. `.unwrap()` and `.expect()`
//! are denied outside tests.
//!
//! ## Examples
//! ```rust
//! use vintage::testing::{EventRecorder, render};
//! use vintage::{DiscoveryRequest, VintageTestEngine};
//! use vintage::legacy::scripted::{Outcome, ScriptedRegistry, ScriptedRunner, ScriptedSuite};
//!
//! let registry = ScriptedRegistry::new().with(ScriptedRunner::new(
//!     ScriptedSuite::class("com.example.FooTest").test("ok", Outcome::Pass),
//! ));
//! let mut recorder = EventRecorder::new();
//! let summary = VintageTestEngine::new().run(
//!     &DiscoveryRequest::for_class("com.example.FooTest"),
//!     &registry,
//!     &mut recorder,
//! );
//!
//! assert!(summary.is_successful());
//! assert_eq!(recorder.events().len(), 6);
//! assert!(render(recorder.events()).starts_with("engine:JUnit Vintage started"));
//! ```

pub mod bridge;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod testing;

pub use vintage_core as platform;
pub use vintage_legacy as legacy;

pub use bridge::{BridgeState, NotificationBridge, UNFINISHED_TEST_MESSAGE};
pub use config::EngineConfig;
pub use discovery::{DiscoveryRequest, EngineDescriptor, RunnerEntry, discover};
pub use engine::{ExecutionRequest, ExecutionSummary, VintageTestEngine};
pub use error::EngineError;
