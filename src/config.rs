//! Engine configuration.
//!
//! Defaults follow the platform conventions for a legacy-compatibility engine.

/// Engine id used in every unique id's leading segment.
pub const DEFAULT_ENGINE_ID: &str = "junit-vintage";

/// Display name of the engine root node.
pub const DEFAULT_DISPLAY_NAME: &str = "JUnit Vintage";

/// Reason reported for ignored tests; the legacy protocol does not carry one.
pub const DEFAULT_SKIP_REASON: &str = "<unknown>";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Value of the `[engine:...]` segment
    pub engine_id: String,
    /// Display name of the engine root
    pub display_name: String,
    /// Reason attached to every `skipped` event
    pub default_skip_reason: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_id: DEFAULT_ENGINE_ID.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            default_skip_reason: DEFAULT_SKIP_REASON.to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine id
    pub fn with_engine_id(mut self, engine_id: impl Into<String>) -> Self {
        self.engine_id = engine_id.into();
        self
    }

    /// Set the engine root's display name
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the reason reported for ignored tests
    pub fn with_default_skip_reason(mut self, reason: impl Into<String>) -> Self {
        self.default_skip_reason = reason.into();
        self
    }
}
