use serde::{Deserialize, Serialize};

/// Bounds applied to a single [`crate::Engine::apply`] run
///
/// Every limit is enforced at cooperative check points (each bind step and
/// each explicit interrupt check), never by preemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Wall-clock bound for the whole run in milliseconds
    /// None means unbounded
    pub max_tactic_time_ms: Option<u64>,

    /// Maximum number of bind steps before the run is aborted
    /// Guards against runaway backtracking search
    pub max_steps: Option<u64>,

    /// Maximum number of focused goals a refinement may produce
    pub max_goals: usize,

    /// Skip type checking in `refine` (the occurs check still runs)
    pub unsafe_refine: bool,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_tactic_time_ms: None,
            max_steps: None,
            max_goals: 10_000,
            unsafe_refine: false,
        }
    }
}

impl EngineLimits {
    /// Create a new EngineLimits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse limits from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
