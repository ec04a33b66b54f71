use crate::environment::Environment;
use crate::proofview::Proofview;
use crate::trace::Trace;
use serde::Serialize;

/// Whether the proof built so far can be trusted.
///
/// Monotone: once a branch is unsafe it stays unsafe.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Safe,
    Unsafe,
}

impl Status {
    pub fn is_safe(self) -> bool {
        self == Status::Safe
    }

    /// Unsafe if either side is
    pub fn merge(self, other: Status) -> Status {
        if self.is_safe() && other.is_safe() {
            Status::Safe
        } else {
            Status::Unsafe
        }
    }
}

/// Everything threaded through binds and undone on backtrack
#[derive(Clone, Debug)]
pub(crate) struct LogicState {
    pub view: Proofview,
    pub env: Environment,
    pub status: Status,
    pub trace: Trace,
}

impl LogicState {
    pub fn new(env: Environment, view: Proofview) -> Self {
        Self {
            view,
            env,
            status: Status::Safe,
            trace: Trace::new(),
        }
    }
}
