use crate::term::GoalId;
use thiserror::Error;

/// Reasons a tactic produced no success.
///
/// These are ordinary, backtrackable failures: they live inside the logical
/// monad and any combinator may recover from them via `or`, `or_else` or
/// `case`. They only become caller-visible at [`crate::Engine::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TacticError {
    /// Generic failure with an opaque reason
    #[error("{message}")]
    Failure { message: String, level: u32 },

    /// Focus range outside the focused goals
    #[error("no such goals: range {first}..={last} is outside 1..={len}")]
    IndexOutOfRange {
        first: usize,
        last: usize,
        len: usize,
    },

    /// Per-goal tactic list does not match the focused goals
    #[error("incorrect number of goals (expected {expected} tactics, was given {actual})")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("no such goal: {0}")]
    NoSuchGoal(GoalId),

    #[error("no goal named '{0}'")]
    UnknownGoalName(String),

    /// Attempt to assign a goal that already has a value
    #[error("goal {0} is already solved")]
    NotOpen(GoalId),

    /// Refinement rejected by the typing collaborator
    #[error("ill-typed refinement of {goal}: {message}")]
    TypeMismatch { goal: GoalId, message: String },

    /// Refinement would make a goal depend on itself
    #[error("occurs check failed: {0} appears in its own solution")]
    OccursCheck(GoalId),

    #[error("unable to find an instance for {}", .0.join(", "))]
    UnresolvedBindings(Vec<String>),

    #[error("tactic has more than one success")]
    MoreThanOneSuccess,

    #[error("failed to progress")]
    NoProgress,

    /// A `timeout` attempt ran out of time
    #[error("timeout after {limit_ms}ms")]
    Timeout { limit_ms: u64 },

    #[error("{0} goal(s) remain unsolved")]
    UnsolvedGoals(usize),
}

impl TacticError {
    /// Create a level-0 failure with the given message
    pub fn failure(message: impl Into<String>) -> Self {
        TacticError::Failure {
            message: message.into(),
            level: 0,
        }
    }

    /// Create a failure that survives `level` enclosing `break_on` handlers
    pub fn failure_at(level: u32, message: impl Into<String>) -> Self {
        TacticError::Failure {
            message: message.into(),
            level,
        }
    }

    /// Failure level, 0 for everything except leveled [`TacticError::Failure`]s
    pub fn level(&self) -> u32 {
        match self {
            TacticError::Failure { level, .. } => *level,
            _ => 0,
        }
    }
}

/// Errors that escape the logical monad.
///
/// Everything but [`ProofError::Failed`] is raised by the non-logical layer
/// and bypasses backtracking entirely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    /// The top-level tactic had zero successes
    #[error("tactic failed: {0}")]
    Failed(TacticError),

    /// A wall-clock bound expired at a cooperative check point
    #[error("timeout: exceeded {limit_ms}ms (elapsed {elapsed_ms}ms)")]
    Timeout { limit_ms: u64, elapsed_ms: u64 },

    /// The external interrupt flag was raised
    #[error("interrupted")]
    Interrupted,

    #[error("resource limit exceeded: {limit_name} (limit {limit_value}, actual {actual_value})")]
    ResourceLimitExceeded {
        limit_name: String,
        limit_value: String,
        actual_value: String,
    },

    /// Internal invariant violation
    #[error("anomaly: {0}")]
    Anomaly(String),
}

impl ProofError {
    /// Timeouts and interrupts abort; callers usually special-case them
    pub fn is_asynchronous(&self) -> bool {
        matches!(self, ProofError::Timeout { .. } | ProofError::Interrupted)
    }
}

impl From<TacticError> for ProofError {
    fn from(err: TacticError) -> Self {
        ProofError::Failed(err)
    }
}
