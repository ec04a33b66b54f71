use crate::environment::Environment;
use crate::error::ProofError;
use crate::monad::runtime::Runtime;
use crate::monad::state::{LogicState, Status};
use crate::monad::{Reply, Tactic};
use crate::proofview::Proofview;
use crate::trace::Trace;
use crate::{EngineLimits, ProofResult};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct Applied<A> {
    pub value: A,
    pub proofview: Proofview,
    pub status: Status,
    pub trace: Trace,
    /// Console messages printed during the run, including by branches that
    /// were later backtracked over
    pub messages: Vec<String>,
}

/// The tactic engine.
///
/// Runs tactics against proofviews in a fixed environment, under the
/// configured limits.
pub struct Engine {
    env: Environment,
    limits: EngineLimits,
    interrupt: Arc<AtomicBool>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

impl Engine {
    pub fn new(env: Environment) -> Self {
        Self::with_limits(env, EngineLimits::default())
    }

    /// Create an engine with custom limits
    pub fn with_limits(env: Environment, limits: EngineLimits) -> Self {
        Self {
            env,
            limits,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Poll `flag` instead of the engine's own interrupt flag
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Setting the returned flag aborts the current run at its next check
    /// point with [`ProofError::Interrupted`]
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// Run `tactic` on `proofview` and keep its first success.
    ///
    /// A tactic with no success is reported as [`ProofError::Failed`].
    pub fn apply<A: Clone + 'static>(
        &self,
        tactic: &Tactic<A>,
        proofview: Proofview,
    ) -> ProofResult<Applied<A>> {
        let mut rt = Runtime::new(self.limits.clone()).with_interrupt(self.interrupt.clone());
        debug!(goals = proofview.goals().len(), "applying tactic");

        let deadline = self.limits.max_tactic_time_ms;
        if let Some(limit_ms) = deadline {
            rt.push_deadline(limit_ms);
        }
        let state = LogicState::new(self.env.clone(), proofview);
        let result = tactic.run(&mut rt, state);
        if deadline.is_some() {
            rt.pop_deadline();
        }

        match result {
            Ok(Reply::Next(value, state, _)) => {
                debug!(
                    goals = state.view.goals().len(),
                    steps = rt.steps(),
                    safe = state.status.is_safe(),
                    "tactic applied"
                );
                Ok(Applied {
                    value,
                    proofview: state.view,
                    status: state.status,
                    trace: state.trace,
                    messages: rt.take_messages(),
                })
            }
            Ok(Reply::Fail(err)) => {
                debug!(error = %err, steps = rt.steps(), "tactic failed");
                Err(ProofError::Failed(err))
            }
            Err(err) => {
                debug!(error = %err, steps = rt.steps(), "tactic aborted");
                Err(err)
            }
        }
    }
}

/// Run `tactic` on `proofview` in `env` with default limits
pub fn apply<A: Clone + 'static>(
    env: &Environment,
    tactic: &Tactic<A>,
    proofview: Proofview,
) -> ProofResult<Applied<A>> {
    Engine::new(env.clone()).apply(tactic, proofview)
}
