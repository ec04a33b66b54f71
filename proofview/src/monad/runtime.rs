//! Non-backtracking runtime state
//!
//! Everything here survives backtracking: interrupt polling, wall-clock
//! deadlines, the step budget and console messages.

use crate::error::ProofError;
use crate::EngineLimits;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

struct Deadline {
    started: Instant,
    limit_ms: u64,
}

impl Deadline {
    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn expired(&self) -> bool {
        self.elapsed_ms() >= self.limit_ms
    }
}

/// State threaded through every monadic step without being undone on
/// backtrack
pub struct Runtime {
    interrupt: Arc<AtomicBool>,
    deadlines: Vec<Deadline>,
    steps: u64,
    limits: EngineLimits,
    messages: Vec<String>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(EngineLimits::default())
    }
}

impl Runtime {
    pub fn new(limits: EngineLimits) -> Self {
        Self {
            interrupt: Arc::new(AtomicBool::new(false)),
            deadlines: Vec::new(),
            steps: 0,
            limits,
            messages: Vec::new(),
        }
    }

    /// Poll `flag` at every check point
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Bind steps taken so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Cooperative check point: counts a step, then aborts on interrupt,
    /// exhausted step budget or an expired deadline
    pub fn check_interrupt(&mut self) -> Result<(), ProofError> {
        self.steps += 1;

        if self.interrupt.swap(false, Ordering::SeqCst) {
            warn!(steps = self.steps, "interrupt requested");
            return Err(ProofError::Interrupted);
        }

        if let Some(max_steps) = self.limits.max_steps {
            if self.steps > max_steps {
                return Err(ProofError::ResourceLimitExceeded {
                    limit_name: "max_steps".to_string(),
                    limit_value: max_steps.to_string(),
                    actual_value: self.steps.to_string(),
                });
            }
        }

        if let Some(deadline) = self.deadlines.iter().find(|d| d.expired()) {
            let elapsed_ms = deadline.elapsed_ms();
            debug!(limit_ms = deadline.limit_ms, elapsed_ms, "deadline expired");
            return Err(ProofError::Timeout {
                limit_ms: deadline.limit_ms,
                elapsed_ms,
            });
        }

        Ok(())
    }

    pub(crate) fn push_deadline(&mut self, limit_ms: u64) {
        self.deadlines.push(Deadline {
            started: Instant::now(),
            limit_ms,
        });
    }

    /// Remove the innermost deadline, reporting whether it had expired
    pub(crate) fn pop_deadline(&mut self) -> bool {
        self.deadlines.pop().is_some_and(|d| d.expired())
    }

    /// Emit a console message
    pub fn message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        info!(target: "proofview::messages", "{}", msg);
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}
