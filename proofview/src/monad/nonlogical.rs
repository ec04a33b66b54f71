//! Side-effecting computations without backtracking
//!
//! A [`NonLogical`] runs exactly once per invocation. Errors raised here are
//! never retried: they propagate to the nearest [`NonLogical::catch`] or to
//! the caller of [`NonLogical::run`]. Interrupts and timeouts skip `catch`.

use super::runtime::Runtime;
use crate::error::ProofError;
use crate::ProofResult;
use std::rc::Rc;
use tracing::debug;

type Action<A> = dyn Fn(&mut Runtime) -> ProofResult<A>;

pub struct NonLogical<A> {
    action: Rc<Action<A>>,
}

impl<A> Clone for NonLogical<A> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
        }
    }
}

impl<A: Clone + 'static> NonLogical<A> {
    pub fn new(action: impl Fn(&mut Runtime) -> ProofResult<A> + 'static) -> Self {
        Self {
            action: Rc::new(action),
        }
    }

    pub fn ret(value: A) -> Self {
        Self::new(move |_| Ok(value.clone()))
    }

    pub fn raise(err: ProofError) -> Self {
        Self::new(move |_| Err(err.clone()))
    }

    pub fn and_then<B: Clone + 'static>(
        self,
        next: impl Fn(A) -> NonLogical<B> + 'static,
    ) -> NonLogical<B> {
        NonLogical::new(move |rt| {
            let value = (self.action)(rt)?;
            next(value).run(rt)
        })
    }

    pub fn map<B: Clone + 'static>(self, f: impl Fn(A) -> B + 'static) -> NonLogical<B> {
        NonLogical::new(move |rt| (self.action)(rt).map(&f))
    }

    /// Run `handler` if this computation raises.
    ///
    /// Interrupts and timeouts are not handed to `handler`: they always
    /// reach the caller.
    pub fn catch(self, handler: impl Fn(ProofError) -> NonLogical<A> + 'static) -> Self {
        Self::new(move |rt| match (self.action)(rt) {
            Ok(value) => Ok(value),
            Err(err) if err.is_asynchronous() => Err(err),
            Err(err) => handler(err).run(rt),
        })
    }

    /// Race this computation against a wall-clock bound.
    ///
    /// The bound is observed at check points only; a computation that never
    /// reaches one runs to completion.
    pub fn timeout(self, limit_ms: u64) -> Self {
        Self::new(move |rt| {
            rt.push_deadline(limit_ms);
            let result = (self.action)(rt);
            if rt.pop_deadline() {
                debug!(limit_ms, "non-logical computation exceeded its deadline");
            }
            result
        })
    }

    pub fn run(&self, rt: &mut Runtime) -> ProofResult<A> {
        (self.action)(rt)
    }
}

impl NonLogical<()> {
    /// Poll the interrupt flag, deadlines and step budget
    pub fn check_interrupt() -> Self {
        Self::new(|rt| rt.check_interrupt())
    }

    pub fn print(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self::new(move |rt| {
            rt.message(msg.clone());
            Ok(())
        })
    }
}
