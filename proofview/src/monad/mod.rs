//! The logical monad
//!
//! A [`Tactic`] is a computation over the proof state that may succeed any
//! number of times. Running it yields a [`Reply`]: either a failure, or a
//! first success together with a continuation that produces the remaining
//! successes when a later step fails. Successes are pulled one at a time,
//! depth-first; nothing is computed before it is asked for.
//!
//! State (the proofview, environment, status and trace) is a value threaded
//! through binds, so backtracking to an earlier alternative restores the
//! state that alternative saw. Effects performed through [`runtime::Runtime`]
//! are never undone.

pub mod nonlogical;
pub mod runtime;
pub(crate) mod state;
pub mod unchecked;

use crate::environment::{Declaration, Environment};
use crate::error::{ProofError, TacticError};
use crate::solution::Solution;
use crate::ProofResult;
use nonlogical::NonLogical;
use runtime::Runtime;
use state::{LogicState, Status};
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info};

/// Produces the next successes of a computation, given the failure that
/// caused the backtrack
pub(crate) type Resume<A> = Rc<dyn Fn(&mut Runtime, TacticError) -> ProofResult<Reply<A>>>;

pub(crate) enum Reply<A> {
    Fail(TacticError),
    Next(A, LogicState, Resume<A>),
}

type Body<A> = dyn Fn(&mut Runtime, LogicState) -> ProofResult<Reply<A>>;

/// A backtracking computation over the proof state
pub struct Tactic<A> {
    body: Rc<Body<A>>,
}

impl<A> Clone for Tactic<A> {
    fn clone(&self) -> Self {
        Self {
            body: self.body.clone(),
        }
    }
}

/// Outcome of [`Tactic::case`]
#[derive(Clone)]
pub enum Case<A> {
    Fail(TacticError),
    Next(A, Continuation<A>),
}

/// The remaining successes of a computation inspected with
/// [`Tactic::case`]
pub struct Continuation<A> {
    resume: Resume<A>,
}

impl<A> Clone for Continuation<A> {
    fn clone(&self) -> Self {
        Self {
            resume: self.resume.clone(),
        }
    }
}

impl<A: Clone + 'static> Continuation<A> {
    /// Ask for the next success, reporting `err` as the reason for
    /// backtracking. Resumes from the state the inspected computation had
    /// reached, not from the current one.
    pub fn resume(&self, err: TacticError) -> Tactic<A> {
        let resume = self.resume.clone();
        Tactic::from_fn(move |rt, _| resume(rt, err.clone()))
    }
}

pub(crate) fn exhausted<A: 'static>() -> Resume<A> {
    Rc::new(|_: &mut Runtime, err: TacticError| Ok(Reply::Fail(err)))
}

/// All successes of `more`, then those of `rest`
fn chain<A: 'static>(more: Resume<A>, rest: Resume<A>) -> Resume<A> {
    Rc::new(move |rt: &mut Runtime, err: TacticError| match more(rt, err)? {
        Reply::Fail(err) => rest(rt, err),
        Reply::Next(value, state, resume) => {
            Ok(Reply::Next(value, state, chain(resume, rest.clone())))
        }
    })
}

/// All successes of `reply`, then those of `rest`
fn append<A: 'static>(
    rt: &mut Runtime,
    reply: Reply<A>,
    rest: Resume<A>,
) -> ProofResult<Reply<A>> {
    match reply {
        Reply::Fail(err) => rest(rt, err),
        Reply::Next(value, state, resume) => Ok(Reply::Next(value, state, chain(resume, rest))),
    }
}

/// Feed the successes of `reply` to `f` until one of them yields a success.
///
/// Alternatives that fail are skipped in a loop, so a long run of failing
/// alternatives does not grow the stack.
fn bind_reply<A: 'static, B: Clone + 'static>(
    rt: &mut Runtime,
    mut reply: Reply<A>,
    f: Rc<dyn Fn(A) -> Tactic<B>>,
) -> ProofResult<Reply<B>> {
    loop {
        let (value, state, resume) = match reply {
            Reply::Fail(err) => return Ok(Reply::Fail(err)),
            Reply::Next(value, state, resume) => (value, state, resume),
        };
        rt.check_interrupt()?;
        match f(value).run(rt, state)? {
            Reply::Fail(err) => reply = resume(rt, err)?,
            Reply::Next(value, state, more) => {
                let f = f.clone();
                let rest: Resume<B> = Rc::new(move |rt: &mut Runtime, err: TacticError| {
                    let next = resume(rt, err)?;
                    bind_reply(rt, next, f.clone())
                });
                return Ok(Reply::Next(value, state, chain(more, rest)));
            }
        }
    }
}

type MapFn<A, B> = Rc<dyn Fn(A, &mut LogicState) -> B>;

fn map_reply<A: 'static, B: 'static>(reply: Reply<A>, f: MapFn<A, B>) -> Reply<B> {
    match reply {
        Reply::Fail(err) => Reply::Fail(err),
        Reply::Next(value, mut state, resume) => {
            let mapped = f(value, &mut state);
            Reply::Next(
                mapped,
                state,
                Rc::new(move |rt: &mut Runtime, err: TacticError| {
                    Ok(map_reply(resume(rt, err)?, f.clone()))
                }),
            )
        }
    }
}

fn break_reply<A: 'static>(reply: Reply<A>, stop: Rc<dyn Fn(&TacticError) -> bool>) -> Reply<A> {
    match reply {
        Reply::Fail(err) => Reply::Fail(err),
        Reply::Next(value, state, resume) => Reply::Next(
            value,
            state,
            Rc::new(move |rt: &mut Runtime, err: TacticError| {
                if stop(&err) {
                    return Ok(Reply::Fail(err));
                }
                Ok(break_reply(resume(rt, err)?, stop.clone()))
            }),
        ),
    }
}

impl<A: Clone + 'static> Tactic<A> {
    pub(crate) fn from_fn(
        body: impl Fn(&mut Runtime, LogicState) -> ProofResult<Reply<A>> + 'static,
    ) -> Self {
        Self {
            body: Rc::new(body),
        }
    }

    pub(crate) fn run(&self, rt: &mut Runtime, state: LogicState) -> ProofResult<Reply<A>> {
        (self.body)(rt, state)
    }

    /// Exactly one success, state unchanged
    pub fn unit(value: A) -> Self {
        Self::from_fn(move |_, state| Ok(Reply::Next(value.clone(), state, exhausted())))
    }

    /// No success
    pub fn zero(err: TacticError) -> Self {
        Self::from_fn(move |_, _| Ok(Reply::Fail(err.clone())))
    }

    /// Every success of `self`, each followed by every success of `f`
    pub fn and_then<B: Clone + 'static>(self, f: impl Fn(A) -> Tactic<B> + 'static) -> Tactic<B> {
        let f: Rc<dyn Fn(A) -> Tactic<B>> = Rc::new(f);
        Tactic::from_fn(move |rt, state| {
            let reply = self.run(rt, state)?;
            bind_reply(rt, reply, f.clone())
        })
    }

    /// Sequence, discarding this computation's value
    pub fn then<B: Clone + 'static>(self, next: Tactic<B>) -> Tactic<B> {
        self.and_then(move |_| next.clone())
    }

    pub fn map<B: Clone + 'static>(self, f: impl Fn(A) -> B + 'static) -> Tactic<B> {
        let f: MapFn<A, B> = Rc::new(move |value: A, _: &mut LogicState| f(value));
        Tactic::from_fn(move |rt, state| Ok(map_reply(self.run(rt, state)?, f.clone())))
    }

    pub fn ignore(self) -> Tactic<()> {
        self.map(|_| ())
    }

    /// Backtracking choice: all successes of `self`, then, once they are
    /// exhausted, those of `handler` applied to the last failure. The handler
    /// starts from the state at the choice point.
    pub fn or(self, handler: impl Fn(TacticError) -> Tactic<A> + 'static) -> Self {
        let handler = Rc::new(handler);
        Self::from_fn(move |rt, state| {
            let saved = state.clone();
            let first = self.run(rt, state)?;
            let handler = handler.clone();
            let fallback: Resume<A> = Rc::new(move |rt: &mut Runtime, err: TacticError| {
                handler(err).run(rt, saved.clone())
            });
            append(rt, first, fallback)
        })
    }

    /// Try/fallback: `handler` runs only if `self` has no success at all.
    /// Once `self` succeeds this commits to that first success: a later
    /// failure reaches neither `self`'s other successes nor `handler`.
    pub fn or_else(self, handler: impl Fn(TacticError) -> Tactic<A> + 'static) -> Self {
        Self::from_fn(move |rt, state| {
            let saved = state.clone();
            match self.run(rt, state)? {
                Reply::Fail(err) => handler(err).run(rt, saved),
                Reply::Next(value, state, _) => Ok(Reply::Next(value, state, exhausted())),
            }
        })
    }

    /// Keep only the first success
    pub fn once(self) -> Self {
        Self::from_fn(move |rt, state| {
            Ok(match self.run(rt, state)? {
                Reply::Fail(err) => Reply::Fail(err),
                Reply::Next(value, state, _) => Reply::Next(value, state, exhausted()),
            })
        })
    }

    /// Like [`Tactic::once`], but fails with
    /// [`TacticError::MoreThanOneSuccess`] when a second success exists.
    /// `probe` is the failure reported to `self` when asking for it.
    pub fn exactly_once(self, probe: TacticError) -> Self {
        Self::from_fn(move |rt, state| {
            Ok(match self.run(rt, state)? {
                Reply::Fail(err) => Reply::Fail(err),
                Reply::Next(value, state, resume) => match resume(rt, probe.clone())? {
                    Reply::Fail(_) => Reply::Next(value, state, exhausted()),
                    Reply::Next(..) => Reply::Fail(TacticError::MoreThanOneSuccess),
                },
            })
        })
    }

    /// Run `on_success` on every success of `self`; if `self` has none, run
    /// `on_failure` instead. A later failure never reaches `on_failure`.
    pub fn if_catch<B: Clone + 'static>(
        self,
        on_success: impl Fn(A) -> Tactic<B> + 'static,
        on_failure: impl Fn(TacticError) -> Tactic<B> + 'static,
    ) -> Tactic<B> {
        let on_success: Rc<dyn Fn(A) -> Tactic<B>> = Rc::new(on_success);
        Tactic::from_fn(move |rt, state| {
            let saved = state.clone();
            match self.run(rt, state)? {
                Reply::Fail(err) => on_failure(err).run(rt, saved),
                next => bind_reply(rt, next, on_success.clone()),
            }
        })
    }

    /// Reify the first outcome without committing to it
    pub fn case(self) -> Tactic<Case<A>> {
        Tactic::from_fn(move |rt, state| {
            let saved = state.clone();
            Ok(match self.run(rt, state)? {
                Reply::Fail(err) => Reply::Next(Case::Fail(err), saved, exhausted()),
                Reply::Next(value, state, resume) => {
                    Reply::Next(Case::Next(value, Continuation { resume }), state, exhausted())
                }
            })
        })
    }

    /// Do not backtrack into `self` on failures matching `stop`
    pub fn break_on(self, stop: impl Fn(&TacticError) -> bool + 'static) -> Self {
        let stop: Rc<dyn Fn(&TacticError) -> bool> = Rc::new(stop);
        Self::from_fn(move |rt, state| Ok(break_reply(self.run(rt, state)?, stop.clone())))
    }

    /// Run a non-logical action. Its effects survive backtracking.
    pub fn lift(action: NonLogical<A>) -> Self {
        Self::from_fn(move |rt, state| {
            let value = action.run(rt)?;
            Ok(Reply::Next(value, state, exhausted()))
        })
    }

    /// Record successes of `self` under `label` in the trace
    pub fn tagged(self, label: impl Into<String>) -> Self {
        let label = label.into();
        let close: MapFn<A, A> = Rc::new(|value: A, state: &mut LogicState| {
            state.trace.leave();
            value
        });
        Self::from_fn(move |rt, mut state| {
            state.trace.enter(label.clone());
            Ok(map_reply(self.run(rt, state)?, close.clone()))
        })
    }

    /// Fail with [`TacticError::NoProgress`] on successes that left the
    /// proofview unchanged
    pub fn progress(self) -> Self {
        unchecked::get_view().and_then(move |initial| {
            self.clone().and_then(move |value| {
                let initial = initial.clone();
                unchecked::get_view().and_then(move |current| {
                    if current.progressed_from(&initial) {
                        Tactic::unit(value.clone())
                    } else {
                        Tactic::zero(TacticError::NoProgress)
                    }
                })
            })
        })
    }

    /// Log the time taken to reach the first outcome of `self`
    pub fn time(self, label: impl Into<String>) -> Self {
        let label = label.into();
        Self::from_fn(move |rt, state| {
            let started = Instant::now();
            let reply = self.run(rt, state)?;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            let outcome = match &reply {
                Reply::Fail(_) => "failure",
                Reply::Next(..) => "success",
            };
            info!(label = %label, elapsed_ms, outcome, "tactic timing");
            rt.message(format!("{}: {} after {:.3}ms", label, outcome, elapsed_ms));
            Ok(reply)
        })
    }

    /// First success of `self` within `limit_ms` of wall-clock time.
    ///
    /// On expiry this fails with [`TacticError::Timeout`] from the state at
    /// the call site; nothing `self` did to the proofview is kept. Expiry is
    /// only noticed at check points.
    pub fn timeout(self, limit_ms: u64) -> Self {
        Self::from_fn(move |rt, state| {
            rt.push_deadline(limit_ms);
            let result = self.run(rt, state);
            let expired = rt.pop_deadline();
            match result {
                Ok(Reply::Fail(err)) => Ok(Reply::Fail(err)),
                Ok(Reply::Next(value, state, _)) => Ok(Reply::Next(value, state, exhausted())),
                Err(ProofError::Timeout { .. }) if expired => {
                    debug!(limit_ms, "tactic timed out");
                    Ok(Reply::Fail(TacticError::Timeout { limit_ms }))
                }
                Err(err) => Err(err),
            }
        })
    }
}

/// Run `op` against the logical state; an error becomes a failure
pub(crate) fn state_op<A: Clone + 'static>(
    op: impl Fn(&mut LogicState) -> Result<A, TacticError> + 'static,
) -> Tactic<A> {
    Tactic::from_fn(move |_, mut state| {
        Ok(match op(&mut state) {
            Ok(value) => Reply::Next(value, state, exhausted()),
            Err(err) => Reply::Fail(err),
        })
    })
}

/// Run `op` against the runtime and the logical state
pub(crate) fn runtime_op<A: Clone + 'static>(
    op: impl Fn(&mut Runtime, &mut LogicState) -> ProofResult<Result<A, TacticError>> + 'static,
) -> Tactic<A> {
    Tactic::from_fn(move |rt, mut state| {
        Ok(match op(rt, &mut state)? {
            Ok(value) => Reply::Next(value, state, exhausted()),
            Err(err) => Reply::Fail(err),
        })
    })
}

/// The environment the tactic runs in
pub fn environment() -> Tactic<Environment> {
    state_op(|state| Ok(state.env.clone()))
}

/// The current solution
pub fn solution() -> Tactic<Solution> {
    state_op(|state| Ok(state.view.solution.clone()))
}

pub fn status() -> Tactic<Status> {
    state_op(|state| Ok(state.status))
}

/// Mark the current branch as unsafe for the rest of its run
pub fn mark_unsafe() -> Tactic<()> {
    state_op(|state| {
        state.status = state.status.merge(Status::Unsafe);
        Ok(())
    })
}

/// Add a leaf to the trace
pub fn record(label: impl Into<String>) -> Tactic<()> {
    let label = label.into();
    state_op(move |state| {
        state.trace.record(label.clone());
        Ok(())
    })
}

pub fn check_interrupt() -> Tactic<()> {
    Tactic::lift(NonLogical::check_interrupt())
}

pub fn print(msg: impl Into<String>) -> Tactic<()> {
    Tactic::lift(NonLogical::print(msg))
}

/// Record externally declared definitions as side effects of the proof and
/// make them visible to the rest of this run.
///
/// They reach an environment outside the tactic only through
/// [`Environment::emit_side_effects`].
pub fn emit_side_effects(declarations: Vec<Declaration>) -> Tactic<()> {
    state_op(move |state| {
        for declaration in &declarations {
            state.env.declare(declaration.clone());
        }
        state
            .view
            .solution
            .push_side_effects(declarations.iter().cloned());
        Ok(())
    })
}

/// First success among `tactics`, tried in order
pub fn first<A: Clone + 'static>(tactics: Vec<Tactic<A>>) -> Tactic<A> {
    let tactics: Rc<[Tactic<A>]> = tactics.into();
    first_from(tactics, 0, TacticError::failure("no applicable tactic"))
}

fn first_from<A: Clone + 'static>(
    tactics: Rc<[Tactic<A>]>,
    index: usize,
    last: TacticError,
) -> Tactic<A> {
    let Some(tactic) = tactics.get(index).cloned() else {
        return Tactic::zero(last);
    };
    tactic.or_else(move |err| first_from(tactics.clone(), index + 1, err))
}

/// Run `tactic` if it succeeds, otherwise do nothing
pub fn try_(tactic: Tactic<()>) -> Tactic<()> {
    tactic.or_else(|_| Tactic::unit(()))
}

/// Apply `tactic` until it fails or stops making progress.
///
/// Each round keeps only its first success, so the whole loop has exactly
/// one.
pub fn repeat(tactic: Tactic<()>) -> Tactic<()> {
    let step = tactic.progress().once();
    Tactic::from_fn(move |rt, mut state| loop {
        rt.check_interrupt()?;
        match step.run(rt, state.clone())? {
            Reply::Fail(_) => return Ok(Reply::Next((), state, exhausted())),
            Reply::Next((), next, _) => state = next,
        }
    })
}
