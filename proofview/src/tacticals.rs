//! Focusing and per-goal dispatch

use crate::error::TacticError;
use crate::monad::runtime::Runtime;
use crate::monad::state::LogicState;
use crate::monad::{state_op, unchecked, Reply, Resume, Tactic};
use crate::proofview::{self, advance, undefined};
use crate::term::GoalId;
use crate::ProofResult;
use std::rc::Rc;
use tracing::{debug, trace};

/// Run `tactic` on the goals at 1-indexed positions `first..=last`, then put
/// the remaining goals back around whatever it left focused
pub fn focus<A: Clone + 'static>(first: usize, last: usize, tactic: Tactic<A>) -> Tactic<A> {
    state_op(move |state| {
        let (narrowed, context) = proofview::focus(first, last, &state.view)?;
        trace!(first, last, "focus");
        state.view = narrowed;
        Ok(context)
    })
    .and_then(move |context| {
        tactic.clone().and_then(move |value| {
            let context = context.clone();
            state_op(move |state| {
                let view = std::mem::take(&mut state.view);
                state.view = proofview::unfocus(&context, view);
                Ok(value.clone())
            })
        })
    })
}

/// Like [`focus`], but a range starting past the last goal does nothing and
/// `last` is clamped to the number of goals
pub fn try_focus(first: usize, last: usize, tactic: Tactic<()>) -> Tactic<()> {
    unchecked::get_goals().and_then(move |comb| {
        let len = comb.len();
        if first < 1 || last < first || first > len {
            Tactic::unit(())
        } else {
            focus(first, last.min(len), tactic.clone())
        }
    })
}

/// Run `tactic` with `goal` alone in focus.
///
/// A focused goal is narrowed to in place. A goal that exists but is not
/// focused (a shelved one, say) is run on by itself, after which the
/// previous focus comes back exactly as it was.
pub fn focus_by_id<A: Clone + 'static>(goal: GoalId, tactic: Tactic<A>) -> Tactic<A> {
    state_op(move |state| {
        let sigma = &state.view.solution;
        if !sigma.contains(goal) {
            return Err(TacticError::NoSuchGoal(goal));
        }
        let current = advance(sigma, goal).ok_or(TacticError::NotOpen(goal))?;
        let position = state.view.comb.iter().position(|g| *g == current);
        Ok((current, position))
    })
    .and_then(move |(current, position)| match position {
        Some(index) => focus(index + 1, index + 1, tactic.clone()),
        None => {
            let tactic = tactic.clone();
            unchecked::get_goals().and_then(move |original| {
                trace!(goal = %current, "focus on unfocused goal");
                unchecked::set_goals(vec![current])
                    .then(tactic.clone())
                    .and_then(move |value| {
                        unchecked::set_goals(original.clone()).map(move |_| value.clone())
                    })
            })
        }
    })
}

/// [`focus_by_id`] on the open goal carrying `name`
pub fn focus_by_name<A: Clone + 'static>(
    name: impl Into<String>,
    tactic: Tactic<A>,
) -> Tactic<A> {
    let name = name.into();
    state_op(move |state| {
        state
            .view
            .solution
            .find_by_name(&name)
            .ok_or_else(|| TacticError::UnknownGoalName(name.clone()))
    })
    .and_then(move |goal| focus_by_id(goal, tactic.clone()))
}

pub fn num_goals() -> Tactic<usize> {
    unchecked::get_goals().map(|comb| comb.len())
}

type Step<B> = Rc<dyn Fn(usize, GoalId) -> Tactic<B>>;

/// Run `step` on every focused goal in turn, each alone in focus, and focus
/// the concatenation of what each run left focused.
///
/// Goals solved by an earlier step are skipped; their step never runs.
/// The goals are walked in a loop and backtracking pops an explicit frame
/// stack, so the number of goals does not bound the stack depth.
pub(crate) fn fold_goals<B: Clone + 'static>(step: Step<B>) -> Tactic<Vec<B>> {
    Tactic::from_fn(move |rt, state| {
        let fold = Fold {
            step: step.clone(),
            goals: state.view.comb.clone().into(),
            frames: Vec::new(),
            reached: Vec::new(),
            values: Vec::new(),
        };
        fold.drive(rt, Move::Forward(0, state))
    })
}

/// A step that succeeded and can still be asked for its next success
struct Frame<B> {
    index: usize,
    resume: Resume<B>,
    /// Length of `reached` before the step ran
    reached_len: usize,
}

impl<B> Clone for Frame<B> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            resume: self.resume.clone(),
            reached_len: self.reached_len,
        }
    }
}

enum Move {
    Forward(usize, LogicState),
    Back(TacticError),
}

struct Fold<B> {
    step: Step<B>,
    goals: Rc<[GoalId]>,
    frames: Vec<Frame<B>>,
    /// Goals left focused by the steps that ran, in order
    reached: Vec<GoalId>,
    /// One value per frame
    values: Vec<B>,
}

impl<B> Clone for Fold<B>
where
    B: Clone,
{
    fn clone(&self) -> Self {
        Self {
            step: self.step.clone(),
            goals: self.goals.clone(),
            frames: self.frames.clone(),
            reached: self.reached.clone(),
            values: self.values.clone(),
        }
    }
}

impl<B: Clone + 'static> Fold<B> {
    fn push(&mut self, index: usize, value: B, state: &LogicState, resume: Resume<B>) {
        self.frames.push(Frame {
            index,
            resume,
            reached_len: self.reached.len(),
        });
        self.reached.extend(state.view.comb.iter().copied());
        self.values.push(value);
    }

    fn drive(mut self, rt: &mut Runtime, mut next: Move) -> ProofResult<Reply<Vec<B>>> {
        loop {
            next = match next {
                Move::Back(err) => {
                    let Some(frame) = self.frames.pop() else {
                        return Ok(Reply::Fail(err));
                    };
                    self.reached.truncate(frame.reached_len);
                    self.values.truncate(self.frames.len());
                    match (frame.resume)(rt, err)? {
                        Reply::Fail(err) => Move::Back(err),
                        Reply::Next(value, state, resume) => {
                            self.push(frame.index, value, &state, resume);
                            Move::Forward(frame.index + 1, state)
                        }
                    }
                }
                Move::Forward(index, mut state) => {
                    let Some(goal) = self.goals.get(index).copied() else {
                        state.view.comb = undefined(&state.view.solution, &self.reached);
                        let values = self.values.clone();
                        let resume: Resume<Vec<B>> =
                            Rc::new(move |rt: &mut Runtime, err: TacticError| {
                                self.clone().drive(rt, Move::Back(err))
                            });
                        return Ok(Reply::Next(values, state, resume));
                    };
                    match advance(&state.view.solution, goal) {
                        None => {
                            trace!(%goal, "skipping goal solved by an earlier step");
                            Move::Forward(index + 1, state)
                        }
                        Some(current) => {
                            state.view.comb = vec![current];
                            rt.check_interrupt()?;
                            match (self.step)(index, current).run(rt, state)? {
                                Reply::Fail(err) => Move::Back(err),
                                Reply::Next(value, state, resume) => {
                                    self.push(index, value, &state, resume);
                                    Move::Forward(index + 1, state)
                                }
                            }
                        }
                    }
                }
            };
        }
    }
}

/// Check that `tactics` has one entry per focused goal
fn check_sizes(expected: usize, actual: usize) -> Result<(), TacticError> {
    if expected == actual {
        return Ok(());
    }
    debug!(expected, actual, "dispatch size mismatch");
    Err(TacticError::SizeMismatch { expected, actual })
}

/// Run the i-th tactic on the i-th focused goal. The new focus is the
/// concatenation, in goal order, of the goals each tactic left focused.
pub fn dispatch(tactics: Vec<Tactic<()>>) -> Tactic<()> {
    dispatch_with_results(tactics).ignore()
}

/// [`dispatch`], returning each tactic's value in goal order
pub fn dispatch_with_results<A: Clone + 'static>(tactics: Vec<Tactic<A>>) -> Tactic<Vec<A>> {
    let tactics: Rc<[Tactic<A>]> = tactics.into();
    unchecked::get_goals().and_then(move |comb| {
        if let Err(err) = check_sizes(comb.len(), tactics.len()) {
            return Tactic::zero(err);
        }
        match tactics.len() {
            0 => Tactic::unit(Vec::new()),
            1 => tactics[0].clone().map(|value| vec![value]),
            _ => {
                let tactics = tactics.clone();
                fold_goals(Rc::new(move |index: usize, _: GoalId| tactics[index].clone()))
            }
        }
    })
}

/// [`dispatch`] with `prefix` on the first goals, `suffix` on the last ones
/// and `repeated` on every goal in between
pub fn extend(
    prefix: Vec<Tactic<()>>,
    repeated: Tactic<()>,
    suffix: Vec<Tactic<()>>,
) -> Tactic<()> {
    unchecked::get_goals().and_then(move |comb| {
        let fixed = prefix.len() + suffix.len();
        if fixed > comb.len() {
            debug!(goals = comb.len(), fixed, "extend size mismatch");
            return Tactic::zero(TacticError::SizeMismatch {
                expected: comb.len(),
                actual: fixed,
            });
        }
        let mut tactics = prefix.clone();
        tactics.extend(std::iter::repeat(repeated.clone()).take(comb.len() - fixed));
        tactics.extend(suffix.iter().cloned());
        dispatch(tactics)
    })
}

/// Run `tactic` on each focused goal separately
pub fn independent(tactic: Tactic<()>) -> Tactic<()> {
    unchecked::get_goals().and_then(move |comb| match comb.len() {
        0 => Tactic::unit(()),
        1 => tactic.clone(),
        _ => extend(Vec::new(), tactic.clone(), Vec::new()),
    })
}
