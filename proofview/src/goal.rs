//! Per-goal access for client tactics

use crate::environment::Environment;
use crate::error::TacticError;
use crate::monad::state::LogicState;
use crate::monad::{state_op, unchecked, Tactic};
use crate::solution::Solution;
use crate::tacticals::fold_goals;
use crate::term::{Context, GoalId, Term};
use std::rc::Rc;

/// Read-only snapshot of one focused goal, taken when the goal was entered
#[derive(Clone, Debug)]
pub struct GoalView {
    id: GoalId,
    context: Context,
    statement: Term,
    env: Environment,
    solution: Solution,
}

impl GoalView {
    pub(crate) fn capture(state: &LogicState, id: GoalId) -> Result<Self, TacticError> {
        let info = state
            .view
            .solution
            .info(id)
            .ok_or(TacticError::NoSuchGoal(id))?;
        Ok(Self {
            id,
            context: info.context.clone(),
            statement: info.statement.clone(),
            env: state.env.clone(),
            solution: state.view.solution.clone(),
        })
    }

    pub fn id(&self) -> GoalId {
        self.id
    }

    /// The goal's hypotheses
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The type to inhabit
    pub fn statement(&self) -> &Term {
        &self.statement
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn name(&self) -> Option<&str> {
        self.solution.name(self.id)
    }
}

fn view_of(goal: GoalId) -> Tactic<GoalView> {
    state_op(move |state| GoalView::capture(state, goal))
}

/// Run `f` on each focused goal, alone in focus. The new focus is the
/// concatenation of what each run left focused, as with
/// [`crate::dispatch`].
pub fn enter(f: impl Fn(GoalView) -> Tactic<()> + 'static) -> Tactic<()> {
    let f: Rc<dyn Fn(GoalView) -> Tactic<()>> = Rc::new(f);
    fold_goals(Rc::new(move |_: usize, goal: GoalId| {
        let f = f.clone();
        view_of(goal).and_then(move |view| f(view))
    }))
    .ignore()
}

/// Run `f` on the single focused goal. Fails with
/// [`TacticError::SizeMismatch`] unless exactly one goal is focused.
pub fn enter_one<A: Clone + 'static>(f: impl Fn(GoalView) -> Tactic<A> + 'static) -> Tactic<A> {
    let f: Rc<dyn Fn(GoalView) -> Tactic<A>> = Rc::new(f);
    unchecked::get_goals().and_then(move |comb| match comb.as_slice() {
        [goal] => {
            let f = f.clone();
            view_of(*goal).and_then(move |view| f(view))
        }
        _ => Tactic::zero(TacticError::SizeMismatch {
            expected: 1,
            actual: comb.len(),
        }),
    })
}

/// Views of the focused goals, in order
pub fn goals() -> Tactic<Vec<GoalView>> {
    state_op(|state| {
        let state: &LogicState = state;
        state
            .view
            .comb
            .iter()
            .map(|goal| GoalView::capture(state, *goal))
            .collect()
    })
}
