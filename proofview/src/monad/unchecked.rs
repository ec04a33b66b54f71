//! Direct access to the proof state
//!
//! Nothing here maintains the comb invariant on its own. Callers setting the
//! comb are expected to pass open goals, or go through [`new_goals`], which
//! filters them.

use super::{state_op, Tactic};
use crate::proofview::{undefined, Proofview};
use crate::solution::Solution;
use crate::term::GoalId;

pub fn get_view() -> Tactic<Proofview> {
    state_op(|state| Ok(state.view.clone()))
}

pub fn set_view(view: Proofview) -> Tactic<()> {
    state_op(move |state| {
        state.view = view.clone();
        Ok(())
    })
}

/// The comb, as stored
pub fn get_goals() -> Tactic<Vec<GoalId>> {
    state_op(|state| Ok(state.view.comb.clone()))
}

/// Replace the comb without filtering
pub fn set_goals(goals: Vec<GoalId>) -> Tactic<()> {
    state_op(move |state| {
        state.view.comb = goals.clone();
        Ok(())
    })
}

/// Append goals to the end of the comb, dropping solved ones
pub fn new_goals(goals: Vec<GoalId>) -> Tactic<()> {
    state_op(move |state| {
        let mut comb = std::mem::take(&mut state.view.comb);
        comb.extend(goals.iter().copied());
        state.view.comb = undefined(&state.view.solution, &comb);
        Ok(())
    })
}

/// Replace the solution. The comb is advanced against the new one.
pub fn set_solution(sigma: Solution) -> Tactic<()> {
    state_op(move |state| {
        state.view.comb = undefined(&sigma, &state.view.comb);
        state.view.solution = sigma.clone();
        Ok(())
    })
}

pub fn get_shelf() -> Tactic<Vec<GoalId>> {
    state_op(|state| Ok(state.view.shelf.clone()))
}

pub fn set_shelf(shelf: Vec<GoalId>) -> Tactic<()> {
    state_op(move |state| {
        state.view.shelf = shelf.clone();
        Ok(())
    })
}
