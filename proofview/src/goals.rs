//! Moving goals in and out of focus without solving them

use crate::error::TacticError;
use crate::monad::state::Status;
use crate::monad::{state_op, Tactic};
use crate::proofview::undefined;
use crate::solution::Solution;
use crate::term::GoalId;
use std::collections::BTreeSet;
use tracing::debug;

/// Move every focused goal to the shelf
pub fn shelve() -> Tactic<()> {
    state_op(|state| {
        let comb = std::mem::take(&mut state.view.comb);
        debug!(goals = comb.len(), "shelve");
        state.view.shelf.extend(comb);
        state.trace.record("shelve");
        Ok(())
    })
}

/// Split `goals` into those some other goal in `goals` depends on, and the
/// rest. Both keep the order of `goals`.
pub fn unifiable_partition(sigma: &Solution, goals: &[GoalId]) -> (Vec<GoalId>, Vec<GoalId>) {
    let mut dependencies = BTreeSet::new();
    for goal in goals {
        dependencies.extend(sigma.open_goals_of_goal(*goal));
    }
    goals
        .iter()
        .copied()
        .partition(|goal| dependencies.contains(goal))
}

/// Shelve the focused goals that another focused goal depends on
pub fn shelve_unifiable() -> Tactic<()> {
    state_op(|state| {
        let (unifiable, rest) = unifiable_partition(&state.view.solution, &state.view.comb);
        debug!(shelved = unifiable.len(), "shelve unifiable");
        state.view.comb = rest;
        state.view.shelf.extend(unifiable);
        state.trace.record("shelve_unifiable");
        Ok(())
    })
}

/// Fail with [`TacticError::UnresolvedBindings`] if a focused goal depends
/// on another focused goal
pub fn guard_no_unifiable() -> Tactic<()> {
    state_op(|state| {
        let sigma = &state.view.solution;
        let (unifiable, _) = unifiable_partition(sigma, &state.view.comb);
        if unifiable.is_empty() {
            return Ok(());
        }
        let names = unifiable.iter().map(|goal| sigma.display_name(*goal)).collect();
        Err(TacticError::UnresolvedBindings(names))
    })
}

/// Append the open ones among `goals` to the focus and take them off the
/// shelf
pub fn unshelve(goals: Vec<GoalId>) -> Tactic<()> {
    state_op(move |state| {
        let sigma = &state.view.solution;
        let added = undefined(sigma, &goals);
        state
            .view
            .shelf
            .retain(|shelved| !goals.contains(shelved) && !added.contains(shelved));
        let mut comb = std::mem::take(&mut state.view.comb);
        comb.extend(added);
        state.view.comb = undefined(sigma, &comb);
        Ok(())
    })
}

/// Bring the whole shelf back into focus, after the focused goals
pub fn unshelve_all() -> Tactic<()> {
    state_op(|state| Ok(state.view.shelf.clone())).and_then(unshelve)
}

/// Run `tactic` against an empty shelf and return, with its value, the open
/// goals it shelved. The previous shelf is restored afterwards.
pub fn with_shelf<A: Clone + 'static>(tactic: Tactic<A>) -> Tactic<(Vec<GoalId>, A)> {
    state_op(|state| Ok(std::mem::take(&mut state.view.shelf))).and_then(move |previous| {
        tactic.clone().and_then(move |value| {
            let previous = previous.clone();
            state_op(move |state| {
                let shelved = std::mem::replace(&mut state.view.shelf, previous.clone());
                Ok((undefined(&state.view.solution, &shelved), value.clone()))
            })
        })
    })
}

/// Abandon every focused goal. The branch is unsafe from here on.
pub fn give_up() -> Tactic<()> {
    state_op(|state| {
        let comb = std::mem::take(&mut state.view.comb);
        debug!(goals = comb.len(), "give up");
        state.view.given_up.extend(comb);
        state.trace.record("give_up");
        state.status = state.status.merge(Status::Unsafe);
        Ok(())
    })
}

/// Goals abandoned so far that are still open
pub fn given_up() -> Tactic<Vec<GoalId>> {
    state_op(|state| Ok(undefined(&state.view.solution, &state.view.given_up)))
}

/// Rotate the focus left by `n`; negative `n` rotates right
pub fn cycle(n: isize) -> Tactic<()> {
    state_op(move |state| {
        let comb = &mut state.view.comb;
        if !comb.is_empty() {
            let shift = n.rem_euclid(comb.len() as isize) as usize;
            comb.rotate_left(shift);
        }
        state.trace.record(format!("cycle {}", n));
        Ok(())
    })
}

/// Normalize a 1-indexed position, negative ones counting from the end
fn position(index: isize, len: usize) -> usize {
    let index = if index > 0 { index - 1 } else { index };
    index.rem_euclid(len as isize) as usize
}

/// Exchange the focused goals at positions `i` and `j`
pub fn swap(i: isize, j: isize) -> Tactic<()> {
    state_op(move |state| {
        let comb = &mut state.view.comb;
        if !comb.is_empty() {
            let len = comb.len();
            comb.swap(position(i, len), position(j, len));
        }
        state.trace.record(format!("swap {} {}", i, j));
        Ok(())
    })
}

pub fn reverse() -> Tactic<()> {
    state_op(|state| {
        state.view.comb.reverse();
        state.trace.record("reverse");
        Ok(())
    })
}
