//! Proof state: the solution plus the focused goals
//!
//! The comb is the ordered list of goals the next tactic operates on. Every
//! goal in it is open; anything that may have solved goals filters the comb
//! through [`advance`].

use crate::error::TacticError;
use crate::solution::{GoalInfo, Solution};
use crate::term::{Context, GoalId, Term};
use std::collections::HashSet;

/// Solution, focused goals and the side collections of goals removed from
/// focus without being solved
#[derive(Clone, Debug, Default)]
pub struct Proofview {
    pub(crate) solution: Solution,
    pub(crate) comb: Vec<GoalId>,
    pub(crate) shelf: Vec<GoalId>,
    pub(crate) given_up: Vec<GoalId>,
}

/// Placeholders standing for the goals created by [`init`], with their
/// statements, in creation order
#[derive(Clone, Debug, Default)]
pub struct Entry {
    items: Vec<(Term, Term)>,
}

impl Entry {
    pub fn iter(&self) -> impl Iterator<Item = &(Term, Term)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What `focus` removed from the comb, so `unfocus` can put it back
#[derive(Clone, Debug)]
pub struct FocusContext {
    before_rev: Vec<GoalId>,
    after: Vec<GoalId>,
}

/// Build a proofview with one fresh goal per `(context, statement)` pair
pub fn init(mut sigma: Solution, goals: Vec<(Context, Term)>) -> (Proofview, Entry) {
    let mut comb = Vec::with_capacity(goals.len());
    let mut items = Vec::with_capacity(goals.len());
    sigma.push_future_goals();
    for (context, statement) in goals {
        let id = sigma.new_goal(context, statement.clone(), None);
        comb.push(id);
        items.push((Term::goal(id), statement));
    }
    // initial goals are not pending classification
    sigma.pop_future_goals();
    let view = Proofview {
        solution: sigma,
        comb,
        shelf: Vec::new(),
        given_up: Vec::new(),
    };
    (view, Entry { items })
}

/// Resolve a possibly stale goal to the open goal it now stands for.
///
/// Returns the goal itself if open, follows goals solved by a bare
/// reference to another goal, and `None` once the chain ends in a value.
pub fn advance(sigma: &Solution, goal: GoalId) -> Option<GoalId> {
    let mut current = goal;
    let mut seen = HashSet::new();
    loop {
        if !seen.insert(current) {
            return None;
        }
        let info = sigma.info(current)?;
        match info.solution() {
            None => return Some(current),
            Some(term) => current = term.as_goal()?,
        }
    }
}

/// Advance every goal, dropping solved ones and duplicates, keeping order
pub fn undefined(sigma: &Solution, goals: &[GoalId]) -> Vec<GoalId> {
    let mut seen = HashSet::new();
    goals
        .iter()
        .filter_map(|goal| advance(sigma, *goal))
        .filter(|goal| seen.insert(*goal))
        .collect()
}

/// Narrow the comb to the goals at 1-indexed positions `first..=last`
pub fn focus(
    first: usize,
    last: usize,
    view: &Proofview,
) -> Result<(Proofview, FocusContext), TacticError> {
    let len = view.comb.len();
    if first < 1 || last < first || last > len {
        return Err(TacticError::IndexOutOfRange { first, last, len });
    }
    let mut before_rev = view.comb[..first - 1].to_vec();
    before_rev.reverse();
    let focused = view.comb[first - 1..last].to_vec();
    let after = view.comb[last..].to_vec();
    let narrowed = Proofview {
        comb: focused,
        ..view.clone()
    };
    Ok((narrowed, FocusContext { before_rev, after }))
}

/// Put the goals removed by [`focus`] back around the current comb
pub fn unfocus(context: &FocusContext, view: Proofview) -> Proofview {
    let mut comb: Vec<GoalId> = context.before_rev.iter().rev().copied().collect();
    comb.extend(view.comb.iter().copied());
    comb.extend(context.after.iter().copied());
    let comb = undefined(&view.solution, &comb);
    Proofview { comb, ..view }
}

impl Proofview {
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Focused goals, in order
    pub fn goals(&self) -> &[GoalId] {
        &self.comb
    }

    pub fn shelf(&self) -> &[GoalId] {
        &self.shelf
    }

    pub fn given_up(&self) -> &[GoalId] {
        &self.given_up
    }

    pub fn goal_info(&self, id: GoalId) -> Option<&GoalInfo> {
        self.solution.info(id)
    }

    /// No focused goals remain
    pub fn finished(&self) -> bool {
        self.comb.is_empty()
    }

    /// Entry terms with solved goals followed
    pub fn partial_proof(&self, entry: &Entry) -> Vec<Term> {
        entry
            .iter()
            .map(|(term, _)| self.solution.resolve(term))
            .collect()
    }

    /// The proof terms, provided no goal is left focused, shelved or given up
    pub fn return_proof(&self, entry: &Entry) -> Result<Vec<Term>, TacticError> {
        let remaining = undefined(&self.solution, &self.comb).len()
            + undefined(&self.solution, &self.shelf).len()
            + undefined(&self.solution, &self.given_up).len();
        if remaining > 0 {
            return Err(TacticError::UnsolvedGoals(remaining));
        }
        Ok(self.partial_proof(entry))
    }

    /// Something observable changed between `before` and `self`
    pub(crate) fn progressed_from(&self, before: &Proofview) -> bool {
        self.comb != before.comb
            || self.shelf != before.shelf
            || self.given_up != before.given_up
            || self.solution.len() != before.solution.len()
            || self.solution.solved_count() != before.solution.solved_count()
    }
}
