//! The solution: every goal ever created and what is known about it

use crate::environment::Declaration;
use crate::error::TacticError;
use crate::term::{Context, GoalId, Term};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Whether a goal still needs a value
#[derive(Clone, Debug)]
pub enum GoalBody {
    Open,
    Solved(Term),
}

/// Everything the solution records about one goal
#[derive(Clone, Debug)]
pub struct GoalInfo {
    pub context: Context,
    pub statement: Term,
    pub body: GoalBody,
    /// User-facing name, if any
    pub name: Option<String>,
    /// Whether typeclass resolution may try to solve this goal
    pub typeclass_candidate: bool,
}

impl GoalInfo {
    pub fn is_open(&self) -> bool {
        matches!(self.body, GoalBody::Open)
    }

    pub fn solution(&self) -> Option<&Term> {
        match &self.body {
            GoalBody::Open => None,
            GoalBody::Solved(term) => Some(term),
        }
    }
}

/// Goals declared since the last `push_future_goals`
#[derive(Clone, Debug, Default)]
pub struct FutureGoals {
    pub goals: Vec<GoalId>,
    /// The new goal that inherits the refined goal's name
    pub principal: Option<GoalId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum UniverseRelation {
    Lt,
    Le,
    Eq,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UniverseConstraint {
    pub left: String,
    pub relation: UniverseRelation,
    pub right: String,
}

/// Store mapping goal identifiers to open or solved.
///
/// Solved entries are never erased. Cloning is cheap: the goal table is
/// shared until the next mutation, and entries stay shared after it.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    goals: Arc<BTreeMap<GoalId, Arc<GoalInfo>>>,
    next_id: u32,
    future: FutureGoals,
    future_stack: Vec<FutureGoals>,
    universes: BTreeSet<UniverseConstraint>,
    side_effects: Vec<Declaration>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a fresh open goal. It is recorded as a future goal.
    pub fn new_goal(&mut self, context: Context, statement: Term, name: Option<String>) -> GoalId {
        let id = GoalId(self.next_id);
        self.next_id += 1;
        Arc::make_mut(&mut self.goals).insert(
            id,
            Arc::new(GoalInfo {
                context,
                statement,
                body: GoalBody::Open,
                name,
                typeclass_candidate: true,
            }),
        );
        self.future.goals.push(id);
        id
    }

    /// Mark a future goal as the one inheriting the refined goal's name
    pub fn set_principal(&mut self, id: GoalId) {
        self.future.principal = Some(id);
    }

    pub fn info(&self, id: GoalId) -> Option<&GoalInfo> {
        self.goals.get(&id).map(Arc::as_ref)
    }

    fn info_mut(&mut self, id: GoalId) -> Option<&mut GoalInfo> {
        Arc::make_mut(&mut self.goals).get_mut(&id).map(Arc::make_mut)
    }

    pub fn contains(&self, id: GoalId) -> bool {
        self.goals.contains_key(&id)
    }

    pub fn is_open(&self, id: GoalId) -> bool {
        self.info(id).is_some_and(GoalInfo::is_open)
    }

    /// Number of goals ever created
    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn open_goals(&self) -> impl Iterator<Item = GoalId> + '_ {
        self.goals
            .iter()
            .filter(|(_, info)| info.is_open())
            .map(|(id, _)| *id)
    }

    pub fn solved_count(&self) -> usize {
        self.goals.values().filter(|info| !info.is_open()).count()
    }

    /// Assign a value to an open goal
    pub fn solve(&mut self, id: GoalId, term: Term) -> Result<(), TacticError> {
        match self.info(id) {
            None => return Err(TacticError::NoSuchGoal(id)),
            Some(info) if !info.is_open() => return Err(TacticError::NotOpen(id)),
            Some(_) => {}
        }
        let info = self.info_mut(id).ok_or(TacticError::NoSuchGoal(id))?;
        info.body = GoalBody::Solved(term);
        Ok(())
    }

    /// Replace an open goal by a fresh one over a smaller context.
    ///
    /// The old goal is solved by a bare reference to the new one, so
    /// [`crate::advance`] redirects to it.
    pub fn restrict(
        &mut self,
        id: GoalId,
        keep: impl Fn(&crate::term::Hypothesis) -> bool,
    ) -> Result<GoalId, TacticError> {
        let info = self.info(id).ok_or(TacticError::NoSuchGoal(id))?.clone();
        if !info.is_open() {
            return Err(TacticError::NotOpen(id));
        }
        let fresh = self.new_goal(info.context.restrict(keep), info.statement, None);
        // not a subgoal of anything being refined right now
        self.future.goals.retain(|g| *g != fresh);
        self.solve(id, Term::goal(fresh))?;
        self.transfer_name(id, fresh);
        Ok(fresh)
    }

    pub fn name(&self, id: GoalId) -> Option<&str> {
        self.info(id).and_then(|info| info.name.as_deref())
    }

    /// Name shown to users: the goal's name or its identifier
    pub fn display_name(&self, id: GoalId) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// Open goal carrying the given name
    pub fn find_by_name(&self, name: &str) -> Option<GoalId> {
        self.goals
            .iter()
            .find(|(_, info)| info.is_open() && info.name.as_deref() == Some(name))
            .map(|(id, _)| *id)
    }

    pub fn rename(&mut self, id: GoalId, name: impl Into<String>) -> Result<(), TacticError> {
        let info = self.info_mut(id).ok_or(TacticError::NoSuchGoal(id))?;
        info.name = Some(name.into());
        Ok(())
    }

    /// Move the name of `from` onto `to`
    pub(crate) fn transfer_name(&mut self, from: GoalId, to: GoalId) {
        if self.name(from).is_none() || !self.contains(to) {
            return;
        }
        let name = self.info_mut(from).and_then(|info| info.name.take());
        if let (Some(name), Some(info)) = (name, self.info_mut(to)) {
            info.name = Some(name);
        }
    }

    pub fn set_typeclass_candidate(&mut self, id: GoalId, candidate: bool) {
        if self.info(id).is_some_and(|info| info.typeclass_candidate != candidate) {
            if let Some(info) = self.info_mut(id) {
                info.typeclass_candidate = candidate;
            }
        }
    }

    /// Save the pending future goals and start an empty set
    pub fn push_future_goals(&mut self) {
        let saved = std::mem::take(&mut self.future);
        self.future_stack.push(saved);
    }

    /// Return the goals declared since the matching push and restore the
    /// previously pending ones
    pub fn pop_future_goals(&mut self) -> FutureGoals {
        let restored = self.future_stack.pop().unwrap_or_default();
        std::mem::replace(&mut self.future, restored)
    }

    pub fn future_goals(&self) -> &[GoalId] {
        &self.future.goals
    }

    /// Follow a bare goal reference through solved goals
    pub fn resolve(&self, term: &Term) -> Term {
        let mut current = term.clone();
        let mut seen = BTreeSet::new();
        while let Some(id) = current.as_goal() {
            if !seen.insert(id) {
                break;
            }
            match self.info(id).and_then(GoalInfo::solution) {
                Some(next) => current = next.clone(),
                None => break,
            }
        }
        current
    }

    /// Open goals reachable from `term`, instantiating solved goals
    pub fn open_goals_of(&self, term: &Term) -> BTreeSet<GoalId> {
        let mut found = BTreeSet::new();
        let mut seen = BTreeSet::new();
        self.collect_open(term.goals(), &mut seen, &mut found);
        found
    }

    /// Open goals the definition of `id` depends on: its hypotheses, its
    /// statement and, when solved, its value
    pub fn open_goals_of_goal(&self, id: GoalId) -> BTreeSet<GoalId> {
        let mut found = BTreeSet::new();
        let Some(info) = self.info(id) else {
            return found;
        };
        let mut roots = info.context.goals();
        roots.extend(info.statement.goals());
        if let Some(term) = info.solution() {
            roots.extend(term.goals());
        }
        let mut seen = BTreeSet::new();
        seen.insert(id);
        self.collect_open(roots, &mut seen, &mut found);
        found
    }

    fn collect_open(
        &self,
        mut stack: Vec<GoalId>,
        seen: &mut BTreeSet<GoalId>,
        found: &mut BTreeSet<GoalId>,
    ) {
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            match self.info(id).map(|info| &info.body) {
                Some(GoalBody::Open) => {
                    found.insert(id);
                }
                Some(GoalBody::Solved(term)) => stack.extend(term.goals()),
                None => {}
            }
        }
    }

    /// `goal` occurs in `term` up to instantiation of solved goals
    pub fn occurs(&self, goal: GoalId, term: &Term) -> bool {
        let mut stack = term.goals();
        let mut seen = BTreeSet::new();
        while let Some(id) = stack.pop() {
            if id == goal {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(value) = self.info(id).and_then(GoalInfo::solution) {
                stack.extend(value.goals());
            }
        }
        false
    }

    pub fn add_universe_constraint(&mut self, constraint: UniverseConstraint) {
        self.universes.insert(constraint);
    }

    pub fn universe_constraints(&self) -> impl Iterator<Item = &UniverseConstraint> {
        self.universes.iter()
    }

    /// Record irreversible global declarations produced by a tactic
    pub fn push_side_effects(&mut self, declarations: impl IntoIterator<Item = Declaration>) {
        for declaration in declarations {
            let duplicate = self
                .side_effects
                .iter()
                .any(|existing| existing.name == declaration.name);
            if !duplicate {
                self.side_effects.push(declaration);
            }
        }
    }

    pub fn side_effects(&self) -> &[Declaration] {
        &self.side_effects
    }
}
