//! Global environment and the typing collaborator

use crate::solution::Solution;
use crate::term::{Context, GoalId, Term};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Rejection reported by a [`Checker`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TypeError(pub String);

/// Typing judgments consumed by the engine.
///
/// Implemented by the term calculus; the engine calls it during safe
/// refinement and never interprets terms itself.
pub trait Checker: Send + Sync {
    /// `term` has type `expected` in `ctx`
    fn check(
        &self,
        env: &Environment,
        sigma: &Solution,
        ctx: &Context,
        term: &Term,
        expected: &Term,
    ) -> Result<(), TypeError>;

    /// `ty` is a type, i.e. its sort can be inferred in `ctx`
    fn infer_sort(
        &self,
        env: &Environment,
        sigma: &Solution,
        ctx: &Context,
        ty: &Term,
    ) -> Result<(), TypeError>;

    /// `goal` occurs in `term` once solved goals are instantiated
    fn occurs(&self, sigma: &Solution, goal: GoalId, term: &Term) -> bool {
        sigma.occurs(goal, term)
    }
}

/// Accepts every judgment. Refinement in safe mode then reduces to the
/// occurs check.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrustingChecker;

impl Checker for TrustingChecker {
    fn check(
        &self,
        _env: &Environment,
        _sigma: &Solution,
        _ctx: &Context,
        _term: &Term,
        _expected: &Term,
    ) -> Result<(), TypeError> {
        Ok(())
    }

    fn infer_sort(
        &self,
        _env: &Environment,
        _sigma: &Solution,
        _ctx: &Context,
        _ty: &Term,
    ) -> Result<(), TypeError> {
        Ok(())
    }
}

/// A global constant: a statement and, for definitions, a body
#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: String,
    pub ty: Term,
    pub body: Option<Term>,
}

impl Declaration {
    pub fn axiom(name: impl Into<String>, ty: Term) -> Self {
        Self {
            name: name.into(),
            ty,
            body: None,
        }
    }

    pub fn definition(name: impl Into<String>, ty: Term, body: Term) -> Self {
        Self {
            name: name.into(),
            ty,
            body: Some(body),
        }
    }
}

/// Global declarations plus the checker used to validate refinements.
///
/// Cheap to clone; declarations are shared until modified.
#[derive(Clone)]
pub struct Environment {
    declarations: Arc<BTreeMap<String, Declaration>>,
    checker: Arc<dyn Checker>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(TrustingChecker)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("declarations", &self.declarations.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Environment {
    pub fn new(checker: impl Checker + 'static) -> Self {
        Self {
            declarations: Arc::new(BTreeMap::new()),
            checker: Arc::new(checker),
        }
    }

    pub fn checker(&self) -> &dyn Checker {
        self.checker.as_ref()
    }

    /// Add or replace a global declaration
    pub fn declare(&mut self, declaration: Declaration) {
        Arc::make_mut(&mut self.declarations).insert(declaration.name.clone(), declaration);
    }

    pub fn lookup(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    /// A new environment extended with the side effects recorded in `sigma`.
    ///
    /// This is the only way declarations produced inside a tactic become
    /// visible outside of it.
    pub fn emit_side_effects(&self, sigma: &Solution) -> Self {
        let mut env = self.clone();
        for declaration in sigma.side_effects() {
            env.declare(declaration.clone());
        }
        env
    }
}
