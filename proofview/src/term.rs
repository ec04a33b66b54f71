//! Opaque terms and local contexts
//!
//! The engine never inspects the structure of a term. The inference
//! collaborator supplies terms through [`TermRepr`]; the engine only asks
//! which goals a term mentions and whether a term is a bare goal reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Key of a metavariable standing for a goal.
///
/// Assigned once by the [`crate::Solution`] that created the goal and never
/// reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoalId(pub u32);

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?X{}", self.0)
    }
}

/// Term representation provided by the term calculus.
pub trait TermRepr: fmt::Debug + fmt::Display + Send + Sync {
    /// Goals mentioned by the term, in occurrence order. Duplicates allowed.
    fn goals(&self) -> Vec<GoalId>;
}

/// A term as seen by the engine: either a direct reference to a goal or an
/// opaque value built by the term calculus.
#[derive(Clone, Debug)]
pub enum Term {
    Goal(GoalId),
    Opaque(Arc<dyn TermRepr>),
}

impl Term {
    pub fn goal(id: GoalId) -> Self {
        Term::Goal(id)
    }

    pub fn opaque(repr: impl TermRepr + 'static) -> Self {
        Term::Opaque(Arc::new(repr))
    }

    /// The goal this term is, when it is nothing but a goal reference
    pub fn as_goal(&self) -> Option<GoalId> {
        match self {
            Term::Goal(id) => Some(*id),
            Term::Opaque(_) => None,
        }
    }

    /// Goals mentioned syntactically, without following solved goals
    pub fn goals(&self) -> Vec<GoalId> {
        match self {
            Term::Goal(id) => vec![*id],
            Term::Opaque(repr) => repr.goals(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Goal(id) => write!(f, "{}", id),
            Term::Opaque(repr) => write!(f, "{}", repr),
        }
    }
}

/// A named local assumption, optionally with a definition
#[derive(Clone, Debug)]
pub struct Hypothesis {
    pub name: String,
    pub ty: Term,
    pub body: Option<Term>,
}

impl Hypothesis {
    pub fn assume(name: impl Into<String>, ty: Term) -> Self {
        Self {
            name: name.into(),
            ty,
            body: None,
        }
    }

    pub fn define(name: impl Into<String>, ty: Term, body: Term) -> Self {
        Self {
            name: name.into(),
            ty,
            body: Some(body),
        }
    }
}

/// Hypotheses available to a goal, oldest first
#[derive(Clone, Debug, Default)]
pub struct Context {
    hyps: Vec<Hypothesis>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hyp: Hypothesis) -> Self {
        self.hyps.push(hyp);
        self
    }

    pub fn push(&mut self, hyp: Hypothesis) {
        self.hyps.push(hyp);
    }

    /// Innermost hypothesis with the given name
    pub fn lookup(&self, name: &str) -> Option<&Hypothesis> {
        self.hyps.iter().rev().find(|h| h.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hypothesis> {
        self.hyps.iter()
    }

    pub fn len(&self) -> usize {
        self.hyps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hyps.is_empty()
    }

    /// Keep only the hypotheses satisfying `keep`
    pub fn restrict(&self, keep: impl Fn(&Hypothesis) -> bool) -> Self {
        Self {
            hyps: self.hyps.iter().filter(|h| keep(h)).cloned().collect(),
        }
    }

    /// Goals mentioned by any hypothesis type or body
    pub fn goals(&self) -> Vec<GoalId> {
        self.hyps
            .iter()
            .flat_map(|h| {
                let mut goals = h.ty.goals();
                if let Some(body) = &h.body {
                    goals.extend(body.goals());
                }
                goals
            })
            .collect()
    }
}
