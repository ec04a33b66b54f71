//! # Proofview Engine
//!
//! **A backtracking tactic runtime for proof states**
//!
//! The engine manages the open obligations (goals) of a proof in progress
//! and runs tactics against them. Tactics are values of the logical monad
//! [`Tactic`]: they may fail, succeed once, or succeed several times, and a
//! later failure backtracks into the alternatives an earlier step left open.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use proofview::{dispatch, init, refine, Context, Engine, Environment, ProofResult, Solution, Term};
//!
//! fn main() -> ProofResult<()> {
//!     # let (prop, witness_a, witness_b): (Term, Term, Term) = unimplemented!();
//!     let engine = Engine::new(Environment::default());
//!     let (view, entry) = init(
//!         Solution::new(),
//!         vec![(Context::new(), prop.clone()), (Context::new(), prop)],
//!     );
//!
//!     // Solve the first goal with one witness and the second with another
//!     let tactic = dispatch(vec![
//!         refine(move |_, sigma| Ok((sigma, witness_a.clone()))),
//!         refine(move |_, sigma| Ok((sigma, witness_b.clone()))),
//!     ]);
//!     let applied = engine.apply(&tactic, view)?;
//!
//!     assert!(applied.proofview.finished());
//!     let proof = applied.proofview.return_proof(&entry)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Goals and the comb
//! Every goal lives in a [`Solution`], open or solved. The comb is the
//! ordered list of open goals the next tactic works on; shelved and
//! given-up goals sit beside it.
//!
//! ### Two monads
//! [`Tactic`] threads the proof state and backtracks. [`NonLogical`]
//! performs effects that survive backtracking: messages, interrupt checks
//! and deadlines.
//!
//! ### Terms
//! Terms and typing are supplied by the caller through [`TermRepr`] and
//! [`Checker`]. The engine only ever looks at which goals a term mentions.

pub mod engine;
pub mod environment;
pub mod error;
pub mod goal;
pub mod goals;
pub mod limits;
pub mod monad;
pub mod proofview;
pub mod refine;
pub mod solution;
pub mod tacticals;
pub mod term;
pub mod trace;

pub use engine::{apply, Applied, Engine};
pub use environment::{Checker, Declaration, Environment, TrustingChecker, TypeError};
pub use error::{ProofError, TacticError};
pub use goal::{enter, enter_one, GoalView};
pub use goals::{
    cycle, give_up, given_up, guard_no_unifiable, reverse, shelve, shelve_unifiable, swap,
    unifiable_partition, unshelve, unshelve_all, with_shelf,
};
pub use limits::EngineLimits;
pub use monad::nonlogical::NonLogical;
pub use monad::runtime::Runtime;
pub use monad::state::Status;
pub use monad::{
    check_interrupt, emit_side_effects, environment, first, mark_unsafe, print, record, repeat,
    solution, status, try_, Case, Continuation, Tactic,
};
pub use proofview::{advance, init, undefined, Entry, FocusContext, Proofview};
pub use refine::{exact, refine, refine_unchecked};
pub use solution::{FutureGoals, GoalBody, GoalInfo, Solution, UniverseConstraint, UniverseRelation};
pub use tacticals::{
    dispatch, dispatch_with_results, extend, focus, focus_by_id, focus_by_name, independent,
    num_goals, try_focus,
};
pub use term::{Context, GoalId, Hypothesis, Term, TermRepr};
pub use trace::{Trace, TraceNode};

/// Result type for engine operations
pub type ProofResult<T> = Result<T, ProofError>;

#[cfg(test)]
mod tests;
