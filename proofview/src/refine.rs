//! The refinement primitive: the only way a goal gets a value

use crate::error::{ProofError, TacticError};
use crate::goal::{self, GoalView};
use crate::monad::{runtime_op, Tactic};
use crate::proofview::undefined;
use crate::solution::Solution;
use crate::term::Term;
use std::rc::Rc;
use tracing::{debug, trace};

type Refiner = Rc<dyn Fn(&GoalView, Solution) -> Result<(Solution, Term), TacticError>>;

/// Solve each focused goal with the term built by `f`.
///
/// `f` receives the goal and the current solution, and returns the solution
/// extended with any new goals the term mentions. Those new goals, in the
/// order they were declared, become the focus. Unless
/// [`crate::EngineLimits::unsafe_refine`] is set, each new goal's statement
/// must be a type and the term must have the goal's statement as type.
pub fn refine(
    f: impl Fn(&GoalView, Solution) -> Result<(Solution, Term), TacticError> + 'static,
) -> Tactic<()> {
    refine_with(Rc::new(f), false)
}

/// [`refine`] without type checking. The occurs check still applies.
pub fn refine_unchecked(
    f: impl Fn(&GoalView, Solution) -> Result<(Solution, Term), TacticError> + 'static,
) -> Tactic<()> {
    refine_with(Rc::new(f), true)
}

/// Close each focused goal with `term`
pub fn exact(term: Term) -> Tactic<()> {
    refine(move |_, sigma| Ok((sigma, term.clone())))
}

fn refine_with(f: Refiner, skip_checks: bool) -> Tactic<()> {
    goal::enter(move |view| refine_goal(view, f.clone(), skip_checks))
}

fn refine_goal(view: GoalView, f: Refiner, skip_checks: bool) -> Tactic<()> {
    runtime_op(move |rt, state| {
        let goal = view.id();
        let typecheck = !(skip_checks || rt.limits().unsafe_refine);

        let mut sigma = state.view.solution.clone();
        if !sigma.is_open(goal) {
            return Err(ProofError::Anomaly(format!(
                "refining {} which is not open",
                goal
            )));
        }
        sigma.push_future_goals();
        let refined = f(&view, sigma);
        let (mut sigma, term) = match refined {
            Ok(refined) => refined,
            Err(err) => return Ok(Err(err)),
        };
        let future = sigma.pop_future_goals();

        let checker = state.env.checker();
        if typecheck {
            for new_goal in &future.goals {
                let Some(info) = sigma.info(*new_goal) else {
                    continue;
                };
                if let Err(err) =
                    checker.infer_sort(&state.env, &sigma, &info.context, &info.statement)
                {
                    debug!(goal = %new_goal, error = %err, "new goal is not a type");
                    return Ok(Err(TacticError::TypeMismatch {
                        goal: *new_goal,
                        message: err.0,
                    }));
                }
            }
            if let Err(err) =
                checker.check(&state.env, &sigma, view.context(), &term, view.statement())
            {
                debug!(%goal, error = %err, "refinement does not have the goal's type");
                return Ok(Err(TacticError::TypeMismatch {
                    goal,
                    message: err.0,
                }));
            }
        }

        if checker.occurs(&sigma, goal, &term) {
            debug!(%goal, "occurs check failed");
            return Ok(Err(TacticError::OccursCheck(goal)));
        }

        if let Err(err) = sigma.solve(goal, term) {
            return Ok(Err(err));
        }
        if let Some(principal) = future.principal {
            sigma.transfer_name(goal, principal);
        }
        for new_goal in &future.goals {
            sigma.set_typeclass_candidate(*new_goal, false);
        }

        let comb = undefined(&sigma, &future.goals);
        let max_goals = rt.limits().max_goals;
        if comb.len() > max_goals {
            return Err(ProofError::ResourceLimitExceeded {
                limit_name: "max_goals".to_string(),
                limit_value: max_goals.to_string(),
                actual_value: comb.len().to_string(),
            });
        }
        trace!(%goal, new_goals = comb.len(), "refined");
        state.view.solution = sigma;
        state.view.comb = comb;
        Ok(Ok(()))
    })
}
