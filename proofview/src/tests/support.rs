use crate::monad::runtime::Runtime;
use crate::monad::state::LogicState;
use crate::monad::Reply;
use crate::{
    apply, init, refine, Applied, Checker, Context, Environment, GoalId, Proofview, ProofError,
    Solution, Tactic, TacticError, Term, TermRepr, TypeError,
};
use std::fmt;

/// A constant applied to arguments
#[derive(Debug)]
pub struct Sym {
    pub head: String,
    pub args: Vec<Term>,
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for arg in &self.args {
            write!(f, " ({})", arg)?;
        }
        Ok(())
    }
}

impl TermRepr for Sym {
    fn goals(&self) -> Vec<GoalId> {
        self.args.iter().flat_map(Term::goals).collect()
    }
}

pub fn atom(head: &str) -> Term {
    app(head, Vec::new())
}

pub fn app(head: &str, args: Vec<Term>) -> Term {
    Term::opaque(Sym {
        head: head.to_string(),
        args,
    })
}

/// Rejects every term or type whose printed form mentions "bad"
pub struct PickyChecker;

impl Checker for PickyChecker {
    fn check(
        &self,
        _env: &Environment,
        _sigma: &Solution,
        _ctx: &Context,
        term: &Term,
        expected: &Term,
    ) -> Result<(), TypeError> {
        if term.to_string().contains("bad") {
            return Err(TypeError(format!("{} does not have type {}", term, expected)));
        }
        Ok(())
    }

    fn infer_sort(
        &self,
        _env: &Environment,
        _sigma: &Solution,
        _ctx: &Context,
        ty: &Term,
    ) -> Result<(), TypeError> {
        if ty.to_string().contains("bad") {
            return Err(TypeError(format!("{} is not a type", ty)));
        }
        Ok(())
    }
}

/// A proofview with `n` goals `P1 .. Pn`
pub fn view_with(n: usize) -> (Proofview, Vec<GoalId>) {
    let goals = (1..=n)
        .map(|i| (Context::new(), atom(&format!("P{}", i))))
        .collect();
    let (view, _) = init(Solution::new(), goals);
    let ids = view.goals().to_vec();
    (view, ids)
}

/// Solve each focused goal with a term over `k` fresh subgoals
pub fn split(k: usize) -> Tactic<()> {
    refine(move |goal, mut sigma| {
        let subgoals = (0..k)
            .map(|i| {
                let statement = atom(&format!("S{}", i));
                Term::goal(sigma.new_goal(goal.context().clone(), statement, None))
            })
            .collect();
        Ok((sigma, app("split", subgoals)))
    })
}

pub fn close() -> Tactic<()> {
    crate::exact(atom("tt"))
}

/// Successes `values[0]`, `values[1]`, ... in order
pub fn choice<A: Clone + 'static>(values: Vec<A>) -> Tactic<A> {
    values
        .into_iter()
        .rev()
        .fold(Tactic::zero(TacticError::failure("no more")), |rest, value| {
            Tactic::unit(value).or(move |_| rest.clone())
        })
}

pub fn run<A: Clone + 'static>(tactic: &Tactic<A>, view: Proofview) -> Applied<A> {
    apply(&Environment::default(), tactic, view).unwrap()
}

pub fn run_err<A: Clone + 'static>(tactic: &Tactic<A>, view: Proofview) -> ProofError {
    match apply(&Environment::default(), tactic, view) {
        Ok(_) => panic!("expected the tactic to fail"),
        Err(err) => err,
    }
}

/// Every success of `tactic`, in order
pub fn all_values<A: Clone + 'static>(tactic: &Tactic<A>, view: Proofview) -> Vec<A> {
    let mut rt = Runtime::default();
    let state = LogicState::new(Environment::default(), view);
    let mut reply = tactic.run(&mut rt, state).unwrap();
    let mut values = Vec::new();
    while let Reply::Next(value, _, resume) = reply {
        values.push(value);
        reply = resume(&mut rt, TacticError::failure("next")).unwrap();
    }
    values
}
